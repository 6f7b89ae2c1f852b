//! Detonation flow models.
//!
//! Thermodynamics of the phases of a compressible, reactive flow solver:
//! per-phase state ownership and recovery in [`fluid`], energy release by
//! late combustion in [`afterburn`].

pub mod afterburn;
pub mod fluid;
