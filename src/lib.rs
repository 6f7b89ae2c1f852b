//! # Detonation Thermo
//!
//! Equation-of-state closures and thermodynamic state recovery for
//! compressible, multi-phase, reactive flow solvers.
//!
//! ## Crate layout
//!
//! - [`models`]: Per-phase thermodynamic models driven by the flow solver.
//! - [`support`]: Equation-of-state closures, caloric models, state
//!   recovery and configuration.
//!
//! ## Conventions
//!
//! Per-cell evaluation works on raw SI `f64` values (ρ in kg/m³, e in J/kg,
//! T in K, p in Pa). Construction parameters and the typed property API in
//! [`support::thermo::capability`] use [`uom`] quantities.
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.

pub mod models;
pub mod support;
