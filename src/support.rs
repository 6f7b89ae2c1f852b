//! Supporting closures and utilities used by the field-level models.
//!
//! - [`eos`]: equation-of-state closures evaluated per cell
//! - [`thermo`]: caloric models, EOS × caloric composition and state recovery
//! - [`config`]: flat parameter dictionaries and runtime selection
//! - [`constraint`]: numeric invariants checked at construction
//! - [`units`]: quantity aliases missing from [`uom`]

pub mod config;
pub mod constraint;
pub mod eos;
pub mod thermo;
pub mod units;
