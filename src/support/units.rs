//! Extensions to [`uom`].
//!
//! Typed construction parameters and the typed property API use [`uom`]
//! quantities. The per-cell hot path works on raw SI `f64` values; these
//! aliases name the specific quantities [`uom`] does not provide directly.

mod quantities;

pub use quantities::{
    SpecificEnthalpy, SpecificEntropy, SpecificGasConstant, SpecificInternalEnergy,
};
