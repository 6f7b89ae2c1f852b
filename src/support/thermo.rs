//! Thermodynamic composition and state recovery.
//!
//! A phase's thermodynamics is an [`EquationOfState`](crate::support::eos)
//! composed with a [`CaloricModel`] and a [`Specie`], wrapped as a
//! [`ThermoClosure`]. The closure recovers temperature from `(ρ, e)` with the
//! Newton/bisection engine in [`recovery`].

mod caloric;
mod closure;
mod error;
mod specie;
mod state;
mod transport;

pub mod capability;
pub mod recovery;

pub use caloric::{
    Caloric, CaloricModel, CaloricParametersError, ConstantCv, PolynomialCv, STANDARD_TEMPERATURE,
};
pub use closure::{Tabulated, Thermo, ThermoClosure, ThermoKind};
pub use error::{PropertyError, RecoveryError, Unknown};
pub use recovery::RecoveryConfig;
pub use specie::{Specie, SpecieError, UNIVERSAL_GAS_CONSTANT};
pub use state::State;
pub use transport::{ConstantTransport, Transport, TransportParametersError};
