//! Per-phase thermodynamics of a detonation flow solver.
//!
//! [`FluidThermo`] owns one phase's state fields and advances them through
//! the stages of an explicit time step. [`StateRecovery`] is the
//! [`twine_core::Model`] adapter for recovering temperature and pressure from
//! density and energy without owning any fields.

mod core;

pub use self::core::{
    CellFields, FluidThermo, FluidThermoError, OdeStage, OdeStep, PatchFields, StageRates,
    ThermoView,
};

use twine_core::Model;

use crate::support::{
    config::{ConfigError, ThermoConfig},
    thermo::ThermoKind,
};

/// Cells to recover, with the temperature each iteration starts from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecoveryInput {
    pub rho: Vec<f64>,
    pub e: Vec<f64>,
    pub t_guess: Vec<f64>,
}

/// Temperature and pressure of each recovered cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecoveredState {
    pub t: Vec<f64>,
    pub p: Vec<f64>,
}

/// Recovers `(T, p)` from `(ρ, e)` with one phase's closure.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecovery {
    thermo: ThermoKind,
}

impl StateRecovery {
    #[must_use]
    pub fn new(thermo: ThermoKind) -> Self {
        Self { thermo }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn from_config(config: &ThermoConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ThermoKind::from_config(config)?))
    }
}

impl Model for StateRecovery {
    type Input = RecoveryInput;
    type Output = RecoveredState;
    type Error = FluidThermoError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let n = input.rho.len();
        FluidThermoError::check_length("e", n, input.e.len())?;
        FluidThermoError::check_length("T guess", n, input.t_guess.len())?;

        let (t, p) = self::core::recover(&self.thermo, &input.rho, &input.e, &input.t_guess)?;
        Ok(RecoveredState { t, p })
    }
}
