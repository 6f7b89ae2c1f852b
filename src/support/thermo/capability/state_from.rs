use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{MassDensity, Pressure, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    thermo::{RecoveryError, STANDARD_TEMPERATURE, State, ThermoClosure},
    units::SpecificInternalEnergy,
};

/// Capability for constructing a [`State`] from a typed input.
///
/// `StateFrom<Input>` expresses, at compile time, which combinations of
/// inputs a closure can use to construct a state. Every closure supports:
/// - `(MassDensity, SpecificInternalEnergy)`, recovering temperature
/// - `(MassDensity, ThermodynamicTemperature)`, evaluating energy
/// - `(Pressure, MassDensity)`, inverting pressure for energy
///
/// Iterations start from [`STANDARD_TEMPERATURE`] and zero energy; the flow
/// solver, which has better guesses, calls the closure directly.
pub trait StateFrom<Input> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a thermodynamic state from the provided input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be created from `input`.
    fn state_from(&self, input: Input) -> Result<State, Self::Error>;
}

impl<M: ThermoClosure + ?Sized> StateFrom<(MassDensity, SpecificInternalEnergy)> for M {
    type Error = RecoveryError;

    fn state_from(
        &self,
        (density, energy): (MassDensity, SpecificInternalEnergy),
    ) -> Result<State, Self::Error> {
        let rho = density.get::<kilogram_per_cubic_meter>();
        let e = energy.get::<joule_per_kilogram>();
        let t = self.t_rho_e(STANDARD_TEMPERATURE, rho, e)?;
        Ok(State::from_si(rho, e, t))
    }
}

impl<M: ThermoClosure + ?Sized> StateFrom<(MassDensity, ThermodynamicTemperature)> for M {
    type Error = RecoveryError;

    fn state_from(
        &self,
        (density, temperature): (MassDensity, ThermodynamicTemperature),
    ) -> Result<State, Self::Error> {
        let rho = density.get::<kilogram_per_cubic_meter>();
        let t = temperature.get::<kelvin>();
        let e = self.e_rho_t(0.0, rho, t)?;
        Ok(State::from_si(rho, e, t))
    }
}

impl<M: ThermoClosure + ?Sized> StateFrom<(Pressure, MassDensity)> for M {
    type Error = RecoveryError;

    fn state_from(
        &self,
        (pressure, density): (Pressure, MassDensity),
    ) -> Result<State, Self::Error> {
        let p = pressure.get::<pascal>();
        let rho = density.get::<kilogram_per_cubic_meter>();
        let e = self.initialize_energy(p, rho, 0.0, STANDARD_TEMPERATURE)?;
        let t = self.t_rho_e(STANDARD_TEMPERATURE, rho, e)?;
        Ok(State::from_si(rho, e, t))
    }
}
