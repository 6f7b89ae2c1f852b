use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{MassDensity, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    thermodynamic_temperature::kelvin,
};

use crate::support::units::SpecificInternalEnergy;

/// The thermodynamic state of one phase.
///
/// A `State` holds the density, sensible internal energy and temperature of
/// a material point. Only two are independent; a closure's
/// [`StateFrom`](super::capability::StateFrom) implementations construct
/// consistent states from any supported pair.
///
/// `State` is the input to the capability traits for pressure, enthalpy,
/// entropy and related quantities.
///
/// # Example
///
/// ```
/// use detonation_thermo::support::{thermo::State, units::SpecificInternalEnergy};
/// use uom::si::{
///     available_energy::joule_per_kilogram,
///     f64::{MassDensity, ThermodynamicTemperature},
///     mass_density::kilogram_per_cubic_meter,
///     thermodynamic_temperature::kelvin,
/// };
///
/// let state = State {
///     density: MassDensity::new::<kilogram_per_cubic_meter>(1.2),
///     internal_energy: SpecificInternalEnergy::new::<joule_per_kilogram>(2.15e5),
///     temperature: ThermodynamicTemperature::new::<kelvin>(300.0),
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub density: MassDensity,
    pub internal_energy: SpecificInternalEnergy,
    pub temperature: ThermodynamicTemperature,
}

impl State {
    /// Creates a new state with the given density, energy, and temperature.
    #[must_use]
    pub fn new(
        density: MassDensity,
        internal_energy: SpecificInternalEnergy,
        temperature: ThermodynamicTemperature,
    ) -> Self {
        Self {
            density,
            internal_energy,
            temperature,
        }
    }

    /// Creates a state from raw SI values.
    #[must_use]
    pub fn from_si(rho: f64, e: f64, t: f64) -> Self {
        Self::new(
            MassDensity::new::<kilogram_per_cubic_meter>(rho),
            SpecificInternalEnergy::new::<joule_per_kilogram>(e),
            ThermodynamicTemperature::new::<kelvin>(t),
        )
    }

    /// Returns the state as raw SI `(ρ, e, T)`.
    #[must_use]
    pub fn to_si(&self) -> (f64, f64, f64) {
        (
            self.density.get::<kilogram_per_cubic_meter>(),
            self.internal_energy.get::<joule_per_kilogram>(),
            self.temperature.get::<kelvin>(),
        )
    }

    /// Returns a new state with the given density, keeping other fields unchanged.
    #[must_use]
    pub fn with_density(self, density: MassDensity) -> Self {
        Self { density, ..self }
    }

    /// Returns a new state with the given internal energy, keeping other fields unchanged.
    #[must_use]
    pub fn with_internal_energy(self, internal_energy: SpecificInternalEnergy) -> Self {
        Self {
            internal_energy,
            ..self
        }
    }

    /// Returns a new state with the given temperature, keeping other fields unchanged.
    #[must_use]
    pub fn with_temperature(self, temperature: ThermodynamicTemperature) -> Self {
        Self {
            temperature,
            ..self
        }
    }
}
