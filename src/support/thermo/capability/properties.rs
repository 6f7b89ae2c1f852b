use uom::si::{
    f64::{Pressure, SpecificHeatCapacity, Velocity},
    pressure::pascal,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    velocity::meter_per_second,
};

use crate::support::thermo::{PropertyError, State, ThermoClosure};
use crate::support::units::{SpecificEnthalpy, SpecificEntropy, SpecificInternalEnergy};

pub trait HasPressure {
    /// Returns the pressure for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the pressure cannot be calculated.
    fn pressure(&self, state: &State) -> Result<Pressure, PropertyError>;
}

pub trait HasInternalEnergy {
    /// Returns the absolute specific internal energy for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the internal energy cannot be calculated.
    fn internal_energy(&self, state: &State) -> Result<SpecificInternalEnergy, PropertyError>;
}

pub trait HasEnthalpy {
    /// Returns the absolute specific enthalpy for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the enthalpy cannot be calculated.
    fn enthalpy(&self, state: &State) -> Result<SpecificEnthalpy, PropertyError>;
}

pub trait HasEntropy {
    /// Returns the specific entropy for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the entropy cannot be calculated.
    fn entropy(&self, state: &State) -> Result<SpecificEntropy, PropertyError>;
}

pub trait HasCp {
    /// Returns the specific heat capacity at constant pressure for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if `cp` cannot be calculated.
    fn cp(&self, state: &State) -> Result<SpecificHeatCapacity, PropertyError>;
}

pub trait HasCv {
    /// Returns the specific heat capacity at constant volume for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if `cv` cannot be calculated.
    fn cv(&self, state: &State) -> Result<SpecificHeatCapacity, PropertyError>;
}

pub trait HasSoundSpeed {
    /// Returns the speed of sound for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the speed of sound cannot be calculated.
    fn sound_speed(&self, state: &State) -> Result<Velocity, PropertyError>;
}

/// Rejects non-finite property values.
fn finite(name: &str, value: f64, state: &State) -> Result<f64, PropertyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        let (rho, e, t) = state.to_si();
        Err(PropertyError::InvalidState {
            context: format!("{name} is {value} at rho={rho}, e={e}, T={t}"),
        })
    }
}

impl<M: ThermoClosure + ?Sized> HasPressure for M {
    fn pressure(&self, state: &State) -> Result<Pressure, PropertyError> {
        let (rho, e, t) = state.to_si();
        let p = finite("pressure", self.p(rho, e, t), state)?;
        Ok(Pressure::new::<pascal>(p))
    }
}

impl<M: ThermoClosure + ?Sized> HasInternalEnergy for M {
    fn internal_energy(&self, state: &State) -> Result<SpecificInternalEnergy, PropertyError> {
        let (rho, e, t) = state.to_si();
        let ea = finite("internal energy", self.ea(rho, e, t), state)?;
        Ok(SpecificInternalEnergy::new::<uom::si::available_energy::joule_per_kilogram>(ea))
    }
}

impl<M: ThermoClosure + ?Sized> HasEnthalpy for M {
    fn enthalpy(&self, state: &State) -> Result<SpecificEnthalpy, PropertyError> {
        let (rho, e, t) = state.to_si();
        let ha = finite("enthalpy", self.ha(rho, e, t), state)?;
        Ok(SpecificEnthalpy::new::<uom::si::available_energy::joule_per_kilogram>(ha))
    }
}

impl<M: ThermoClosure + ?Sized> HasEntropy for M {
    fn entropy(&self, state: &State) -> Result<SpecificEntropy, PropertyError> {
        let (rho, e, t) = state.to_si();
        let s = self.s(self.p(rho, e, t), rho, e, t)?;
        let s = finite("entropy", s, state)?;
        Ok(SpecificEntropy::new::<joule_per_kilogram_kelvin>(s))
    }
}

impl<M: ThermoClosure + ?Sized> HasCp for M {
    fn cp(&self, state: &State) -> Result<SpecificHeatCapacity, PropertyError> {
        let (rho, e, t) = state.to_si();
        let cp = finite("cp", ThermoClosure::cp(self, rho, e, t), state)?;
        Ok(SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(cp))
    }
}

impl<M: ThermoClosure + ?Sized> HasCv for M {
    fn cv(&self, state: &State) -> Result<SpecificHeatCapacity, PropertyError> {
        let (rho, e, t) = state.to_si();
        let cv = finite("cv", ThermoClosure::cv(self, rho, e, t), state)?;
        Ok(SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(cv))
    }
}

impl<M: ThermoClosure + ?Sized> HasSoundSpeed for M {
    fn sound_speed(&self, state: &State) -> Result<Velocity, PropertyError> {
        let (rho, e, t) = state.to_si();
        let c = self.speed_of_sound(self.p(rho, e, t), rho, e, t);
        Ok(Velocity::new::<meter_per_second>(finite("speed of sound", c, state)?))
    }
}
