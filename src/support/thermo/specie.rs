use thiserror::Error;
use uom::si::{
    f64::MolarMass, molar_mass::gram_per_mole, specific_heat_capacity::joule_per_kilogram_kelvin,
};

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, StrictlyPositive},
    units::SpecificGasConstant,
};

/// Universal gas constant, J/(kmol·K).
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8314.47;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecieError {
    #[error("invalid molecular weight: {molar_mass:?}")]
    MolarMass { molar_mass: MolarMass },
}

/// Molecular identity of a single-material phase.
///
/// Closures that carry an ideal-gas contribution (`CpMCv = R`) take their
/// specific gas constant from here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specie {
    molar_mass: MolarMass,
    r: f64,
}

impl Specie {
    /// Creates a specie from its molar mass.
    ///
    /// # Errors
    ///
    /// Returns [`SpecieError`] if the molar mass is not strictly positive.
    pub fn new(molar_mass: MolarMass) -> Result<Self, SpecieError> {
        let w = molar_mass.get::<gram_per_mole>();
        if StrictlyPositive::check(&w).is_err() {
            return Err(SpecieError::MolarMass { molar_mass });
        }

        Ok(Self {
            molar_mass,
            r: UNIVERSAL_GAS_CONSTANT / w,
        })
    }

    /// Reads `molWeight` (kg/kmol).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `molWeight` is missing or invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let w = dict.scalar("molWeight")?;
        Self::new(MolarMass::new::<gram_per_mole>(w))
            .map_err(|err| ConfigError::parameters("specie", err))
    }

    #[must_use]
    pub fn molar_mass(&self) -> MolarMass {
        self.molar_mass
    }

    /// Specific gas constant in J/(kg·K).
    #[must_use]
    pub fn r(&self) -> f64 {
        self.r
    }

    #[must_use]
    pub fn gas_constant(&self) -> SpecificGasConstant {
        SpecificGasConstant::new::<joule_per_kilogram_kelvin>(self.r)
    }
}
