//! Equation-of-state closures.
//!
//! An [`EquationOfState`] maps a state pair to pressure, its partial
//! derivatives and the caloric departures the composition layer adds to a
//! base heat-capacity model. Every closure is expressed in Mie–Grüneisen
//! form, `p = (Γ − 1)·ρ·e − Π`, so the non-ideal sound-speed correction
//! `δ = (∂Π/∂ρ)_e / (Γ − 1)` gives `c² = (Γ − 1)(e + p/ρ − δ)`.
//!
//! All quantities are SI: `ρ` in kg/m³, `e` in J/kg, `T` in K, `p` in Pa and
//! `v = 1/ρ` in m³/kg. Queries are pure functions of the arguments.
//!
//! # Density floor
//!
//! Near-vacuum cells are handled by clamping density to [`DENSITY_FLOOR`]
//! before a closure divides by it. Each closure clamps exactly where it
//! divides and nowhere else, so the closures do not agree below the floor:
//!
//! - [`IdealGas`] never divides and never clamps.
//! - [`CochranChan`] clamps inside `V = ρ0/ρ` but multiplies by the raw density.
//! - [`Jwlc`] and [`SolidJwl`] clamp every occurrence of density.

mod cochran_chan;
mod ideal_gas;
mod jwlc;
mod solid_jwl;
mod tabulated;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;

use crate::support::{
    config::{ConfigError, Dictionary},
    thermo::{PropertyError, Specie},
};

pub use cochran_chan::{CochranChan, CochranChanParameters, CochranChanParametersError};
pub use ideal_gas::{IdealGas, IdealGasParametersError};
pub use jwlc::{Jwlc, JwlcParameters, JwlcParametersError};
pub use solid_jwl::{SolidJwl, SolidJwlParameters, SolidJwlParametersError};
pub use tabulated::{Axis, LookupTable2D, TableError, TabulatedEos, Transform};

/// Density below which closures clamp before dividing, kg/m³.
pub const DENSITY_FLOOR: f64 = 1e-10;

/// Standard-state pressure used as the entropy reference, Pa.
pub const STANDARD_PRESSURE: f64 = 1e5;

/// Clamps `rho` to [`DENSITY_FLOOR`].
#[inline]
pub(crate) fn clamp_density(rho: f64) -> f64 {
    rho.max(DENSITY_FLOOR)
}

/// Returns `−R·ln(p/p_std)`, the ideal-gas pressure contribution to entropy.
pub(crate) fn ideal_entropy(r: f64, p: f64) -> Result<f64, PropertyError> {
    if p > 0.0 {
        Ok(-r * (p / STANDARD_PRESSURE).ln())
    } else {
        Err(PropertyError::OutOfDomain {
            context: format!("entropy requires positive pressure, got p={p}"),
        })
    }
}

/// Capability set shared by every equation-of-state closure.
///
/// Temperature-based closures evaluate pressure from `(ρ, T)` and ignore `e`;
/// the remaining closures evaluate it from `(ρ, e)` and ignore `T`. Both
/// arguments are always supplied so callers never need to know which.
pub trait EquationOfState: Send + Sync + fmt::Debug {
    /// Whether pressure is a function of `(ρ, T)` rather than `(ρ, e)`.
    fn temperature_based(&self) -> bool {
        false
    }

    /// Whether the closure describes a solid phase.
    fn solid(&self) -> bool {
        false
    }

    fn pressure(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Mie–Grüneisen coefficient `Γ`.
    fn gamma(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Deviation from ideal-gas pressure, `Π = (Γ − 1)·ρ·e − p`.
    fn pi(&self, rho: f64, e: f64, t: f64) -> f64 {
        (self.gamma(rho, e, t) - 1.0) * rho * e - self.pressure(rho, e, t)
    }

    /// Non-ideal correction to the speed of sound.
    fn delta(&self, p: f64, rho: f64, e: f64, t: f64) -> f64;

    /// `(∂p/∂v)_e` with `v = 1/ρ`.
    fn dpdv(&self, rho: f64, e: f64, t: f64) -> f64;

    /// `(∂p/∂e)_ρ`.
    fn dpde(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Explicit `(∂p/∂T)_ρ` of the closure itself.
    fn dpdt(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    /// Internal energy departure `E` added to the caloric sensible energy.
    fn energy_correction(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Enthalpy departure `H`.
    fn enthalpy_correction(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Heat capacity contributed by the closure at constant volume.
    ///
    /// Detonation-product and Mie–Grüneisen closures report zero and leave
    /// the heat capacity to the caloric model.
    fn cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn cp(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn cp_m_cv(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Entropy contribution relative to [`STANDARD_PRESSURE`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::OutOfDomain`] when the closure takes the
    /// logarithm of a non-positive pressure.
    fn entropy(&self, p: f64, rho: f64, t: f64) -> Result<f64, PropertyError>;

    /// Squared speed of sound, `c² = (p·(∂p/∂e)_ρ − (∂p/∂v)_e)/ρ²`.
    fn speed_of_sound_sqr(&self, p: f64, rho: f64, e: f64, t: f64) -> f64 {
        let rhos = clamp_density(rho);
        (p * self.dpde(rho, e, t) - self.dpdv(rho, e, t)) / (rhos * rhos)
    }
}

/// Runtime-selected analytic closure.
#[derive(Debug, Clone, PartialEq)]
pub enum Eos {
    IdealGas(IdealGas),
    Jwlc(Jwlc),
    CochranChan(CochranChan),
    SolidJwl(SolidJwl),
}

impl Eos {
    /// Type names accepted by [`Eos::from_dictionary`].
    pub const TYPES: &'static [&'static str] = &["idealGas", "JWLC", "CochranChan", "solidJWL"];

    /// Selects and constructs a closure from its `type` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the type is unknown or a parameter is
    /// missing or non-physical.
    pub fn from_dictionary(dict: &Dictionary, specie: &Specie) -> Result<Self, ConfigError> {
        let name = dict.type_name()?;
        log::debug!("selecting equation of state `{name}`");

        match name {
            "idealGas" => IdealGas::from_dictionary(dict, specie).map(Self::IdealGas),
            "JWLC" => Jwlc::from_dictionary(dict).map(Self::Jwlc),
            "CochranChan" => CochranChan::from_dictionary(dict, specie).map(Self::CochranChan),
            "solidJWL" => SolidJwl::from_dictionary(dict).map(Self::SolidJwl),
            other => Err(ConfigError::unknown_type(
                "equation of state",
                other,
                Self::TYPES,
            )),
        }
    }

    fn inner(&self) -> &dyn EquationOfState {
        match self {
            Self::IdealGas(eos) => eos,
            Self::Jwlc(eos) => eos,
            Self::CochranChan(eos) => eos,
            Self::SolidJwl(eos) => eos,
        }
    }
}

impl EquationOfState for Eos {
    fn temperature_based(&self) -> bool {
        self.inner().temperature_based()
    }

    fn solid(&self) -> bool {
        self.inner().solid()
    }

    fn pressure(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().pressure(rho, e, t)
    }

    fn gamma(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().gamma(rho, e, t)
    }

    fn pi(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().pi(rho, e, t)
    }

    fn delta(&self, p: f64, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().delta(p, rho, e, t)
    }

    fn dpdv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().dpdv(rho, e, t)
    }

    fn dpde(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().dpde(rho, e, t)
    }

    fn dpdt(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().dpdt(rho, e, t)
    }

    fn energy_correction(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().energy_correction(rho, e, t)
    }

    fn enthalpy_correction(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().enthalpy_correction(rho, e, t)
    }

    fn cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().cv(rho, e, t)
    }

    fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().cp(rho, e, t)
    }

    fn cp_m_cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().cp_m_cv(rho, e, t)
    }

    fn entropy(&self, p: f64, rho: f64, t: f64) -> Result<f64, PropertyError> {
        self.inner().entropy(p, rho, t)
    }

    fn speed_of_sound_sqr(&self, p: f64, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().speed_of_sound_sqr(p, rho, e, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use super::test_support::{air, cochran_chan_dictionary};

    #[test]
    fn selects_closure_by_type_name() {
        let eos = Eos::from_dictionary(&cochran_chan_dictionary(), &air()).unwrap();
        assert!(matches!(eos, Eos::CochranChan(_)));
        assert!(!eos.temperature_based());

        let dict = Dictionary::new().with("type", "idealGas").with("gamma", 1.4);
        let eos = Eos::from_dictionary(&dict, &air()).unwrap();
        assert_relative_eq!(eos.gamma(1.0, 2e5, 300.0), 1.4);
    }

    #[test]
    fn unknown_type_lists_valid_names() {
        let dict = Dictionary::new().with("type", "vanDerWaals");
        let err = Eos::from_dictionary(&dict, &air()).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::UnknownType { ref name, valid, .. }
                if name == "vanDerWaals" && valid == Eos::TYPES
        ));
    }

    #[test]
    fn missing_parameter_names_the_key() {
        let dict = Dictionary::new().with("type", "JWLC").with("rho0", 1630.0);
        let err = Eos::from_dictionary(&dict, &air()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key } if key == "A"));
    }

    #[test]
    fn entropy_rejects_non_positive_pressure() {
        assert!(ideal_entropy(287.0, 0.0).is_err());
        assert!(ideal_entropy(287.0, -1.0).is_err());
        assert_relative_eq!(ideal_entropy(287.0, STANDARD_PRESSURE).unwrap(), 0.0);
    }
}
