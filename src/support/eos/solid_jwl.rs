//! JWL closure for an unreacted solid explosive, in Mie–Grüneisen form.
//!
//! ```text
//! p = A·(1 − ω/(R1·V))·exp(−R1·V) + B·(1 − ω/(R2·V))·exp(−R2·V) + ω·ρ·e
//! ```
//!
//! with `V = ρ0/ρ`, so `Γ = ω + 1` and `Π` is the negated reference term.

use thiserror::Error;
use uom::si::{
    f64::{MassDensity, Pressure},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
};

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, Finite, StrictlyPositive},
    thermo::PropertyError,
};

use super::{EquationOfState, clamp_density};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolidJwlParametersError {
    #[error("invalid reference density: {rho0:?}")]
    ReferenceDensity { rho0: MassDensity },
    #[error("invalid coefficient {name}: {value:?}")]
    Coefficient { name: &'static str, value: Pressure },
    #[error("invalid rate constant {name}: {value}")]
    Rate { name: &'static str, value: f64 },
    #[error("invalid Grüneisen coefficient omega: {omega}")]
    Omega { omega: f64 },
}

/// Parameters of the [`SolidJwl`] closure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidJwlParameters {
    pub rho0: MassDensity,
    pub a: Pressure,
    pub b: Pressure,
    pub r1: f64,
    pub r2: f64,
    pub omega: f64,
}

impl SolidJwlParameters {
    /// Reads `rho0`, `A`, `B`, `R1`, `R2` and `omega`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid key.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Ok(Self {
            rho0: MassDensity::new::<kilogram_per_cubic_meter>(dict.scalar("rho0")?),
            a: Pressure::new::<pascal>(dict.scalar("A")?),
            b: Pressure::new::<pascal>(dict.scalar("B")?),
            r1: dict.scalar("R1")?,
            r2: dict.scalar("R2")?,
            omega: dict.scalar("omega")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidJwl {
    rho0: f64,
    a: f64,
    b: f64,
    r1: f64,
    r2: f64,
    omega: f64,
}

impl SolidJwl {
    /// # Errors
    ///
    /// Returns [`SolidJwlParametersError`] if `rho0`, `R1`, `R2` or `omega`
    /// is not strictly positive, or a coefficient is not finite.
    pub fn new(parameters: SolidJwlParameters) -> Result<Self, SolidJwlParametersError> {
        let rho0 = parameters.rho0.get::<kilogram_per_cubic_meter>();
        if StrictlyPositive::check(&rho0).is_err() {
            return Err(SolidJwlParametersError::ReferenceDensity {
                rho0: parameters.rho0,
            });
        }

        for (name, value) in [("A", parameters.a), ("B", parameters.b)] {
            if Finite::check(&value.get::<pascal>()).is_err() {
                return Err(SolidJwlParametersError::Coefficient { name, value });
            }
        }

        for (name, value) in [("R1", parameters.r1), ("R2", parameters.r2)] {
            if StrictlyPositive::check(&value).is_err() {
                return Err(SolidJwlParametersError::Rate { name, value });
            }
        }

        if StrictlyPositive::check(&parameters.omega).is_err() {
            return Err(SolidJwlParametersError::Omega {
                omega: parameters.omega,
            });
        }

        Ok(Self {
            rho0,
            a: parameters.a.get::<pascal>(),
            b: parameters.b.get::<pascal>(),
            r1: parameters.r1,
            r2: parameters.r2,
            omega: parameters.omega,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a parameter is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Self::new(SolidJwlParameters::from_dictionary(dict)?)
            .map_err(|err| ConfigError::parameters("solidJWL", err))
    }

    fn relative_volume(&self, rho: f64) -> f64 {
        self.rho0 / clamp_density(rho)
    }

    fn terms(&self) -> [(f64, f64); 2] {
        [(self.a, self.r1), (self.b, self.r2)]
    }

    /// Reference term `A·(1 − ω/(R1·V))·exp(−R1·V) + …`.
    fn reference(&self, v: f64) -> f64 {
        self.terms()
            .iter()
            .map(|&(k, r)| k * (1.0 - self.omega / (r * v)) * (-r * v).exp())
            .sum()
    }

    /// `d(reference)/dV`.
    fn reference_slope(&self, v: f64) -> f64 {
        self.terms()
            .iter()
            .map(|&(k, r)| {
                k * (-r * v).exp() * (self.omega / (r * v * v) + self.omega / v - r)
            })
            .sum()
    }

    /// `(∂p/∂ρ)_e`.
    fn dpdrho(&self, rho: f64, e: f64) -> f64 {
        let v = self.relative_volume(rho);
        -self.reference_slope(v) * v / clamp_density(rho) + self.omega * e
    }
}

impl EquationOfState for SolidJwl {
    fn solid(&self) -> bool {
        true
    }

    fn pressure(&self, rho: f64, e: f64, _t: f64) -> f64 {
        let rhos = clamp_density(rho);
        self.reference(self.relative_volume(rho)) + self.omega * rhos * e
    }

    fn gamma(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.omega + 1.0
    }

    fn pi(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        -self.reference(self.relative_volume(rho))
    }

    fn delta(&self, _p: f64, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        self.reference_slope(v) * v / (clamp_density(rho) * self.omega)
    }

    fn dpdv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        let rhos = clamp_density(rho);
        -rhos * rhos * self.dpdrho(rho, e)
    }

    fn dpde(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        self.omega * clamp_density(rho)
    }

    fn energy_correction(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        self.terms()
            .iter()
            .map(|&(k, r)| k / r * (-r * v).exp())
            .sum::<f64>()
            / self.rho0
    }

    fn enthalpy_correction(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.energy_correction(rho, e, t) - self.pi(rho, e, t) / clamp_density(rho)
    }

    fn cp_m_cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn entropy(&self, _p: f64, _rho: f64, _t: f64) -> Result<f64, PropertyError> {
        Ok(0.0)
    }
}
