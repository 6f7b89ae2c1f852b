//! JWL isentrope with an explicit `C` term for detonation products.
//!
//! Pressure follows the product isentrope
//!
//! ```text
//! p(V) = A·exp(−R1·V) + B·exp(−R2·V) + C·V^(−(ω+1)),   V = ρ0/ρ
//! ```
//!
//! and does not depend on internal energy, so the closure is temperature
//! based and the caloric model alone carries the thermal energy.

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
pub enum JwlcParametersError {
    #[error("invalid reference density: {rho0:?}")]
    ReferenceDensity { rho0: MassDensity },
    #[error("invalid isentrope coefficient {name}: {value:?}")]
    Coefficient { name: &'static str, value: Pressure },
    #[error("invalid rate constant {name}: {value}")]
    Rate { name: &'static str, value: f64 },
    #[error("invalid Grüneisen coefficient omega: {omega}")]
    Omega { omega: f64 },
}

/// Parameters of the [`Jwlc`] closure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JwlcParameters {
    pub rho0: MassDensity,
    pub a: Pressure,
    pub b: Pressure,
    pub c: Pressure,
    pub r1: f64,
    pub r2: f64,
    pub omega: f64,
}

impl JwlcParameters {
    /// Reads `rho0`, `A`, `B`, `C`, `R1`, `R2` and `omega`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid key.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Ok(Self {
            rho0: MassDensity::new::<kilogram_per_cubic_meter>(dict.scalar("rho0")?),
            a: Pressure::new::<pascal>(dict.scalar("A")?),
            b: Pressure::new::<pascal>(dict.scalar("B")?),
            c: Pressure::new::<pascal>(dict.scalar("C")?),
            r1: dict.scalar("R1")?,
            r2: dict.scalar("R2")?,
            omega: dict.scalar("omega")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jwlc {
    rho0: f64,
    a: f64,
    b: f64,
    c: f64,
    r1: f64,
    r2: f64,
    omega: f64,
}

impl Jwlc {
    /// Creates the closure from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`JwlcParametersError`] if `rho0`, `R1`, `R2` or `omega` is not
    /// strictly positive, or a coefficient is not finite.
    pub fn new(parameters: JwlcParameters) -> Result<Self, JwlcParametersError> {
        let rho0 = parameters.rho0.get::<kilogram_per_cubic_meter>();
        if StrictlyPositive::check(&rho0).is_err() {
            return Err(JwlcParametersError::ReferenceDensity {
                rho0: parameters.rho0,
            });
        }

        for (name, value) in [("A", parameters.a), ("B", parameters.b), ("C", parameters.c)] {
            if Finite::check(&value.get::<pascal>()).is_err() {
                return Err(JwlcParametersError::Coefficient { name, value });
            }
        }

        for (name, value) in [("R1", parameters.r1), ("R2", parameters.r2)] {
            if StrictlyPositive::check(&value).is_err() {
                return Err(JwlcParametersError::Rate { name, value });
            }
        }

        if StrictlyPositive::check(&parameters.omega).is_err() {
            return Err(JwlcParametersError::Omega {
                omega: parameters.omega,
            });
        }

        Ok(Self {
            rho0,
            a: parameters.a.get::<pascal>(),
            b: parameters.b.get::<pascal>(),
            c: parameters.c.get::<pascal>(),
            r1: parameters.r1,
            r2: parameters.r2,
            omega: parameters.omega,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a parameter is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Self::new(JwlcParameters::from_dictionary(dict)?)
            .map_err(|err| ConfigError::parameters("JWLC", err))
    }

    fn relative_volume(&self, rho: f64) -> f64 {
        self.rho0 / clamp_density(rho)
    }

    /// `dp/dρ` along the isentrope.
    fn dpdrho(&self, rho: f64) -> f64 {
        let v = self.relative_volume(rho);
        let rhos = clamp_density(rho);
        v / rhos
            * (self.a * self.r1 * (-self.r1 * v).exp()
                + self.b * self.r2 * (-self.r2 * v).exp()
                + self.c * (self.omega + 1.0) * v.powf(-(self.omega + 2.0)))
    }
}

impl EquationOfState for Jwlc {
    fn temperature_based(&self) -> bool {
        true
    }

    fn pressure(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        self.a * (-self.r1 * v).exp()
            + self.b * (-self.r2 * v).exp()
            + self.c * v.powf(-(self.omega + 1.0))
    }

    fn gamma(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.omega + 1.0
    }

    /// Chosen so that `c² = ω(e + p/ρ − δ)` equals the isentrope slope.
    fn delta(&self, p: f64, rho: f64, e: f64, _t: f64) -> f64 {
        e + p / clamp_density(rho) - self.dpdrho(rho) / self.omega
    }

    fn dpdv(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let rhos = clamp_density(rho);
        -rhos * rhos * self.dpdrho(rho)
    }

    fn dpde(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn energy_correction(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        (self.a / self.r1 * (-self.r1 * v).exp()
            + self.b / self.r2 * (-self.r2 * v).exp()
            + self.c / (self.omega * v.powf(self.omega)))
            / self.rho0
    }

    fn enthalpy_correction(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let rhos = clamp_density(rho);
        let v = self.rho0 / rhos;
        -(self.a * self.r1 * self.rho0 * (-self.r1 * v).exp()
            + self.b * self.r2 * self.rho0 * (-self.r2 * v).exp())
            / (2.0 * rhos * rhos)
            - self.c * (self.omega + 1.0) * v.powf(-self.omega) / (2.0 * self.rho0)
    }

    fn cp_m_cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn entropy(&self, _p: f64, _rho: f64, _t: f64) -> Result<f64, PropertyError> {
        Ok(0.0)
    }
}
