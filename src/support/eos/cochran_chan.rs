//! Cochran–Chan Mie–Grüneisen closure for condensed explosives.
//!
//! The reference curve is the Cochran–Chan isentrope
//!
//! ```text
//! p_ref(V) = A·V^(−ε1) − B·V^(−ε2),   V = ρ0/ρ
//! ```
//!
//! with `e_ref` its energy integral, zero at `V = 1`. Pressure is
//! `p = p_ref + Γ0·ρ·(e − e_ref)`, so `Γ = Γ0 + 1` and
//! `Π = Γ0·ρ·e_ref − p_ref`.

use thiserror::Error;
use uom::si::{
    f64::{MassDensity, Pressure},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
};

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, Finite, StrictlyPositive},
    thermo::{PropertyError, Specie},
};

use super::{EquationOfState, clamp_density, ideal_entropy};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CochranChanParametersError {
    #[error("invalid reference density: {rho0:?}")]
    ReferenceDensity { rho0: MassDensity },
    #[error("invalid Grüneisen coefficient Gamma0: {gamma0}")]
    Gamma0 { gamma0: f64 },
    #[error("invalid isentrope coefficient {name}: {value:?}")]
    Coefficient { name: &'static str, value: Pressure },
    #[error("exponent {name} must be finite and differ from 1: {value}")]
    Exponent { name: &'static str, value: f64 },
}

/// Parameters of the [`CochranChan`] closure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CochranChanParameters {
    pub rho0: MassDensity,
    pub gamma0: f64,
    pub a: Pressure,
    pub b: Pressure,
    pub epsilon1: f64,
    pub epsilon2: f64,
}

impl CochranChanParameters {
    /// Reads `rho0`, `Gamma0`, `A`, `B`, `epsilon1` and `epsilon2`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid key.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Ok(Self {
            rho0: MassDensity::new::<kilogram_per_cubic_meter>(dict.scalar("rho0")?),
            gamma0: dict.scalar("Gamma0")?,
            a: Pressure::new::<pascal>(dict.scalar("A")?),
            b: Pressure::new::<pascal>(dict.scalar("B")?),
            epsilon1: dict.scalar("epsilon1")?,
            epsilon2: dict.scalar("epsilon2")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CochranChan {
    rho0: f64,
    gamma0: f64,
    a: f64,
    b: f64,
    epsilon1: f64,
    epsilon2: f64,
    r: f64,
}

impl CochranChan {
    /// Creates the closure from validated parameters and the specie's gas
    /// constant `r`.
    ///
    /// # Errors
    ///
    /// Returns [`CochranChanParametersError`] if `rho0` or `Gamma0` is not
    /// strictly positive, a coefficient is not finite, or an exponent equals 1.
    pub fn new(
        parameters: CochranChanParameters,
        r: f64,
    ) -> Result<Self, CochranChanParametersError> {
        let rho0 = parameters.rho0.get::<kilogram_per_cubic_meter>();
        if StrictlyPositive::check(&rho0).is_err() {
            return Err(CochranChanParametersError::ReferenceDensity {
                rho0: parameters.rho0,
            });
        }

        if StrictlyPositive::check(&parameters.gamma0).is_err() {
            return Err(CochranChanParametersError::Gamma0 {
                gamma0: parameters.gamma0,
            });
        }

        for (name, value) in [("A", parameters.a), ("B", parameters.b)] {
            if Finite::check(&value.get::<pascal>()).is_err() {
                return Err(CochranChanParametersError::Coefficient { name, value });
            }
        }

        for (name, value) in [
            ("epsilon1", parameters.epsilon1),
            ("epsilon2", parameters.epsilon2),
        ] {
            if Finite::check(&value).is_err() || value == 1.0 {
                return Err(CochranChanParametersError::Exponent { name, value });
            }
        }

        Ok(Self {
            rho0,
            gamma0: parameters.gamma0,
            a: parameters.a.get::<pascal>(),
            b: parameters.b.get::<pascal>(),
            epsilon1: parameters.epsilon1,
            epsilon2: parameters.epsilon2,
            r,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a parameter is invalid.
    pub fn from_dictionary(dict: &Dictionary, specie: &Specie) -> Result<Self, ConfigError> {
        Self::new(CochranChanParameters::from_dictionary(dict)?, specie.r())
            .map_err(|err| ConfigError::parameters("CochranChan", err))
    }

    fn relative_volume(&self, rho: f64) -> f64 {
        self.rho0 / clamp_density(rho)
    }

    fn reference_pressure(&self, v: f64) -> f64 {
        self.a * v.powf(-self.epsilon1) - self.b * v.powf(-self.epsilon2)
    }

    fn reference_energy(&self, v: f64) -> f64 {
        -self.a / ((1.0 - self.epsilon1) * self.rho0) * (v.powf(1.0 - self.epsilon1) - 1.0)
            + self.b / ((1.0 - self.epsilon2) * self.rho0) * (v.powf(1.0 - self.epsilon2) - 1.0)
    }

    /// `(∂Π/∂ρ)_e`.
    fn dpi_drho(&self, rho: f64) -> f64 {
        let rhos = clamp_density(rho);
        let v = self.relative_volume(rho);
        let p_ref = self.reference_pressure(v);
        let dp_ref = (self.a * self.epsilon1 * v.powf(-self.epsilon1)
            - self.b * self.epsilon2 * v.powf(-self.epsilon2))
            / rhos;
        let de_ref = p_ref / (rhos * rhos);

        self.gamma0 * self.reference_energy(v) + self.gamma0 * rho * de_ref - dp_ref
    }
}

impl EquationOfState for CochranChan {
    fn pressure(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.gamma0 * rho * e - self.pi(rho, e, t)
    }

    fn gamma(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.gamma0 + 1.0
    }

    fn pi(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        self.gamma0 * rho * self.reference_energy(v) - self.reference_pressure(v)
    }

    fn delta(&self, _p: f64, rho: f64, _e: f64, _t: f64) -> f64 {
        self.dpi_drho(rho) / self.gamma0
    }

    fn dpdv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        -rho * rho * (self.gamma0 * e - self.dpi_drho(rho))
    }

    fn dpde(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        self.gamma0 * rho
    }

    fn energy_correction(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        self.a / ((self.epsilon1 - 1.0) * self.rho0) * v.powf(1.0 - self.epsilon1)
            - self.b / ((self.epsilon2 - 1.0) * self.rho0) * v.powf(1.0 - self.epsilon2)
    }

    /// Only `V` is clamped; the logarithm takes the raw density.
    fn enthalpy_correction(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        let v = self.relative_volume(rho);
        let term = |coefficient: f64, epsilon: f64| {
            (epsilon * (epsilon - self.gamma0 - 1.0) * v * v.powf(-epsilon)
                + (epsilon - 1.0) * self.gamma0 * rho.ln())
                * coefficient
                / (self.rho0 * (epsilon - 1.0).powi(2))
        };
        term(self.a, self.epsilon1) + term(self.b, self.epsilon2)
    }

    fn cp_m_cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.r
    }

    fn entropy(&self, p: f64, _rho: f64, _t: f64) -> Result<f64, PropertyError> {
        ideal_entropy(self.r, p)
    }
}
