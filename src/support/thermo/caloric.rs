//! Base heat-capacity models.
//!
//! A caloric model supplies the thermal part of internal energy as a
//! function of temperature alone. Equation-of-state closures add their
//! density-dependent departures on top.

use std::fmt;

use thiserror::Error;
use uom::si::{
    f64::{SpecificHeatCapacity, ThermodynamicTemperature},
    available_energy::joule_per_kilogram,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, Finite, NonNegative, StrictlyPositive},
    units::SpecificInternalEnergy,
};

/// Standard temperature used as the entropy reference, K.
pub const STANDARD_TEMPERATURE: f64 = 298.15;

/// Temperature-only heat capacity and sensible energy.
pub trait CaloricModel: Send + Sync + fmt::Debug {
    /// Heat capacity at constant volume, J/(kg·K).
    fn cv(&self, t: f64) -> f64;

    /// Sensible internal energy relative to the model's reference temperature.
    fn es(&self, t: f64) -> f64;

    /// Heat of formation, J/kg.
    fn hf(&self) -> f64;

    /// Entropy relative to [`STANDARD_TEMPERATURE`] at constant volume.
    fn s(&self, t: f64) -> f64;

    /// Inverts [`CaloricModel::es`] in closed form, if the model can.
    fn temperature(&self, _es: f64) -> Option<f64> {
        None
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaloricParametersError {
    #[error("invalid cv: {cv:?}")]
    Cv { cv: SpecificHeatCapacity },
    #[error("cv polynomial needs at least one finite coefficient")]
    Coefficients,
    #[error("invalid heat of formation: {hf:?}")]
    HeatOfFormation { hf: SpecificInternalEnergy },
    #[error("invalid reference temperature: {t_ref:?}")]
    ReferenceTemperature { t_ref: ThermodynamicTemperature },
}

fn check_offsets(hf: f64, t_ref: f64) -> Result<(), CaloricParametersError> {
    if Finite::check(&hf).is_err() {
        return Err(CaloricParametersError::HeatOfFormation {
            hf: SpecificInternalEnergy::new::<joule_per_kilogram>(hf),
        });
    }
    if NonNegative::check(&t_ref).is_err() || !t_ref.is_finite() {
        return Err(CaloricParametersError::ReferenceTemperature {
            t_ref: ThermodynamicTemperature::new::<kelvin>(t_ref),
        });
    }
    Ok(())
}

/// Constant heat capacity, `es = Cv·(T − Tref)`.
///
/// `Tref` defaults to 0 K so that `es = Cv·T`, the convention under which an
/// ideal gas `p = (γ − 1)·ρ·e` stays positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantCv {
    cv: f64,
    hf: f64,
    t_ref: f64,
}

impl ConstantCv {
    /// # Errors
    ///
    /// Returns [`CaloricParametersError`] if `cv` is not strictly positive,
    /// `hf` is not finite, or `t_ref` is negative.
    pub fn new(
        cv: SpecificHeatCapacity,
        hf: SpecificInternalEnergy,
        t_ref: ThermodynamicTemperature,
    ) -> Result<Self, CaloricParametersError> {
        let cv_value = cv.get::<joule_per_kilogram_kelvin>();
        if StrictlyPositive::check(&cv_value).is_err() || !cv_value.is_finite() {
            return Err(CaloricParametersError::Cv { cv });
        }

        let (hf, t_ref) = (hf.get::<joule_per_kilogram>(), t_ref.get::<kelvin>());
        check_offsets(hf, t_ref)?;

        Ok(Self {
            cv: cv_value,
            hf,
            t_ref,
        })
    }

    /// Reads `Cv`, `Hf` and the optional `Tref`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a value is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Self::new(
            SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(dict.scalar("Cv")?),
            SpecificInternalEnergy::new::<joule_per_kilogram>(dict.scalar("Hf")?),
            ThermodynamicTemperature::new::<kelvin>(dict.scalar_or("Tref", 0.0)?),
        )
        .map_err(|err| ConfigError::parameters("eConst", err))
    }
}

impl CaloricModel for ConstantCv {
    fn cv(&self, _t: f64) -> f64 {
        self.cv
    }

    fn es(&self, t: f64) -> f64 {
        self.cv * (t - self.t_ref)
    }

    fn hf(&self) -> f64 {
        self.hf
    }

    fn s(&self, t: f64) -> f64 {
        self.cv * (t / STANDARD_TEMPERATURE).ln()
    }

    fn temperature(&self, es: f64) -> Option<f64> {
        Some(es / self.cv + self.t_ref)
    }
}

/// Polynomial heat capacity, `Cv(T) = Σ cᵢ·Tⁱ`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialCv {
    coeffs: Vec<f64>,
    hf: f64,
    es_ref: f64,
}

impl PolynomialCv {
    /// # Errors
    ///
    /// Returns [`CaloricParametersError`] if `coeffs` is empty or not finite,
    /// `hf` is not finite, or `t_ref` is negative.
    pub fn new(
        coeffs: Vec<f64>,
        hf: SpecificInternalEnergy,
        t_ref: ThermodynamicTemperature,
    ) -> Result<Self, CaloricParametersError> {
        if coeffs.is_empty() || coeffs.iter().any(|c| Finite::check(c).is_err()) {
            return Err(CaloricParametersError::Coefficients);
        }

        let (hf, t_ref) = (hf.get::<joule_per_kilogram>(), t_ref.get::<kelvin>());
        check_offsets(hf, t_ref)?;

        let mut model = Self {
            coeffs,
            hf,
            es_ref: 0.0,
        };
        model.es_ref = model.integral(t_ref);
        Ok(model)
    }

    /// Reads the `CvCoeffs` list, `Hf` and the optional `Tref`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a value is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Self::new(
            dict.list("CvCoeffs")?.to_vec(),
            SpecificInternalEnergy::new::<joule_per_kilogram>(dict.scalar("Hf")?),
            ThermodynamicTemperature::new::<kelvin>(dict.scalar_or("Tref", 0.0)?),
        )
        .map_err(|err| ConfigError::parameters("ePolynomial", err))
    }

    /// `∫₀ᵀ Cv dT`.
    fn integral(&self, t: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .rev()
            .fold(0.0, |acc, (i, c)| acc * t + c / (i as f64 + 1.0))
            * t
    }
}

impl CaloricModel for PolynomialCv {
    fn cv(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    fn es(&self, t: f64) -> f64 {
        self.integral(t) - self.es_ref
    }

    fn hf(&self) -> f64 {
        self.hf
    }

    fn s(&self, t: f64) -> f64 {
        let t_std = STANDARD_TEMPERATURE;
        let (mut t_pow, mut std_pow) = (1.0, 1.0);

        let mut s = self.coeffs[0] * (t / t_std).ln();
        for (i, c) in self.coeffs.iter().enumerate().skip(1) {
            t_pow *= t;
            std_pow *= t_std;
            s += c / i as f64 * (t_pow - std_pow);
        }
        s
    }
}

/// Runtime-selected caloric model.
#[derive(Debug, Clone, PartialEq)]
pub enum Caloric {
    Constant(ConstantCv),
    Polynomial(PolynomialCv),
}

impl Caloric {
    pub const TYPES: &'static [&'static str] = &["eConst", "ePolynomial"];

    /// Selects a caloric model by its `type` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the type is unknown or a parameter is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let name = dict.type_name()?;
        log::debug!("selecting caloric model `{name}`");

        match name {
            "eConst" => ConstantCv::from_dictionary(dict).map(Self::Constant),
            "ePolynomial" => PolynomialCv::from_dictionary(dict).map(Self::Polynomial),
            other => Err(ConfigError::unknown_type("thermodynamics", other, Self::TYPES)),
        }
    }

    fn inner(&self) -> &dyn CaloricModel {
        match self {
            Self::Constant(model) => model,
            Self::Polynomial(model) => model,
        }
    }
}

impl CaloricModel for Caloric {
    fn cv(&self, t: f64) -> f64 {
        self.inner().cv(t)
    }

    fn es(&self, t: f64) -> f64 {
        self.inner().es(t)
    }

    fn hf(&self) -> f64 {
        self.inner().hf()
    }

    fn s(&self, t: f64) -> f64 {
        self.inner().s(t)
    }

    fn temperature(&self, es: f64) -> Option<f64> {
        self.inner().temperature(es)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::eos::test_support::central_difference;

    #[test]
    fn constant_cv_inverts_exactly() {
        let dict = Dictionary::new()
            .with("type", "eConst")
            .with("Cv", 718.0)
            .with("Hf", 0.0);
        let caloric = Caloric::from_dictionary(&dict).unwrap();

        assert_relative_eq!(caloric.es(300.0), 718.0 * 300.0);
        assert_relative_eq!(caloric.temperature(caloric.es(300.0)).unwrap(), 300.0);
        assert_relative_eq!(caloric.s(STANDARD_TEMPERATURE), 0.0);
    }

    #[test]
    fn reference_temperature_shifts_energy() {
        let model = ConstantCv::new(
            SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(1000.0),
            SpecificInternalEnergy::new::<joule_per_kilogram>(-2e6),
            ThermodynamicTemperature::new::<kelvin>(298.15),
        )
        .unwrap();

        assert_relative_eq!(model.es(298.15), 0.0);
        assert_relative_eq!(model.temperature(1e5).unwrap(), 398.15);
        assert_relative_eq!(model.hf(), -2e6);
    }

    #[test]
    fn polynomial_energy_integrates_cv() {
        let model = PolynomialCv::new(
            vec![600.0, 0.25, -2e-5],
            SpecificInternalEnergy::new::<joule_per_kilogram>(0.0),
            ThermodynamicTemperature::new::<kelvin>(298.15),
        )
        .unwrap();

        assert_relative_eq!(model.es(298.15), 0.0, epsilon = 1e-9);
        assert!(model.temperature(1e5).is_none());

        for t in [200.0, 1000.0, 3500.0] {
            assert_relative_eq!(
                central_difference(|x| model.es(x), t),
                model.cv(t),
                max_relative = 1e-8
            );
            assert_relative_eq!(
                central_difference(|x| model.s(x), t),
                model.cv(t) / t,
                max_relative = 1e-8
            );
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        let dict = Dictionary::new()
            .with("type", "eConst")
            .with("Cv", -1.0)
            .with("Hf", 0.0);
        assert!(matches!(
            Caloric::from_dictionary(&dict),
            Err(ConfigError::Parameters { model: "eConst", .. })
        ));

        let dict = Dictionary::new()
            .with("type", "ePolynomial")
            .with("CvCoeffs", Vec::<f64>::new())
            .with("Hf", 0.0);
        assert!(matches!(
            Caloric::from_dictionary(&dict),
            Err(ConfigError::Parameters { model: "ePolynomial", .. })
        ));

        let dict = Dictionary::new().with("type", "hConst");
        assert!(matches!(
            Caloric::from_dictionary(&dict),
            Err(ConfigError::UnknownType { .. })
        ));
    }
}
