//! Molecular transport of momentum and heat.

use thiserror::Error;
use uom::si::{dynamic_viscosity::pascal_second, f64::DynamicViscosity};

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constrained, NonNegative, StrictlyPositive},
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportParametersError {
    #[error("viscosity must be non-negative: {mu:?}")]
    Viscosity { mu: DynamicViscosity },
    #[error("Prandtl number must be strictly positive: {pr}")]
    Prandtl { pr: f64 },
}

/// Constant viscosity and Prandtl number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantTransport {
    mu: Constrained<f64, NonNegative>,
    pr: Constrained<f64, StrictlyPositive>,
}

impl ConstantTransport {
    /// # Errors
    ///
    /// Returns [`TransportParametersError`] if `mu` is negative or `pr` is
    /// not strictly positive.
    pub fn new(mu: DynamicViscosity, pr: f64) -> Result<Self, TransportParametersError> {
        Ok(Self {
            mu: NonNegative::new(mu.get::<pascal_second>())
                .map_err(|_| TransportParametersError::Viscosity { mu })?,
            pr: StrictlyPositive::new(pr).map_err(|_| TransportParametersError::Prandtl { pr })?,
        })
    }

    #[must_use]
    pub fn viscosity(&self) -> DynamicViscosity {
        DynamicViscosity::new::<pascal_second>(*self.mu.as_ref())
    }

    #[must_use]
    pub fn prandtl(&self) -> f64 {
        self.pr.into_inner()
    }

    /// Reads `mu` (Pa·s) and `Pr`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing or a value is invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        Self::new(
            DynamicViscosity::new::<pascal_second>(dict.scalar("mu")?),
            dict.scalar("Pr")?,
        )
        .map_err(|err| ConfigError::parameters("const", err))
    }
}

/// Runtime-selected transport model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transport {
    #[default]
    Inviscid,
    Constant(ConstantTransport),
}

impl Transport {
    pub const TYPES: &'static [&'static str] = &["none", "const"];

    /// Selects the model named by `type`, or [`Transport::Inviscid`] when the
    /// dictionary names none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown type or invalid parameters.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let name = dict.word_or("type", "none")?;
        log::debug!("selecting transport model {name}");
        match name {
            "none" => Ok(Self::Inviscid),
            "const" => Ok(Self::Constant(ConstantTransport::from_dictionary(dict)?)),
            _ => Err(ConfigError::unknown_type("transport", name, Self::TYPES)),
        }
    }

    /// Dynamic viscosity, Pa·s.
    #[must_use]
    pub fn mu(&self, _t: f64) -> f64 {
        match self {
            Self::Inviscid => 0.0,
            Self::Constant(model) => *model.mu.as_ref(),
        }
    }

    /// Thermal conductivity `κ = Cp·μ/Pr`, W/(m·K).
    #[must_use]
    pub fn kappa(&self, cp: f64, t: f64) -> f64 {
        match self {
            Self::Inviscid => 0.0,
            Self::Constant(model) => cp * self.mu(t) / model.prandtl(),
        }
    }

    /// Thermal diffusivity of enthalpy `α = κ/Cp`, kg/(m·s).
    #[must_use]
    pub fn alpha(&self, t: f64) -> f64 {
        match self {
            Self::Inviscid => 0.0,
            Self::Constant(model) => self.mu(t) / model.prandtl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn absent_type_is_inviscid() {
        let transport = Transport::from_dictionary(&Dictionary::new()).unwrap();
        assert_eq!(transport, Transport::Inviscid);
        assert_eq!(transport.mu(300.0), 0.0);
        assert_eq!(transport.kappa(1005.0, 300.0), 0.0);
    }

    #[test]
    fn constant_transport_relates_kappa_and_alpha() {
        let dict = Dictionary::new()
            .with("type", "const")
            .with("mu", 1.8e-5)
            .with("Pr", 0.7);
        let transport = Transport::from_dictionary(&dict).unwrap();

        let cp = 1005.0;
        assert_relative_eq!(transport.mu(300.0), 1.8e-5);
        assert_relative_eq!(transport.kappa(cp, 300.0), cp * 1.8e-5 / 0.7);
        assert_relative_eq!(transport.alpha(300.0), transport.kappa(cp, 300.0) / cp);
    }

    #[test]
    fn constant_transport_keeps_validated_parameters() {
        let model =
            ConstantTransport::new(DynamicViscosity::new::<pascal_second>(0.0), 0.72).unwrap();
        assert_eq!(model.viscosity().get::<pascal_second>(), 0.0);
        assert_relative_eq!(model.prandtl(), 0.72);

        let err = ConstantTransport::new(DynamicViscosity::new::<pascal_second>(-1e-5), 0.72)
            .unwrap_err();
        assert!(matches!(err, TransportParametersError::Viscosity { .. }));
    }

    #[test]
    fn rejects_unknown_type_and_bad_prandtl() {
        let err = Transport::from_dictionary(&Dictionary::new().with("type", "sutherland"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType { .. }));

        let dict = Dictionary::new()
            .with("type", "const")
            .with("mu", 1.8e-5)
            .with("Pr", 0.0);
        assert!(Transport::from_dictionary(&dict).is_err());
    }
}
