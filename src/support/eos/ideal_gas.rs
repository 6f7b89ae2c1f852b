use thiserror::Error;

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, StrictlyPositive},
    thermo::{PropertyError, Specie},
};

use super::{EquationOfState, ideal_entropy};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdealGasParametersError {
    #[error("gamma must exceed 1: {gamma}")]
    Gamma { gamma: f64 },
    #[error("invalid gas constant R: {r}")]
    GasConstant { r: f64 },
}

/// Ideal gas, `p = (γ − 1)·ρ·e`.
///
/// Carries no energy or enthalpy departure, so combined with a constant
/// heat capacity model temperature follows from energy in closed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGas {
    gamma: f64,
    r: f64,
}

impl IdealGas {
    /// Creates an ideal gas with heat capacity ratio `gamma` and specific
    /// gas constant `r` in J/(kg·K).
    ///
    /// # Errors
    ///
    /// Returns [`IdealGasParametersError`] if `gamma ≤ 1` or `r ≤ 0`.
    pub fn new(gamma: f64, r: f64) -> Result<Self, IdealGasParametersError> {
        if StrictlyPositive::check(&(gamma - 1.0)).is_err() || !gamma.is_finite() {
            return Err(IdealGasParametersError::Gamma { gamma });
        }
        if StrictlyPositive::check(&r).is_err() {
            return Err(IdealGasParametersError::GasConstant { r });
        }
        Ok(Self { gamma, r })
    }

    /// Reads `gamma`; the gas constant comes from the specie.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `gamma` is missing or invalid.
    pub fn from_dictionary(dict: &Dictionary, specie: &Specie) -> Result<Self, ConfigError> {
        Self::new(dict.scalar("gamma")?, specie.r())
            .map_err(|err| ConfigError::parameters("idealGas", err))
    }
}

impl EquationOfState for IdealGas {
    fn pressure(&self, rho: f64, e: f64, _t: f64) -> f64 {
        (self.gamma - 1.0) * rho * e
    }

    fn gamma(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.gamma
    }

    fn pi(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn delta(&self, _p: f64, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn dpdv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        -rho * rho * (self.gamma - 1.0) * e
    }

    fn dpde(&self, rho: f64, _e: f64, _t: f64) -> f64 {
        (self.gamma - 1.0) * rho
    }

    fn energy_correction(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn enthalpy_correction(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn cp_m_cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.r
    }

    fn entropy(&self, p: f64, _rho: f64, _t: f64) -> Result<f64, PropertyError> {
        ideal_entropy(self.r, p)
    }

    fn speed_of_sound_sqr(&self, _p: f64, _rho: f64, e: f64, _t: f64) -> f64 {
        self.gamma * (self.gamma - 1.0) * e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::eos::test_support::{
        air, assert_derivatives_consistent, assert_mie_gruneisen_identities,
    };

    fn air_eos() -> IdealGas {
        IdealGas::new(1.4, air().r()).unwrap()
    }

    fn samples() -> Vec<(f64, f64, f64)> {
        let mut samples = Vec::new();
        for rho in [1e-3, 0.1, 1.2, 50.0] {
            for e in [1e4, 2.15e5, 3e6] {
                samples.push((rho, e, 300.0));
            }
        }
        samples
    }

    #[test]
    fn reduces_to_ideal_gas() {
        let eos = air_eos();

        for (rho, e, t) in samples() {
            let p = eos.pressure(rho, e, t);
            assert_relative_eq!(eos.gamma(rho, e, t), 1.4);
            assert_relative_eq!(
                eos.speed_of_sound_sqr(p, rho, e, t),
                1.4 * p / rho,
                max_relative = 1e-12
            );
            assert_eq!(eos.pi(rho, e, t), 0.0);
            assert_eq!(eos.delta(p, rho, e, t), 0.0);
            assert_eq!(eos.energy_correction(rho, e, t), 0.0);
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let eos = air_eos();
        assert_derivatives_consistent(&eos, &samples());
        assert_mie_gruneisen_identities(&eos, &samples());
    }

    #[test]
    fn general_sound_speed_formula_agrees() {
        let eos = air_eos();
        let (rho, e) = (1.2, 2.15e5);
        let p = eos.pressure(rho, e, 300.0);
        let general = (p * eos.dpde(rho, e, 300.0) - eos.dpdv(rho, e, 300.0)) / (rho * rho);
        assert_relative_eq!(
            eos.speed_of_sound_sqr(p, rho, e, 300.0),
            general,
            max_relative = 1e-12
        );
    }

    #[test]
    fn never_clamps_density() {
        let eos = air_eos();
        assert_eq!(eos.pressure(0.0, 2e5, 300.0), 0.0);
        assert_relative_eq!(eos.pressure(1e-12, 2e5, 300.0), 0.4 * 1e-12 * 2e5);
    }

    #[test]
    fn entropy_is_zero_at_standard_pressure() {
        let eos = air_eos();
        assert_relative_eq!(eos.entropy(1e5, 1.0, 300.0).unwrap(), 0.0);
        assert_relative_eq!(
            eos.entropy(2e5, 1.0, 300.0).unwrap(),
            -air().r() * 2.0_f64.ln()
        );
        assert!(eos.entropy(0.0, 1.0, 300.0).is_err());
    }

    #[test]
    fn rejects_gamma_at_or_below_one() {
        assert_eq!(
            IdealGas::new(1.0, 287.0),
            Err(IdealGasParametersError::Gamma { gamma: 1.0 })
        );
        assert!(IdealGas::new(1.4, 0.0).is_err());
    }
}
