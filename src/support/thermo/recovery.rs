//! Iterative inversion of thermodynamic closures.
//!
//! Recovering temperature from `(ρ, e)` is the dominant case: Newton's method
//! on `Es(ρ, T) − e` with `Cv` as the slope, started from the previous
//! temperature. When Newton stalls, diverges or leaves the admissible range
//! the solve falls back to bisection over a fixed bracket, and only if that
//! also fails is a [`RecoveryError`] returned. The same engine inverts
//! pressure for energy or density during initialization.

mod problem;

use thiserror::Error;
use twine_solvers::equation::bisection;

use crate::support::{
    config::{ConfigError, Dictionary},
    constraint::{Constraint, StrictlyPositive},
};

use super::error::{RecoveryError, Unknown};

use problem::{ResidualModel, RootProblem};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecoveryConfigError {
    #[error("max_iters must be at least 1")]
    MaxIters,
    #[error("invalid tolerance {name}: {value}")]
    Tolerance { name: &'static str, value: f64 },
    #[error("invalid temperature bracket [{t_min}, {t_max}]")]
    Bracket { t_min: f64, t_max: f64 },
}

/// Solver settings for state recovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryConfig {
    /// Maximum iteration count for each of the Newton and bisection stages.
    pub max_iters: usize,

    /// Relative tolerance on the inverted quantity, scaled by `max(|target|, 1)`.
    pub rel_tol: f64,

    /// Absolute Newton step below which the solve is converged.
    pub abs_step_tol: f64,

    /// Lower end of the bisection bracket for temperature, K.
    pub t_min: f64,

    /// Upper end of the bisection bracket for temperature, K.
    pub t_max: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            rel_tol: 1e-8,
            abs_step_tol: 1e-10,
            t_min: 1e-3,
            t_max: 1e5,
        }
    }
}

impl RecoveryConfig {
    /// Reads optional `maxIter`, `tolerance`, `stepTolerance`, `TMin` and
    /// `TMax`, keeping defaults for absent keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a present value has the wrong shape or the
    /// resulting settings are invalid.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_iters = dict.scalar_or("maxIter", defaults.max_iters as f64)?;
        let config = Self {
            max_iters: if max_iters >= 1.0 { max_iters as usize } else { 0 },
            rel_tol: dict.scalar_or("tolerance", defaults.rel_tol)?,
            abs_step_tol: dict.scalar_or("stepTolerance", defaults.abs_step_tol)?,
            t_min: dict.scalar_or("TMin", defaults.t_min)?,
            t_max: dict.scalar_or("TMax", defaults.t_max)?,
        };

        config
            .validate()
            .map_err(|err| ConfigError::parameters("recovery", err))?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`RecoveryConfigError`] if `max_iters` is zero, a tolerance is
    /// not strictly positive, or the temperature bracket is empty.
    pub fn validate(&self) -> Result<(), RecoveryConfigError> {
        if self.max_iters == 0 {
            return Err(RecoveryConfigError::MaxIters);
        }
        for (name, value) in [("tolerance", self.rel_tol), ("stepTolerance", self.abs_step_tol)] {
            if StrictlyPositive::check(&value).is_err() {
                return Err(RecoveryConfigError::Tolerance { name, value });
            }
        }
        if StrictlyPositive::check(&self.t_min).is_err() || self.t_max <= self.t_min {
            return Err(RecoveryConfigError::Bracket {
                t_min: self.t_min,
                t_max: self.t_max,
            });
        }
        Ok(())
    }

    /// Temperature bracket for the bisection fallback.
    #[must_use]
    pub fn temperature_bracket(&self) -> [f64; 2] {
        [self.t_min, self.t_max]
    }

    fn bisection(&self, residual_tol: f64) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.abs_step_tol,
            x_rel_tol: 1e-3 * self.rel_tol,
            residual_tol,
        }
    }

    /// Solves `f(x) = inversion.target`, first by Newton's method with slope
    /// `df`, then by bisection over `inversion.bracket`.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError`] when both stages fail.
    pub(crate) fn invert<F, D>(
        &self,
        inversion: Inversion,
        f: F,
        df: D,
    ) -> Result<f64, RecoveryError>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let tol = self.rel_tol * inversion.target.abs().max(1.0);

        let last = match self.newton(&inversion, tol, &f, &df) {
            Ok(x) => return Ok(x),
            Err(last) => last,
        };

        log::debug!(
            "newton {} solve stalled at {last} (rho={}, e={}), falling back to bisection",
            inversion.unknown,
            inversion.rho,
            inversion.e,
        );

        let model = ResidualModel::new(&f);
        let problem = RootProblem::new(inversion.target);

        let outcome = bisection::solve(
            &model,
            &problem,
            inversion.bracket,
            &self.bisection(tol),
            |event: &bisection::Event<'_, _, _>| {
                // A non-finite value means the trial point left the closure's
                // usable range; treat it as overshooting.
                if event.result().is_err() {
                    return Some(bisection::Action::assume_positive());
                }
                None
            },
        );

        let failure = |last: f64, iters: usize, source: Option<bisection::Error>| {
            log::warn!(
                "{} recovery failed: rho={}, e={}, last estimate={last}",
                inversion.unknown,
                inversion.rho,
                inversion.e,
            );
            RecoveryError {
                unknown: inversion.unknown,
                rho: inversion.rho,
                e: inversion.e,
                last,
                iters,
                source,
            }
        };

        match outcome {
            Ok(solution) if solution.status == bisection::Status::Converged => Ok(solution.x),
            Ok(solution) => Err(failure(solution.x, solution.iters, None)),
            Err(err) => Err(failure(last, self.max_iters, Some(err))),
        }
    }

    /// Newton iteration with a final polishing step.
    ///
    /// Returns the last admissible iterate on failure.
    fn newton<F, D>(&self, inversion: &Inversion, tol: f64, f: &F, df: &D) -> Result<f64, f64>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let admissible = |x: f64| x.is_finite() && (!inversion.unknown.positive() || x > 0.0);

        let mut x = inversion.guess;
        if !admissible(x) {
            return Err(x);
        }

        for _ in 0..self.max_iters {
            let residual = f(x) - inversion.target;
            let slope = df(x);
            if !residual.is_finite() || !slope.is_finite() || slope == 0.0 {
                return Err(x);
            }

            let step = residual / slope;
            let next = x - step;
            if !admissible(next) {
                return Err(x);
            }

            if residual.abs() <= tol || step.abs() <= self.abs_step_tol {
                return Ok(next);
            }
            x = next;
        }

        Err(x)
    }
}

/// A one-dimensional inversion `f(x) = target`.
///
/// `rho` and `e` describe the cell state for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Inversion {
    pub unknown: Unknown,
    pub target: f64,
    pub guess: f64,
    pub bracket: [f64; 2],
    pub rho: f64,
    pub e: f64,
}

impl Unknown {
    /// Whether the unknown must stay strictly positive.
    fn positive(self) -> bool {
        !matches!(self, Self::Energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn temperature(target: f64, guess: f64) -> Inversion {
        Inversion {
            unknown: Unknown::Temperature,
            target,
            guess,
            bracket: RecoveryConfig::default().temperature_bracket(),
            rho: 1.0,
            e: target,
        }
    }

    #[test]
    fn newton_converges_on_smooth_energy() {
        // es = 600·T + 0.1·T², cv = 600 + 0.2·T.
        let f = |t: f64| 600.0 * t + 0.1 * t * t;
        let df = |t: f64| 600.0 + 0.2 * t;
        let config = RecoveryConfig::default();

        let t = config.invert(temperature(f(2500.0), 300.0), f, df).unwrap();
        assert_relative_eq!(t, 2500.0, max_relative = 1e-12);
    }

    #[test]
    fn falls_back_to_bisection_when_slope_vanishes() {
        let f = |t: f64| 718.0 * t;
        let df = |_: f64| 0.0;
        let config = RecoveryConfig::default();

        let t = config.invert(temperature(718.0 * 1234.5, 300.0), f, df).unwrap();
        assert_relative_eq!(t, 1234.5, max_relative = 1e-8);
    }

    #[test]
    fn falls_back_to_bisection_from_invalid_guess() {
        let f = |t: f64| 718.0 * t;
        let df = |_: f64| 718.0;
        let config = RecoveryConfig::default();

        let t = config.invert(temperature(718.0 * 450.0, 0.0), f, df).unwrap();
        assert_relative_eq!(t, 450.0, max_relative = 1e-8);
    }

    #[test]
    fn fails_when_target_is_unreachable() {
        // Target below es(t_min): no temperature in the bracket matches it.
        let f = |t: f64| 718.0 * t;
        let df = |_: f64| 0.0;
        let config = RecoveryConfig::default();

        let err = config
            .invert(temperature(-5e5, 300.0), f, df)
            .unwrap_err();
        assert_eq!(err.unknown, Unknown::Temperature);
        assert_relative_eq!(err.e, -5e5);
        assert!(err.to_string().contains("temperature recovery failed"));
    }

    #[test]
    fn energy_may_be_negative() {
        let f = |e: f64| 0.4 * 1.2 * e;
        let df = |_: f64| 0.4 * 1.2;
        let config = RecoveryConfig::default();

        let inversion = Inversion {
            unknown: Unknown::Energy,
            target: -1e4,
            guess: 1e5,
            bracket: [-1e7, 1e7],
            rho: 1.2,
            e: 1e5,
        };
        let e = config.invert(inversion, f, df).unwrap();
        assert_relative_eq!(e, -1e4 / 0.48, max_relative = 1e-10);
    }

    #[test]
    fn reads_overrides_and_rejects_empty_bracket() {
        let dict = Dictionary::new().with("maxIter", 20.0).with("TMax", 6000.0);
        let config = RecoveryConfig::from_dictionary(&dict).unwrap();
        assert_eq!(config.max_iters, 20);
        assert_relative_eq!(config.t_max, 6000.0);
        assert_relative_eq!(config.rel_tol, 1e-8);

        let dict = Dictionary::new().with("TMin", 500.0).with("TMax", 400.0);
        assert!(RecoveryConfig::from_dictionary(&dict).is_err());
    }
}
