//! Problem formulation for the bracketed fallback solve.

use std::convert::Infallible;

use thiserror::Error;
use twine_core::{EquationProblem, Model};

/// The inverted function produced a non-finite value.
#[derive(Debug, Error)]
#[error("non-finite value at x={x}")]
pub(super) struct NonFinite {
    x: f64,
}

/// Model adapter exposing a scalar function of the unknown.
pub(super) struct ResidualModel<'a, F> {
    f: &'a F,
}

impl<'a, F> ResidualModel<'a, F> {
    pub(super) fn new(f: &'a F) -> Self {
        Self { f }
    }
}

impl<F> Model for ResidualModel<'_, F>
where
    F: Fn(f64) -> f64,
{
    type Input = f64;
    type Output = f64;
    type Error = NonFinite;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let value = (self.f)(*input);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(NonFinite { x: *input })
        }
    }
}

/// Equation problem `f(x) − target = 0`.
pub(super) struct RootProblem {
    target: f64,
}

impl RootProblem {
    pub(super) fn new(target: f64) -> Self {
        Self { target }
    }
}

impl EquationProblem<1> for RootProblem {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(x[0])
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output - self.target])
    }
}
