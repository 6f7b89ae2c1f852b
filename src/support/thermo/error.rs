use std::fmt;

use thiserror::Error;
use twine_solvers::equation::bisection;

/// Errors that may occur when evaluating thermodynamic properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The input state is outside the closure's valid domain.
    ///
    /// For example, the entropy of a state with non-positive pressure.
    #[error("out of domain: {context}")]
    OutOfDomain { context: String },

    /// The provided state is invalid or inconsistent.
    #[error("invalid state: {context}")]
    InvalidState { context: String },
}

/// The quantity a state-recovery solve was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unknown {
    Temperature,
    Energy,
    Density,
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Temperature => "temperature",
            Self::Energy => "internal energy",
            Self::Density => "density",
        })
    }
}

/// A state-recovery solve exhausted both Newton iteration and bisection.
///
/// Carries the state the solve started from and the last estimate reached so
/// the failing cell can be diagnosed.
#[derive(Debug, Error)]
#[error(
    "{unknown} recovery failed: rho={rho}, e={e}, last estimate={last} after {iters} iterations"
)]
pub struct RecoveryError {
    pub unknown: Unknown,
    pub rho: f64,
    pub e: f64,
    pub last: f64,
    pub iters: usize,
    #[source]
    pub source: Option<bisection::Error>,
}
