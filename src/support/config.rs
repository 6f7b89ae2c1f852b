//! Flat parameter dictionaries and runtime model selection.
//!
//! Every closure, caloric model, transport model and afterburn model is
//! selected by the word stored under its `type` key and then constructed
//! from the remaining entries. Reading the dictionaries from files is left to
//! the caller; both types deserialize with `serde`.
//!
//! ```
//! use detonation_thermo::support::config::Dictionary;
//!
//! let dict = Dictionary::new()
//!     .with("type", "idealGas")
//!     .with("gamma", 1.4);
//!
//! assert_eq!(dict.type_name().unwrap(), "idealGas");
//! assert_eq!(dict.scalar("gamma").unwrap(), 1.4);
//! assert!(dict.scalar("rho0").is_err());
//! ```

use std::{collections::BTreeMap, error::Error as StdError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default residual density and residual volume fraction.
pub const DEFAULT_RESIDUAL: f64 = 1e-6;

/// A single dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    List(Vec<f64>),
    Word(String),
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Self::List(value)
    }
}

impl From<&[f64]> for Value {
    fn from(value: &[f64]) -> Self {
        Self::List(value.to_vec())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Word(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Word(value)
    }
}

/// Errors raised while selecting or constructing a model from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing key `{key}`")]
    MissingKey { key: String },

    #[error("key `{key}` must be a {expected}")]
    InvalidValue { key: String, expected: &'static str },

    #[error("unknown {kind} type `{name}`, valid types are {valid:?}")]
    UnknownType {
        kind: &'static str,
        name: String,
        valid: &'static [&'static str],
    },

    #[error("invalid {model} parameters")]
    Parameters {
        model: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ConfigError {
    /// Wraps a typed parameter validation error for the named model.
    pub fn parameters(model: &'static str, err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Parameters {
            model,
            source: Box::new(err),
        }
    }

    /// Builds an [`ConfigError::UnknownType`] error.
    pub fn unknown_type(
        kind: &'static str,
        name: impl Into<String>,
        valid: &'static [&'static str],
    ) -> Self {
        Self::UnknownType {
            kind,
            name: name.into(),
            valid,
        }
    }
}

/// A flat mapping from keys to scalars, scalar lists or words.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: BTreeMap<String, Value>,
}

impl Dictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dictionary with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, replacing any previous entry.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Result<&Value, ConfigError> {
        self.entries.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_owned(),
        })
    }

    /// Returns the scalar stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is missing or not a scalar.
    pub fn scalar(&self, key: &str) -> Result<f64, ConfigError> {
        match self.get(key)? {
            Value::Scalar(value) => Ok(*value),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_owned(),
                expected: "scalar",
            }),
        }
    }

    /// Returns the scalar stored under `key`, or `default` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is present but not a scalar.
    pub fn scalar_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        if self.contains(key) {
            self.scalar(key)
        } else {
            Ok(default)
        }
    }

    /// Returns the scalar list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is missing or not a list.
    pub fn list(&self, key: &str) -> Result<&[f64], ConfigError> {
        match self.get(key)? {
            Value::List(values) => Ok(values),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_owned(),
                expected: "list of scalars",
            }),
        }
    }

    /// Returns the word stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is missing or not a word.
    pub fn word(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key)? {
            Value::Word(word) => Ok(word),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_owned(),
                expected: "word",
            }),
        }
    }

    /// Returns the word stored under `key`, or `default` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is present but not a word.
    pub fn word_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        if self.contains(key) {
            self.word(key)
        } else {
            Ok(default)
        }
    }

    /// Returns the selector word stored under `type`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `type` is missing or not a word.
    pub fn type_name(&self) -> Result<&str, ConfigError> {
        self.word("type")
    }
}

/// Configuration of one phase's thermodynamic model.
///
/// Each sub-dictionary selects its model through a `type` entry.
/// `transport`, `afterburn` and `recovery` may be omitted, in which case the
/// phase is inviscid, releases no afterburn energy and uses the default
/// state-recovery settings. `limit` defaults to on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermoConfig {
    pub specie: Dictionary,
    pub equation_of_state: Dictionary,
    pub thermodynamics: Dictionary,
    #[serde(default)]
    pub transport: Dictionary,
    #[serde(default)]
    pub afterburn: Dictionary,
    #[serde(default)]
    pub recovery: Dictionary,
    #[serde(default = "default_residual")]
    pub residual_rho: f64,
    #[serde(default = "default_residual")]
    pub residual_alpha: f64,
    /// Whether the outer solver bounds internal energy.
    #[serde(default = "default_limit")]
    pub limit: bool,
}

fn default_residual() -> f64 {
    DEFAULT_RESIDUAL
}

fn default_limit() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_report_the_offending_key() {
        let dict = Dictionary::new()
            .with("type", "JWLC")
            .with("rho0", 1630.0)
            .with("coeffs", vec![1.0, 2.0]);

        assert_eq!(dict.scalar("rho0").unwrap(), 1630.0);
        assert_eq!(dict.list("coeffs").unwrap(), &[1.0, 2.0]);

        let err = dict.scalar("type").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "type"));

        let err = dict.scalar("omega").unwrap_err();
        assert_eq!(err.to_string(), "missing key `omega`");
    }

    #[test]
    fn defaults_apply_only_when_absent() {
        let dict = Dictionary::new().with("Tref", "hot");

        assert_eq!(dict.scalar_or("Hf", 0.0).unwrap(), 0.0);
        assert!(dict.scalar_or("Tref", 298.15).is_err());
        assert_eq!(dict.word_or("type", "none").unwrap(), "none");
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "specie": { "molWeight": 28.96 },
            "equationOfState": { "type": "idealGas", "gamma": 1.4 },
            "thermodynamics": { "type": "eConst", "Cv": 718.0, "Hf": 0.0 },
            "transport": { "type": "const", "mu": 1.8e-5, "Pr": 0.7 },
            "residualRho": 1e-8
        }"#;

        let config: ThermoConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.equation_of_state.type_name().unwrap(), "idealGas");
        assert_eq!(config.specie.scalar("molWeight").unwrap(), 28.96);
        assert_eq!(config.residual_rho, 1e-8);
        assert_eq!(config.residual_alpha, DEFAULT_RESIDUAL);
        assert!(config.limit);
        assert!(config.afterburn.type_name().is_err());
    }

    #[test]
    fn reads_energy_limit_switch() {
        let json = r#"{
            "specie": { "molWeight": 28.96 },
            "equationOfState": { "type": "idealGas", "gamma": 1.4 },
            "thermodynamics": { "type": "eConst", "Cv": 718.0, "Hf": 0.0 },
            "limit": false
        }"#;

        let config: ThermoConfig = serde_json::from_str(json).unwrap();
        assert!(!config.limit);
    }
}
