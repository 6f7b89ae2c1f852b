//! Afterburn energy release.
//!
//! An afterburn model adds the energy released by late combustion of
//! detonation products to the phase's energy equation. Only the inert model
//! is provided; reacting models plug in through [`AfterburnModel`].

use std::fmt;

use crate::support::config::{ConfigError, Dictionary};

use super::fluid::ThermoView;

/// Source of afterburn energy.
pub trait AfterburnModel: Send + Sync + fmt::Debug {
    /// Energy release rate per cell, W/m³.
    fn e_source(&self, view: &ThermoView<'_>) -> Vec<f64>;
}

/// No afterburn: releases nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoAfterburn;

impl AfterburnModel for NoAfterburn {
    fn e_source(&self, view: &ThermoView<'_>) -> Vec<f64> {
        vec![0.0; view.n_cells()]
    }
}

/// Runtime-selected afterburn model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Afterburn {
    Inert(NoAfterburn),
}

impl Default for Afterburn {
    fn default() -> Self {
        Self::Inert(NoAfterburn)
    }
}

impl Afterburn {
    pub const TYPES: &'static [&'static str] = &["none"];

    /// Selects the model named by `type`, or no afterburn when the dictionary
    /// names none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownType`] for any other type.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let name = dict.word_or("type", "none")?;
        log::debug!("selecting afterburn model {name}");
        match name {
            "none" => Ok(Self::Inert(NoAfterburn)),
            _ => Err(ConfigError::unknown_type("afterburn", name, Self::TYPES)),
        }
    }
}

impl AfterburnModel for Afterburn {
    fn e_source(&self, view: &ThermoView<'_>) -> Vec<f64> {
        match self {
            Self::Inert(model) => model.e_source(view),
        }
    }
}
