use crate::support::{
    config::{DEFAULT_RESIDUAL, Dictionary, ThermoConfig},
    eos::test_support::tabulated_ideal_gas_dictionary,
};

use super::{CellFields, FluidThermo, PatchFields};

pub(super) const CV: f64 = 718.0;
pub(super) const GAMMA: f64 = 1.4;

/// Air as an ideal gas with constant transport.
pub(super) fn air_config() -> ThermoConfig {
    ThermoConfig {
        specie: Dictionary::new().with("molWeight", 28.96),
        equation_of_state: Dictionary::new().with("type", "idealGas").with("gamma", GAMMA),
        thermodynamics: Dictionary::new()
            .with("type", "eConst")
            .with("Cv", CV)
            .with("Hf", 0.0),
        transport: Dictionary::new()
            .with("type", "const")
            .with("mu", 1.8e-5)
            .with("Pr", 0.7),
        afterburn: Dictionary::new().with("type", "none"),
        recovery: Dictionary::new(),
        residual_rho: DEFAULT_RESIDUAL,
        residual_alpha: DEFAULT_RESIDUAL,
        limit: true,
    }
}

/// Detonation products with a polynomial heat capacity, inviscid.
pub(super) fn products_config() -> ThermoConfig {
    ThermoConfig {
        specie: Dictionary::new().with("molWeight", 27.0),
        equation_of_state: Dictionary::new()
            .with("type", "JWLC")
            .with("rho0", 1630.0)
            .with("A", 371.2e9)
            .with("B", 3.231e9)
            .with("C", 1.045e9)
            .with("R1", 4.15)
            .with("R2", 0.95)
            .with("omega", 0.3),
        thermodynamics: Dictionary::new()
            .with("type", "ePolynomial")
            .with("CvCoeffs", vec![600.0, 0.15, 1e-6])
            .with("Hf", 0.0),
        transport: Dictionary::new(),
        afterburn: Dictionary::new(),
        recovery: Dictionary::new(),
        residual_rho: DEFAULT_RESIDUAL,
        residual_alpha: DEFAULT_RESIDUAL,
        limit: true,
    }
}

/// Air read from logarithmic `(ρ, e)` tables.
pub(super) fn tabulated_config() -> ThermoConfig {
    ThermoConfig {
        equation_of_state: tabulated_ideal_gas_dictionary(),
        thermodynamics: Dictionary::new(),
        ..air_config()
    }
}

/// A phase over `rho.len()` cells with one two-face patch on cells 0 and 1.
pub(super) fn phase(config: &ThermoConfig, rho: Vec<f64>, t: Vec<f64>) -> FluidThermo {
    let patch = PatchFields::new(vec![0, 1], rho[..2].to_vec(), t[..2].to_vec()).unwrap();
    FluidThermo::new(config, CellFields::new(rho, t).unwrap(), vec![patch]).unwrap()
}
