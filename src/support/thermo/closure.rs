//! Complete thermodynamic closures.
//!
//! A [`ThermoClosure`] answers every per-cell question the flow solver asks:
//! pressure, heat capacities, energies, enthalpies, entropy, sound speed and
//! the inversions from `(ρ, e)` to `T` and back. [`Thermo`] builds one from
//! an analytic equation of state and a caloric model; [`Tabulated`] reads
//! both pressure and temperature from tables.

use std::fmt;

use crate::support::{
    config::{ConfigError, ThermoConfig},
    eos::{DENSITY_FLOOR, EquationOfState, Eos, TabulatedEos, clamp_density},
};

use super::{
    caloric::{Caloric, CaloricModel},
    error::{PropertyError, RecoveryError, Unknown},
    recovery::{Inversion, RecoveryConfig},
    specie::Specie,
};

/// Upper end of the density bracket used when inverting pressure, kg/m³.
const MAX_DENSITY: f64 = 1e5;

/// Full per-cell thermodynamics of one phase.
///
/// Arguments follow the closure convention: every query receives `ρ`, `e`
/// and `T` and uses whichever the underlying model depends on.
pub trait ThermoClosure: Send + Sync + fmt::Debug {
    fn eos(&self) -> &dyn EquationOfState;

    fn specie(&self) -> &Specie;

    fn recovery(&self) -> &RecoveryConfig;

    fn temperature_based(&self) -> bool {
        self.eos().temperature_based()
    }

    fn solid(&self) -> bool {
        self.eos().solid()
    }

    fn p(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos().pressure(rho, e, t)
    }

    fn gamma(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos().gamma(rho, e, t)
    }

    /// Speed of sound, with a negative `c²` floored at zero.
    fn speed_of_sound(&self, p: f64, rho: f64, e: f64, t: f64) -> f64 {
        self.eos().speed_of_sound_sqr(p, rho, e, t).max(0.0).sqrt()
    }

    fn cv(&self, rho: f64, e: f64, t: f64) -> f64;

    fn cp_m_cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos().cp_m_cv(rho, e, t)
    }

    fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.cv(rho, e, t) + self.cp_m_cv(rho, e, t)
    }

    /// Ratio of heat capacities, or `Γ` where `Cv` vanishes.
    fn cp_by_cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        let cv = self.cv(rho, e, t);
        if cv > 0.0 {
            self.cp(rho, e, t) / cv
        } else {
            self.gamma(rho, e, t)
        }
    }

    /// Sensible internal energy.
    fn es(&self, rho: f64, e: f64, t: f64) -> f64;

    /// Heat of formation.
    fn hf(&self) -> f64;

    /// Absolute internal energy.
    fn ea(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.es(rho, e, t) + self.hf()
    }

    /// Sensible enthalpy, `Es + p/max(ρ, floor)`.
    fn hs(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.es(rho, e, t) + self.p(rho, e, t) / clamp_density(rho)
    }

    /// Absolute enthalpy, `Ea + p/max(ρ, floor)`.
    fn ha(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.ea(rho, e, t) + self.p(rho, e, t) / clamp_density(rho)
    }

    /// Entropy.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the closure cannot evaluate entropy at
    /// this state.
    fn s(&self, p: f64, rho: f64, e: f64, t: f64) -> Result<f64, PropertyError>;

    /// Recovers temperature from `(ρ, e)` starting from `t0`.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError`] if no admissible temperature is found.
    fn t_rho_e(&self, t0: f64, rho: f64, e: f64) -> Result<f64, RecoveryError>;

    /// Sensible energy at `(ρ, T)`, starting from `e0` where an inversion is
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError`] if the closure must invert and fails.
    fn e_rho_t(&self, e0: f64, rho: f64, t: f64) -> Result<f64, RecoveryError>;

    /// Energy consistent with pressure `p` at density `rho`.
    ///
    /// Temperature-based closures cannot invert pressure for energy and
    /// return the energy at `(ρ, t0)` instead.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError`] if the inversion fails.
    fn initialize_energy(&self, p: f64, rho: f64, e0: f64, t0: f64) -> Result<f64, RecoveryError>;

    /// Density consistent with pressure `p` at energy `e`.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError`] if the inversion fails.
    fn initialize_density(&self, p: f64, rho0: f64, e: f64, t0: f64) -> Result<f64, RecoveryError>;
}

/// Inverts `p(ρ, e) = p_target` for density over `bracket`.
fn invert_density(
    closure: &(impl ThermoClosure + ?Sized),
    p: f64,
    rho0: f64,
    e: f64,
    t0: f64,
    bracket: [f64; 2],
) -> Result<f64, RecoveryError> {
    let eos = closure.eos();
    closure.recovery().invert(
        Inversion {
            unknown: Unknown::Density,
            target: p,
            guess: rho0,
            bracket,
            rho: rho0,
            e,
        },
        |rho| eos.pressure(rho, e, t0),
        |rho| -eos.dpdv(rho, e, t0) / (rho * rho),
    )
}

/// An analytic equation of state composed with a caloric model.
#[derive(Debug, Clone, PartialEq)]
pub struct Thermo<E, C> {
    eos: E,
    caloric: C,
    specie: Specie,
    recovery: RecoveryConfig,
}

impl<E: EquationOfState, C: CaloricModel> Thermo<E, C> {
    #[must_use]
    pub fn new(eos: E, caloric: C, specie: Specie) -> Self {
        Self {
            eos,
            caloric,
            specie,
            recovery: RecoveryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn caloric(&self) -> &C {
        &self.caloric
    }

    /// Energy range spanned by the admissible temperature bracket at `ρ`.
    fn energy_bracket(&self, rho: f64, e: f64) -> [f64; 2] {
        let [t_min, t_max] = self.recovery.temperature_bracket();
        [self.es(rho, e, t_min), self.es(rho, e, t_max)]
    }
}

impl<E: EquationOfState, C: CaloricModel> ThermoClosure for Thermo<E, C> {
    fn eos(&self) -> &dyn EquationOfState {
        &self.eos
    }

    fn specie(&self) -> &Specie {
        &self.specie
    }

    fn recovery(&self) -> &RecoveryConfig {
        &self.recovery
    }

    fn cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.caloric.cv(t) + self.eos.cv(rho, e, t)
    }

    fn es(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.caloric.es(t) + self.eos.energy_correction(rho, e, t)
    }

    fn hf(&self) -> f64 {
        self.caloric.hf()
    }

    fn s(&self, p: f64, rho: f64, _e: f64, t: f64) -> Result<f64, PropertyError> {
        Ok(self.caloric.s(t) + self.eos.entropy(p, rho, t)?)
    }

    fn t_rho_e(&self, t0: f64, rho: f64, e: f64) -> Result<f64, RecoveryError> {
        let correction = self.eos.energy_correction(rho, e, t0);
        if let Some(t) = self.caloric.temperature(e - correction)
            && t.is_finite()
            && t > 0.0
        {
            return Ok(t);
        }

        self.recovery.invert(
            Inversion {
                unknown: Unknown::Temperature,
                target: e,
                guess: t0,
                bracket: self.recovery.temperature_bracket(),
                rho,
                e,
            },
            |t| self.es(rho, e, t),
            |t| self.cv(rho, e, t),
        )
    }

    fn e_rho_t(&self, e0: f64, rho: f64, t: f64) -> Result<f64, RecoveryError> {
        Ok(self.es(rho, e0, t))
    }

    fn initialize_energy(&self, p: f64, rho: f64, e0: f64, t0: f64) -> Result<f64, RecoveryError> {
        if self.eos.temperature_based() {
            return self.e_rho_t(e0, rho, t0);
        }

        self.recovery.invert(
            Inversion {
                unknown: Unknown::Energy,
                target: p,
                guess: e0,
                bracket: self.energy_bracket(rho, e0),
                rho,
                e: e0,
            },
            |e| self.eos.pressure(rho, e, t0),
            |e| self.eos.dpde(rho, e, t0),
        )
    }

    fn initialize_density(&self, p: f64, rho0: f64, e: f64, t0: f64) -> Result<f64, RecoveryError> {
        invert_density(self, p, rho0, e, t0, [DENSITY_FLOOR, MAX_DENSITY])
    }
}

/// A closure read entirely from `(ρ, e)` tables.
///
/// Energy is the tabulated absolute energy, so `Es = Ea = e` and temperature
/// follows from a direct lookup rather than an iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tabulated {
    eos: TabulatedEos,
    specie: Specie,
    recovery: RecoveryConfig,
}

impl Tabulated {
    #[must_use]
    pub fn new(eos: TabulatedEos, specie: Specie) -> Self {
        Self {
            eos,
            specie,
            recovery: RecoveryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    /// Table bounds widened by a decade on each side, or by one table span
    /// when the grid reaches non-positive energies.
    fn energy_bracket(&self) -> [f64; 2] {
        let (_, (e_min, e_max)) = self.eos.bounds();
        if e_min > 0.0 {
            return [0.1 * e_min, 10.0 * e_max];
        }
        let span = e_max - e_min;
        [e_min - span, e_max + span]
    }

    fn density_bracket(&self) -> [f64; 2] {
        let ((rho_min, rho_max), _) = self.eos.bounds();
        [(0.1 * rho_min).max(DENSITY_FLOOR), 10.0 * rho_max]
    }
}

impl ThermoClosure for Tabulated {
    fn eos(&self) -> &dyn EquationOfState {
        &self.eos
    }

    fn specie(&self) -> &Specie {
        &self.specie
    }

    fn recovery(&self) -> &RecoveryConfig {
        &self.recovery
    }

    fn cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos.cv(rho, e, t)
    }

    fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos.cp(rho, e, t)
    }

    fn es(&self, _rho: f64, e: f64, _t: f64) -> f64 {
        e
    }

    fn hf(&self) -> f64 {
        0.0
    }

    fn s(&self, p: f64, rho: f64, _e: f64, t: f64) -> Result<f64, PropertyError> {
        self.eos.entropy(p, rho, t)
    }

    fn t_rho_e(&self, _t0: f64, rho: f64, e: f64) -> Result<f64, RecoveryError> {
        let t = self.eos.temperature(rho, e);
        if t.is_finite() && t > 0.0 {
            return Ok(t);
        }

        log::warn!("tabulated temperature lookup failed: rho={rho}, e={e}, T={t}");
        Err(RecoveryError {
            unknown: Unknown::Temperature,
            rho,
            e,
            last: t,
            iters: 0,
            source: None,
        })
    }

    fn e_rho_t(&self, e0: f64, rho: f64, t: f64) -> Result<f64, RecoveryError> {
        self.recovery.invert(
            Inversion {
                unknown: Unknown::Energy,
                target: t,
                guess: e0,
                bracket: self.energy_bracket(),
                rho,
                e: e0,
            },
            |e| self.eos.temperature(rho, e),
            |e| self.eos.dtde(rho, e),
        )
    }

    fn initialize_energy(&self, p: f64, rho: f64, e0: f64, t0: f64) -> Result<f64, RecoveryError> {
        self.recovery.invert(
            Inversion {
                unknown: Unknown::Energy,
                target: p,
                guess: e0,
                bracket: self.energy_bracket(),
                rho,
                e: e0,
            },
            |e| self.eos.pressure(rho, e, t0),
            |e| self.eos.dpde(rho, e, t0),
        )
    }

    fn initialize_density(&self, p: f64, rho0: f64, e: f64, t0: f64) -> Result<f64, RecoveryError> {
        invert_density(self, p, rho0, e, t0, self.density_bracket())
    }
}

/// Runtime-selected closure of one phase.
#[derive(Debug, Clone, PartialEq)]
pub enum ThermoKind {
    Composed(Thermo<Eos, Caloric>),
    Tabulated(Tabulated),
}

impl ThermoKind {
    /// Builds the closure described by `config`.
    ///
    /// An equation of state of type `tabulated` selects [`Tabulated`] and
    /// ignores the caloric model; any other type is composed with the
    /// `thermodynamics` caloric model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any sub-dictionary is invalid.
    pub fn from_config(config: &ThermoConfig) -> Result<Self, ConfigError> {
        let specie = Specie::from_dictionary(&config.specie)?;
        let recovery = RecoveryConfig::from_dictionary(&config.recovery)?;

        if config.equation_of_state.type_name()? == "tabulated" {
            log::debug!("selecting tabulated thermodynamics");
            let eos = TabulatedEos::from_dictionary(&config.equation_of_state)?;
            return Ok(Self::Tabulated(
                Tabulated::new(eos, specie).with_recovery(recovery),
            ));
        }

        let eos = Eos::from_dictionary(&config.equation_of_state, &specie)?;
        let caloric = Caloric::from_dictionary(&config.thermodynamics)?;
        Ok(Self::Composed(
            Thermo::new(eos, caloric, specie).with_recovery(recovery),
        ))
    }

    fn inner(&self) -> &dyn ThermoClosure {
        match self {
            Self::Composed(thermo) => thermo,
            Self::Tabulated(thermo) => thermo,
        }
    }
}

impl ThermoClosure for ThermoKind {
    fn eos(&self) -> &dyn EquationOfState {
        self.inner().eos()
    }

    fn specie(&self) -> &Specie {
        self.inner().specie()
    }

    fn recovery(&self) -> &RecoveryConfig {
        self.inner().recovery()
    }

    fn cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().cv(rho, e, t)
    }

    fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().cp(rho, e, t)
    }

    fn es(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.inner().es(rho, e, t)
    }

    fn hf(&self) -> f64 {
        self.inner().hf()
    }

    fn s(&self, p: f64, rho: f64, e: f64, t: f64) -> Result<f64, PropertyError> {
        self.inner().s(p, rho, e, t)
    }

    fn t_rho_e(&self, t0: f64, rho: f64, e: f64) -> Result<f64, RecoveryError> {
        self.inner().t_rho_e(t0, rho, e)
    }

    fn e_rho_t(&self, e0: f64, rho: f64, t: f64) -> Result<f64, RecoveryError> {
        self.inner().e_rho_t(e0, rho, t)
    }

    fn initialize_energy(&self, p: f64, rho: f64, e0: f64, t0: f64) -> Result<f64, RecoveryError> {
        self.inner().initialize_energy(p, rho, e0, t0)
    }

    fn initialize_density(&self, p: f64, rho0: f64, e: f64, t0: f64) -> Result<f64, RecoveryError> {
        self.inner().initialize_density(p, rho0, e, t0)
    }
}
