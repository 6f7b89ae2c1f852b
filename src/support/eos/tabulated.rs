//! Closure backed by pressure and temperature tables over `(ρ, e)`.
//!
//! Both tables share one grid. Derivatives come from the bilinear
//! interpolant, so they are piecewise constant along each axis and exact for
//! the interpolated surface. Queries outside the grid extrapolate linearly
//! from the end intervals and never fail.

mod lookup_table;

pub use lookup_table::{Axis, LookupTable2D, Sample, TableError, Transform};

use crate::support::{
    config::{ConfigError, Dictionary},
    thermo::PropertyError,
};

use super::{EquationOfState, clamp_density};

#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedEos {
    pressure: LookupTable2D,
    temperature: LookupTable2D,
}

impl TabulatedEos {
    /// Builds the closure from the shared `(ρ, e)` grid and the two value
    /// grids, each stored row-major with `e` varying fastest.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if an axis or a value grid is malformed.
    pub fn new(
        rho: Axis,
        e: Axis,
        pressure: (&[f64], Transform),
        temperature: (&[f64], Transform),
    ) -> Result<Self, TableError> {
        Ok(Self {
            pressure: LookupTable2D::new("p", rho.clone(), e.clone(), pressure.0, pressure.1)?,
            temperature: LookupTable2D::new("T", rho, e, temperature.0, temperature.1)?,
        })
    }

    /// Reads the axes `rho` and `e` and the grids `p` and `T`.
    ///
    /// Each may carry an interpolation transform under `rhoTransform`,
    /// `eTransform`, `pTransform` or `TTransform`, one of `none` (default),
    /// `ln` or `log10`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a key is missing, a transform is unknown or
    /// a table is malformed.
    pub fn from_dictionary(dict: &Dictionary) -> Result<Self, ConfigError> {
        let transform = |key| -> Result<Transform, ConfigError> {
            Transform::from_name(dict.word_or(key, "none")?)
        };

        let invalid = |err: TableError| ConfigError::parameters("tabulated", err);

        let rho = Axis::new("rho", dict.list("rho")?, transform("rhoTransform")?).map_err(invalid)?;
        let e = Axis::new("e", dict.list("e")?, transform("eTransform")?).map_err(invalid)?;

        Self::new(
            rho,
            e,
            (dict.list("p")?, transform("pTransform")?),
            (dict.list("T")?, transform("TTransform")?),
        )
        .map_err(invalid)
    }

    /// Grid bounds as `((ρ_min, ρ_max), (e_min, e_max))`.
    #[must_use]
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        (self.pressure.x().bounds(), self.pressure.y().bounds())
    }

    /// Tabulated temperature at `(ρ, e)`.
    #[must_use]
    pub fn temperature(&self, rho: f64, e: f64) -> f64 {
        self.temperature.value(rho, e)
    }

    /// `(∂T/∂e)_ρ`.
    #[must_use]
    pub fn dtde(&self, rho: f64, e: f64) -> f64 {
        self.temperature.sample(rho, e).dy
    }

    /// `(∂p/∂ρ)_T`, from `(∂p/∂ρ)_e` and the temperature table's slopes.
    fn dpdrho_isothermal(&self, rho: f64, e: f64) -> f64 {
        let p = self.pressure.sample(rho, e);
        let t = self.temperature.sample(rho, e);
        if t.dy == 0.0 {
            return p.dx;
        }
        p.dx - p.dy * t.dx / t.dy
    }
}

impl EquationOfState for TabulatedEos {
    fn pressure(&self, rho: f64, e: f64, _t: f64) -> f64 {
        self.pressure.value(rho, e)
    }

    fn gamma(&self, rho: f64, e: f64, t: f64) -> f64 {
        1.0 + self.dpde(rho, e, t) / clamp_density(rho)
    }

    fn delta(&self, p: f64, rho: f64, e: f64, t: f64) -> f64 {
        let dpde = self.dpde(rho, e, t);
        if dpde == 0.0 {
            return 0.0;
        }
        let rhos = clamp_density(rho);
        e + p / rhos - self.speed_of_sound_sqr(p, rho, e, t) * rhos / dpde
    }

    fn dpdv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        -rho * rho * self.pressure.sample(rho, e).dx
    }

    fn dpde(&self, rho: f64, e: f64, _t: f64) -> f64 {
        self.pressure.sample(rho, e).dy
    }

    fn energy_correction(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        0.0
    }

    fn enthalpy_correction(&self, rho: f64, e: f64, t: f64) -> f64 {
        -self.pi(rho, e, t) / clamp_density(rho)
    }

    /// `1/(∂T/∂e)_ρ`, or zero where the temperature table is flat in `e`.
    fn cv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        let dtde = self.dtde(rho, e);
        if dtde == 0.0 { 0.0 } else { 1.0 / dtde }
    }

    fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.cv(rho, e, t) + self.cp_m_cv(rho, e, t)
    }

    /// `T·((∂p/∂T)_ρ)² / (ρ²·(∂p/∂ρ)_T)`, or zero where the isothermal
    /// compressibility is not positive.
    fn cp_m_cv(&self, rho: f64, e: f64, _t: f64) -> f64 {
        let dpdrho_t = self.dpdrho_isothermal(rho, e);
        if dpdrho_t <= 0.0 || !dpdrho_t.is_finite() {
            return 0.0;
        }

        let rhos = clamp_density(rho);
        let dpdt = self.dpde(rho, e, 0.0) * self.cv(rho, e, 0.0);
        self.temperature(rho, e) * dpdt * dpdt / (rhos * rhos * dpdrho_t)
    }

    fn entropy(&self, _p: f64, _rho: f64, _t: f64) -> Result<f64, PropertyError> {
        Ok(0.0)
    }
}
