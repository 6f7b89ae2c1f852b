//! Per-phase thermodynamic model of a detonation flow solver.
//!
//! [`FluidThermo`] owns the live state of one phase (`p`, `ρ`, `e`, `T` on
//! cells and boundary patches) together with cached transport fields, and
//! drives state recovery during explicit multi-stage time stepping.

mod error;
mod fields;
mod stages;

#[cfg(test)]
mod test_support;

pub use error::FluidThermoError;
pub use fields::{CellFields, PatchFields, ThermoView};
pub use stages::{OdeStage, OdeStep, StageRates};

use rayon::prelude::*;
use uom::si::molar_mass::gram_per_mole;

use crate::{
    models::detonation::afterburn::{Afterburn, AfterburnModel},
    support::{
        config::ThermoConfig,
        thermo::{ThermoClosure, ThermoKind, Transport},
    },
};

use stages::{Stage, StageStorage};

/// Lifecycle of the stage storage.
#[derive(Debug, Clone, PartialEq)]
enum OdeState {
    Uninitialized,
    Staged(StageStorage),
    Finalized { n_steps: usize },
}

/// The state at one cell or face.
#[derive(Debug, Clone, Copy)]
struct Point {
    rho: f64,
    e: f64,
    t: f64,
    p: f64,
}

/// Thermodynamic model of one phase.
#[derive(Debug, Clone)]
pub struct FluidThermo {
    thermo: ThermoKind,
    transport: Transport,
    afterburn: Afterburn,
    residual_rho: f64,
    residual_alpha: f64,
    limit: bool,
    cells: CellFields,
    patches: Vec<PatchFields>,
    ode: OdeState,
}

impl FluidThermo {
    /// Builds the phase described by `config` from initial density and
    /// temperature.
    ///
    /// Energy is evaluated from `(ρ, T)` on cells and patches, then pressure
    /// and the transport fields.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError`] if the configuration is invalid, the
    /// fields are inconsistent, or an energy evaluation fails.
    pub fn new(
        config: &ThermoConfig,
        cells: CellFields,
        patches: Vec<PatchFields>,
    ) -> Result<Self, FluidThermoError> {
        let thermo = ThermoKind::from_config(config)?;
        let transport = Transport::from_dictionary(&config.transport)?;
        let afterburn = Afterburn::from_dictionary(&config.afterburn)?;

        cells.check()?;
        for (patch, fields) in patches.iter().enumerate() {
            fields.check(patch, cells.len())?;
        }

        log::debug!(
            "building phase with {} cells and {} patches (temperature based: {})",
            cells.len(),
            patches.len(),
            thermo.temperature_based(),
        );

        let mut model = Self {
            thermo,
            transport,
            afterburn,
            residual_rho: config.residual_rho,
            residual_alpha: config.residual_alpha,
            limit: config.limit,
            cells,
            patches,
            ode: OdeState::Uninitialized,
        };

        model.cells.e = model.calc_e()?;
        model.cells.p = model.calc_p();
        model.correct_boundary_energy()?;
        model.update_transport();
        Ok(model)
    }

    #[must_use]
    pub fn thermo(&self) -> &ThermoKind {
        &self.thermo
    }

    #[must_use]
    pub fn cells(&self) -> &CellFields {
        &self.cells
    }

    #[must_use]
    pub fn patches(&self) -> &[PatchFields] {
        &self.patches
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn patch(&self, patch: usize) -> Result<&PatchFields, FluidThermoError> {
        self.patches.get(patch).ok_or(FluidThermoError::Patch {
            patch,
            n_patches: self.patches.len(),
        })
    }

    /// Mutable face values, for boundary conditions to update.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn patch_mut(&mut self, patch: usize) -> Result<&mut PatchFields, FluidThermoError> {
        let n_patches = self.patches.len();
        self.patches
            .get_mut(patch)
            .ok_or(FluidThermoError::Patch { patch, n_patches })
    }

    #[must_use]
    pub fn residual_rho(&self) -> f64 {
        self.residual_rho
    }

    #[must_use]
    pub fn residual_alpha(&self) -> f64 {
        self.residual_alpha
    }

    /// Whether internal energy is bounded by the outer solver.
    #[must_use]
    pub fn limit(&self) -> bool {
        self.limit
    }

    /// Molecular weight in each cell, kg/kmol.
    #[must_use]
    pub fn w(&self) -> Vec<f64> {
        vec![self.molecular_weight(); self.n_cells()]
    }

    #[must_use]
    pub fn w_at(&self, cell: usize) -> Option<f64> {
        (cell < self.n_cells()).then(|| self.molecular_weight())
    }

    fn molecular_weight(&self) -> f64 {
        // g/mol and kg/kmol coincide.
        self.thermo.specie().molar_mass().get::<gram_per_mole>()
    }

    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Borrowed view of the cell state for collaborators.
    #[must_use]
    pub fn view(&self) -> ThermoView<'_> {
        ThermoView {
            rho: &self.cells.rho,
            e: &self.cells.e,
            t: &self.cells.t,
            p: &self.cells.p,
        }
    }

    /// Recovers temperature and pressure from the current `(ρ, e)`, updates
    /// boundary energy from `(ρ, T)` and refreshes the transport fields.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError`] if recovery fails in any cell or face.
    pub fn correct(&mut self) -> Result<(), FluidThermoError> {
        let (t, p) = recover(&self.thermo, &self.cells.rho, &self.cells.e, &self.cells.t)?;
        self.cells.t = t;
        self.cells.p = p;
        self.correct_boundary_energy()?;
        self.update_transport();
        Ok(())
    }

    /// Re-evaluates patch energy and pressure from the patch `(ρ, T)`.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::PatchRecovery`] if an energy evaluation
    /// fails.
    pub fn correct_boundary_energy(&mut self) -> Result<(), FluidThermoError> {
        let thermo = &self.thermo;
        for (patch, fields) in self.patches.iter_mut().enumerate() {
            for face in 0..fields.len() {
                let (rho, t) = (fields.rho[face], fields.t[face]);
                let e = thermo
                    .e_rho_t(fields.e[face], rho, t)
                    .map_err(|source| FluidThermoError::PatchRecovery { patch, face, source })?;
                fields.e[face] = e;
                fields.p[face] = thermo.p(rho, e, t);
            }
        }
        Ok(())
    }

    fn update_transport(&mut self) {
        let transport = self.transport;
        self.cells.mu = self.cells.t.par_iter().map(|&t| transport.mu(t)).collect();
        self.cells.alpha = self.cells.t.par_iter().map(|&t| transport.alpha(t)).collect();
        for fields in &mut self.patches {
            fields.mu = fields.t.iter().map(|&t| transport.mu(t)).collect();
            fields.alpha = fields.t.iter().map(|&t| transport.alpha(t)).collect();
        }
    }

    /// Pressure from the current `(ρ, e, T)`.
    #[must_use]
    pub fn calc_p(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.p(x.rho, x.e, x.t))
    }

    /// Temperature recovered from the current `(ρ, e)`.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::Recovery`] for the first failing cell.
    pub fn calc_t(&self) -> Result<Vec<f64>, FluidThermoError> {
        let (t, _) = recover(&self.thermo, &self.cells.rho, &self.cells.e, &self.cells.t)?;
        Ok(t)
    }

    /// Energy evaluated from the current `(ρ, T)`.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::Recovery`] for the first failing cell.
    pub fn calc_e(&self) -> Result<Vec<f64>, FluidThermoError> {
        let thermo = &self.thermo;
        let cells = &self.cells;
        (0..cells.len())
            .into_par_iter()
            .map(|cell| {
                thermo
                    .e_rho_t(cells.e[cell], cells.rho[cell], cells.t[cell])
                    .map_err(|source| FluidThermoError::Recovery { cell, source })
            })
            .collect()
    }

    /// Energy departure `E` of the equation of state in each cell.
    #[must_use]
    pub fn energy(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.eos().energy_correction(x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn energy_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| {
            thermo.eos().energy_correction(x.rho, x.e, x.t)
        })
    }

    /// Afterburn energy release, W/m³.
    #[must_use]
    pub fn e_source(&self) -> Vec<f64> {
        self.afterburn.e_source(&self.view())
    }

    #[must_use]
    pub fn speed_of_sound(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.speed_of_sound(x.p, x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn speed_of_sound_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| {
            thermo.speed_of_sound(x.p, x.rho, x.e, x.t)
        })
    }

    #[must_use]
    pub fn gamma(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.gamma(x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn gamma_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| thermo.gamma(x.rho, x.e, x.t))
    }

    #[must_use]
    pub fn cp(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.cp(x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn cp_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| thermo.cp(x.rho, x.e, x.t))
    }

    #[must_use]
    pub fn cv(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.cv(x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn cv_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| thermo.cv(x.rho, x.e, x.t))
    }

    #[must_use]
    pub fn cp_by_cv(&self) -> Vec<f64> {
        self.cell_property(|thermo, x| thermo.cp_by_cv(x.rho, x.e, x.t))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn cp_by_cv_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        self.patch_property(patch, |thermo, x| thermo.cp_by_cv(x.rho, x.e, x.t))
    }

    /// Dynamic viscosity as of the last [`correct`](Self::correct).
    #[must_use]
    pub fn mu(&self) -> &[f64] {
        &self.cells.mu
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn mu_patch(&self, patch: usize) -> Result<&[f64], FluidThermoError> {
        Ok(&self.patch(patch)?.mu)
    }

    /// Kinematic viscosity `μ/max(ρ, residual_rho)`.
    #[must_use]
    pub fn nu(&self) -> Vec<f64> {
        nu(&self.cells.mu, &self.cells.rho, self.residual_rho)
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn nu_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        let fields = self.patch(patch)?;
        Ok(nu(&fields.mu, &fields.rho, self.residual_rho))
    }

    /// Thermal diffusivity of enthalpy `κ/Cp` as of the last
    /// [`correct`](Self::correct).
    #[must_use]
    pub fn alpha(&self) -> &[f64] {
        &self.cells.alpha
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn alpha_patch(&self, patch: usize) -> Result<&[f64], FluidThermoError> {
        Ok(&self.patch(patch)?.alpha)
    }

    /// Thermal conductivity `κ = α·Cp`.
    #[must_use]
    pub fn kappa(&self) -> Vec<f64> {
        scale(&self.cells.alpha, &self.cp())
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn kappa_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        Ok(scale(&self.patch(patch)?.alpha, &self.cp_patch(patch)?))
    }

    /// Thermal diffusivity of internal energy `κ/Cv`.
    #[must_use]
    pub fn alpha_he(&self) -> Vec<f64> {
        scale(&self.cells.alpha, &self.cp_by_cv())
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError::Patch`] if `patch` does not exist.
    pub fn alpha_he_patch(&self, patch: usize) -> Result<Vec<f64>, FluidThermoError> {
        Ok(scale(&self.patch(patch)?.alpha, &self.cp_by_cv_patch(patch)?))
    }

    /// Effective diffusivity `α + αt` with turbulent diffusivity `alphat`.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::FieldLength`] if `alphat` does not match
    /// the cell count.
    pub fn alpha_eff(&self, alphat: &[f64]) -> Result<Vec<f64>, FluidThermoError> {
        FluidThermoError::check_length("alphat", self.n_cells(), alphat.len())?;
        Ok(add(&self.cells.alpha, alphat))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError`] if `patch` does not exist or `alphat`
    /// does not match its face count.
    pub fn alpha_eff_patch(
        &self,
        patch: usize,
        alphat: &[f64],
    ) -> Result<Vec<f64>, FluidThermoError> {
        let fields = self.patch(patch)?;
        FluidThermoError::check_length("alphat", fields.len(), alphat.len())?;
        Ok(add(&fields.alpha, alphat))
    }

    /// Effective conductivity `Cp·(α + αt)`.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::FieldLength`] if `alphat` does not match
    /// the cell count.
    pub fn kappa_eff(&self, alphat: &[f64]) -> Result<Vec<f64>, FluidThermoError> {
        Ok(scale(&self.alpha_eff(alphat)?, &self.cp()))
    }

    /// # Errors
    ///
    /// Returns [`FluidThermoError`] if `patch` does not exist or `alphat`
    /// does not match its face count.
    pub fn kappa_eff_patch(
        &self,
        patch: usize,
        alphat: &[f64],
    ) -> Result<Vec<f64>, FluidThermoError> {
        Ok(scale(&self.alpha_eff_patch(patch, alphat)?, &self.cp_patch(patch)?))
    }

    #[must_use]
    pub fn cp_at(&self, cell: usize) -> Option<f64> {
        self.point(cell).map(|x| self.thermo.cp(x.rho, x.e, x.t))
    }

    #[must_use]
    pub fn cv_at(&self, cell: usize) -> Option<f64> {
        self.point(cell).map(|x| self.thermo.cv(x.rho, x.e, x.t))
    }

    #[must_use]
    pub fn nu_at(&self, cell: usize) -> Option<f64> {
        self.point(cell)
            .map(|x| self.cells.mu[cell] / x.rho.max(self.residual_rho))
    }

    #[must_use]
    pub fn kappa_at(&self, cell: usize) -> Option<f64> {
        self.cp_at(cell).map(|cp| self.cells.alpha[cell] * cp)
    }

    /// Where the current time step stands.
    #[must_use]
    pub fn ode_stage(&self) -> OdeStage {
        match &self.ode {
            OdeState::Uninitialized => OdeStage::Uninitialized,
            OdeState::Staged(storage) => OdeStage::Staged(storage.next()),
            OdeState::Finalized { .. } => OdeStage::Finalized,
        }
    }

    /// Allocates stage storage for an `n_steps`-stage time step.
    ///
    /// `old_is[k]` and `delta_is[k]` name the value and rate slots stage `k`
    /// records into, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::AlreadyStaged`] while a time step is in
    /// progress and [`FluidThermoError::Schedule`] for an inconsistent
    /// schedule.
    pub fn set_ode_fields(
        &mut self,
        n_steps: usize,
        old_is: &[Option<usize>],
        n_old: usize,
        delta_is: &[Option<usize>],
        n_delta: usize,
    ) -> Result<(), FluidThermoError> {
        if let OdeState::Staged(storage) = &self.ode {
            return Err(FluidThermoError::AlreadyStaged {
                stage: storage.next(),
            });
        }

        let storage = StageStorage::new(n_steps, old_is, n_old, delta_is, n_delta, self.n_cells())?;
        log::debug!("allocated stage storage for {n_steps} stages ({n_old} old, {n_delta} delta)");
        self.ode = OdeState::Staged(storage);
        Ok(())
    }

    /// Allocates stage storage and returns a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// See [`set_ode_fields`](Self::set_ode_fields).
    pub fn ode_step(
        &mut self,
        n_steps: usize,
        old_is: &[Option<usize>],
        n_old: usize,
        delta_is: &[Option<usize>],
        n_delta: usize,
    ) -> Result<OdeStep<'_>, FluidThermoError> {
        self.set_ode_fields(n_steps, old_is, n_old, delta_is, n_delta)?;
        Ok(OdeStep::new(self))
    }

    /// Applies stage `k` of the time step and recovers the new state.
    ///
    /// The afterburn source is added to the energy rate before blending.
    /// Energy is `ρe/max(ρ, residual_rho)`; temperature is recovered from the
    /// previous temperature and pressure follows.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError`] if no storage is allocated, the stage is
    /// out of order, a coefficient or rate list has the wrong length, or
    /// recovery fails in a cell.
    pub fn solve(
        &mut self,
        k: usize,
        a: &[f64],
        b: &[f64],
        dt: f64,
        rates: StageRates<'_>,
    ) -> Result<(), FluidThermoError> {
        let n = self.n_cells();
        FluidThermoError::check_length("mass rate", n, rates.mass.len())?;
        FluidThermoError::check_length("energy rate", n, rates.energy.len())?;

        let source = self.e_source();
        let energy: Vec<f64> = rates
            .energy
            .par_iter()
            .zip(&source)
            .map(|(rate, source)| rate + source)
            .collect();
        let rho_e: Vec<f64> = self
            .cells
            .rho
            .par_iter()
            .zip(&self.cells.e)
            .map(|(rho, e)| rho * e)
            .collect();

        let storage = match &self.ode {
            OdeState::Uninitialized => return Err(FluidThermoError::NotStaged),
            OdeState::Finalized { n_steps } => {
                return Err(FluidThermoError::StageOrder {
                    stage: k,
                    expected: *n_steps,
                    n_steps: *n_steps,
                });
            }
            OdeState::Staged(storage) => storage,
        };

        let stage = Stage { k, a, b, dt };
        let rates = StageRates {
            mass: rates.mass,
            energy: &energy,
        };
        storage.check_stage(&stage)?;
        let (rho, blended_rho_e) = storage.blend(&stage, &self.cells.rho, &rho_e, rates);

        let residual_rho = self.residual_rho;
        let e: Vec<f64> = rho
            .par_iter()
            .zip(&blended_rho_e)
            .map(|(rho, rho_e)| rho_e / rho.max(residual_rho))
            .collect();
        let (t, p) = recover(&self.thermo, &rho, &e, &self.cells.t)?;

        // Only a recovered stage is committed.
        if let OdeState::Staged(storage) = &mut self.ode {
            storage.record(&stage, &self.cells.rho, &rho_e, rates);
            if storage.is_finished() {
                self.ode = OdeState::Finalized {
                    n_steps: storage.n_steps(),
                };
            }
        }

        self.cells.rho = rho;
        self.cells.e = e;
        self.cells.t = t;
        self.cells.p = p;
        Ok(())
    }

    /// Releases stage storage. Safe to call at any time.
    pub fn clear_ode_fields(&mut self) {
        if !matches!(self.ode, OdeState::Uninitialized) {
            log::debug!("released stage storage");
        }
        self.ode = OdeState::Uninitialized;
    }

    fn point(&self, cell: usize) -> Option<Point> {
        let cells = &self.cells;
        Some(Point {
            rho: *cells.rho.get(cell)?,
            e: *cells.e.get(cell)?,
            t: *cells.t.get(cell)?,
            p: *cells.p.get(cell)?,
        })
    }

    fn cell_property<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&ThermoKind, Point) -> f64 + Send + Sync,
    {
        let cells = &self.cells;
        (0..cells.len())
            .into_par_iter()
            .map(|i| {
                let x = Point {
                    rho: cells.rho[i],
                    e: cells.e[i],
                    t: cells.t[i],
                    p: cells.p[i],
                };
                f(&self.thermo, x)
            })
            .collect()
    }

    fn patch_property<F>(&self, patch: usize, f: F) -> Result<Vec<f64>, FluidThermoError>
    where
        F: Fn(&ThermoKind, Point) -> f64,
    {
        let fields = self.patch(patch)?;
        Ok((0..fields.len())
            .map(|i| {
                let x = Point {
                    rho: fields.rho[i],
                    e: fields.e[i],
                    t: fields.t[i],
                    p: fields.p[i],
                };
                f(&self.thermo, x)
            })
            .collect())
    }
}

/// Recovers `(T, p)` in every cell from `(ρ, e)`, starting from `t_guess`.
pub(crate) fn recover(
    thermo: &ThermoKind,
    rho: &[f64],
    e: &[f64],
    t_guess: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), FluidThermoError> {
    let states: Vec<(f64, f64)> = (0..rho.len())
        .into_par_iter()
        .map(|cell| {
            let t = thermo
                .t_rho_e(t_guess[cell], rho[cell], e[cell])
                .map_err(|source| FluidThermoError::Recovery { cell, source })?;
            Ok((t, thermo.p(rho[cell], e[cell], t)))
        })
        .collect::<Result<_, FluidThermoError>>()?;

    Ok(states.into_iter().unzip())
}

fn nu(mu: &[f64], rho: &[f64], residual_rho: f64) -> Vec<f64> {
    mu.iter()
        .zip(rho)
        .map(|(mu, rho)| mu / rho.max(residual_rho))
        .collect()
}

fn scale(values: &[f64], factors: &[f64]) -> Vec<f64> {
    values.iter().zip(factors).map(|(v, f)| v * f).collect()
}

fn add(values: &[f64], other: &[f64]) -> Vec<f64> {
    values.iter().zip(other).map(|(v, o)| v + o).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use super::test_support::{
        CV, GAMMA, air_config, phase, products_config, tabulated_config,
    };

    fn air() -> FluidThermo {
        phase(&air_config(), vec![1.2, 1.0, 0.8], vec![300.0, 400.0, 500.0])
    }

    fn single_stage(thermo: &mut FluidThermo) {
        thermo.set_ode_fields(1, &[None], 0, &[None], 0).unwrap();
    }

    #[test]
    fn builds_state_from_density_and_temperature() {
        let thermo = air();
        let cells = thermo.cells();

        for i in 0..3 {
            assert_relative_eq!(cells.e[i], CV * cells.t[i], max_relative = 1e-14);
            assert_relative_eq!(
                cells.p[i],
                (GAMMA - 1.0) * cells.rho[i] * cells.e[i],
                max_relative = 1e-14
            );
        }

        let patch = thermo.patch(0).unwrap();
        assert_relative_eq!(patch.e[1], CV * 400.0, max_relative = 1e-14);
        assert_relative_eq!(patch.p[0], cells.p[0], max_relative = 1e-14);
    }

    #[test]
    fn single_stage_with_trivial_coefficients_reproduces_state() {
        for config in [air_config(), products_config()] {
            let mut thermo = phase(&config, vec![1.2, 1e-6, 1630.0], vec![300.0, 2000.0, 3500.0]);
            let before = thermo.cells().clone();
            let rates = vec![5.0; 3];

            single_stage(&mut thermo);
            thermo
                .solve(0, &[1.0], &[0.0], 1e-6, StageRates { mass: &rates, energy: &rates })
                .unwrap();

            let after = thermo.cells();
            for i in 0..3 {
                assert_relative_eq!(after.rho[i], before.rho[i]);
                assert_relative_eq!(after.e[i], before.e[i], max_relative = 1e-14);
                assert_relative_eq!(after.t[i], before.t[i], max_relative = 1e-10);
                assert_relative_eq!(after.p[i], before.p[i], max_relative = 1e-10);
            }
            assert_eq!(thermo.ode_stage(), OdeStage::Finalized);
        }
    }

    #[test]
    fn energy_rate_heats_cells() {
        let mut thermo = air();
        let zero = vec![0.0; 3];
        let heating = vec![1e6, 0.0, 0.0];
        let dt = 1e-3;

        single_stage(&mut thermo);
        thermo
            .solve(0, &[1.0], &[1.0], dt, StageRates { mass: &zero, energy: &heating })
            .unwrap();

        let cells = thermo.cells();
        assert_relative_eq!(cells.t[0], 300.0 + dt * 1e6 / (1.2 * CV), max_relative = 1e-12);
        assert_relative_eq!(cells.t[1], 400.0, max_relative = 1e-12);
    }

    #[test]
    fn two_stage_scheme_runs_in_order() {
        let mut thermo = air();
        let mass = vec![-0.1; 3];
        let zero = vec![0.0; 3];

        thermo
            .set_ode_fields(2, &[Some(0), None], 1, &[None, None], 0)
            .unwrap();
        assert_eq!(thermo.ode_stage(), OdeStage::Staged(0));

        let err = thermo
            .solve(1, &[0.5, 0.5], &[0.0, 0.5], 0.1, StageRates { mass: &mass, energy: &zero })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::StageOrder { stage: 1, expected: 0, .. }));

        thermo
            .solve(0, &[1.0], &[1.0], 0.1, StageRates { mass: &mass, energy: &zero })
            .unwrap();
        assert_relative_eq!(thermo.cells().rho[0], 1.19, max_relative = 1e-14);

        thermo
            .solve(1, &[0.5, 0.5], &[0.0, 0.5], 0.1, StageRates { mass: &mass, energy: &zero })
            .unwrap();
        assert_relative_eq!(
            thermo.cells().rho[0],
            0.5 * 1.19 + 0.5 * 1.2 - 0.005,
            max_relative = 1e-14
        );

        let err = thermo
            .solve(1, &[0.5, 0.5], &[0.0, 0.5], 0.1, StageRates { mass: &mass, energy: &zero })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::StageOrder { .. }));
    }

    #[test]
    fn solve_before_set_ode_fields_is_rejected() {
        let mut thermo = air();
        let zero = vec![0.0; 3];
        let err = thermo
            .solve(0, &[1.0], &[1.0], 0.1, StageRates { mass: &zero, energy: &zero })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::NotStaged));
    }

    #[test]
    fn rejects_wrong_coefficient_and_rate_lengths() {
        let mut thermo = air();
        let zero = vec![0.0; 3];
        single_stage(&mut thermo);

        let err = thermo
            .solve(0, &[1.0, 0.0], &[1.0], 0.1, StageRates { mass: &zero, energy: &zero })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::Coefficients { name: "a", .. }));

        let err = thermo
            .solve(0, &[1.0], &[1.0], 0.1, StageRates { mass: &zero[..2], energy: &zero })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::FieldLength { .. }));
    }

    #[test]
    fn clearing_twice_is_safe() {
        let mut thermo = air();
        single_stage(&mut thermo);
        assert!(matches!(
            thermo.set_ode_fields(1, &[None], 0, &[None], 0),
            Err(FluidThermoError::AlreadyStaged { stage: 0 })
        ));

        thermo.clear_ode_fields();
        thermo.clear_ode_fields();
        assert_eq!(thermo.ode_stage(), OdeStage::Uninitialized);
    }

    #[test]
    fn ode_step_releases_storage_on_early_exit() {
        let mut thermo = air();
        let zero = vec![0.0; 3];

        {
            let mut step = thermo.ode_step(2, &[None, None], 0, &[None, None], 0).unwrap();
            step.solve(0, &[1.0], &[1.0], 0.1, StageRates { mass: &zero, energy: &zero })
                .unwrap();
            assert_eq!(step.ode_stage(), OdeStage::Staged(1));
        }

        assert_eq!(thermo.ode_stage(), OdeStage::Uninitialized);
        assert!(thermo.set_ode_fields(1, &[None], 0, &[None], 0).is_ok());
    }

    #[test]
    fn recovery_failure_names_the_cell() {
        let mut thermo = air();
        let zero = vec![0.0; 3];
        let cooling = vec![0.0, -1e12, 0.0];

        single_stage(&mut thermo);
        let err = thermo
            .solve(0, &[1.0], &[1.0], 1.0, StageRates { mass: &zero, energy: &cooling })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::Recovery { cell: 1, .. }));
    }

    #[test]
    fn failed_recovery_leaves_stage_and_state_untouched() {
        let mut thermo = phase(&tabulated_config(), vec![1.2, 1.0], vec![300.0, 400.0]);
        let before = thermo.cells().clone();
        let zero = vec![0.0; 2];
        let cooling = vec![-1e6, 0.0];

        // ρe drops below zero in cell 0, off the table's logarithmic axis.
        single_stage(&mut thermo);
        let err = thermo
            .solve(0, &[1.0], &[1.0], 1.0, StageRates { mass: &zero, energy: &cooling })
            .unwrap_err();
        assert!(matches!(err, FluidThermoError::Recovery { cell: 0, .. }));
        assert_eq!(thermo.ode_stage(), OdeStage::Staged(0));
        assert_eq!(thermo.cells(), &before);

        thermo
            .solve(0, &[1.0], &[1.0], 1.0, StageRates { mass: &zero, energy: &zero })
            .unwrap();
        assert_eq!(thermo.ode_stage(), OdeStage::Finalized);
        assert_relative_eq!(thermo.cells().t[0], 300.0, max_relative = 1e-6);
    }

    #[test]
    fn exposes_molecular_weight_and_energy_limit() {
        let thermo = air();
        let w = thermo.w();

        assert_eq!(w.len(), 3);
        assert_relative_eq!(w[2], 28.96, max_relative = 1e-12);
        assert_relative_eq!(thermo.w_at(1).unwrap(), 28.96, max_relative = 1e-12);
        assert!(thermo.w_at(3).is_none());
        assert!(thermo.limit());

        let config = ThermoConfig {
            limit: false,
            ..air_config()
        };
        let thermo = phase(&config, vec![1.0, 1.0], vec![300.0, 300.0]);
        assert!(!thermo.limit());
    }

    #[test]
    fn no_afterburn_releases_nothing() {
        let thermo = air();
        let source = thermo.e_source();
        assert_eq!(source.len(), thermo.n_cells());
        assert!(source.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn transport_fields_follow_constant_model() {
        let thermo = air();
        let cp = thermo.cp();
        let cp_by_cv = thermo.cp_by_cv();
        let alpha = 1.8e-5 / 0.7;

        assert_relative_eq!(thermo.mu()[0], 1.8e-5);
        assert_relative_eq!(thermo.nu()[2], 1.8e-5 / 0.8);
        assert_relative_eq!(thermo.alpha()[1], alpha);
        assert_relative_eq!(thermo.kappa()[1], alpha * cp[1]);
        assert_relative_eq!(thermo.alpha_he()[1], alpha * cp_by_cv[1]);

        let alphat = vec![1e-4; 3];
        assert_relative_eq!(thermo.alpha_eff(&alphat).unwrap()[0], alpha + 1e-4);
        assert_relative_eq!(thermo.kappa_eff(&alphat).unwrap()[0], (alpha + 1e-4) * cp[0]);
        assert!(thermo.alpha_eff(&alphat[..1]).is_err());

        assert_relative_eq!(thermo.kappa_at(1).unwrap(), alpha * cp[1]);
        assert_relative_eq!(thermo.nu_at(0).unwrap(), 1.8e-5 / 1.2);
        assert!(thermo.cv_at(3).is_none());

        let kappa = thermo.kappa_eff_patch(0, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(kappa[0], alpha * cp[0]);
    }

    #[test]
    fn patch_queries_use_face_values() {
        let thermo = air();
        let c = thermo.speed_of_sound_patch(0).unwrap();
        let cells = thermo.speed_of_sound();

        assert_eq!(c.len(), 2);
        assert_relative_eq!(c[1], cells[1], max_relative = 1e-14);
        assert_relative_eq!(
            cells[0],
            (GAMMA * thermo.cells().p[0] / 1.2).sqrt(),
            max_relative = 1e-12
        );
        assert_relative_eq!(thermo.gamma_patch(0).unwrap()[0], GAMMA);
        assert!(thermo.energy_patch(0).unwrap().iter().all(|&e| e == 0.0));
        assert!(matches!(
            thermo.cv_patch(3),
            Err(FluidThermoError::Patch { patch: 3, n_patches: 1 })
        ));
    }

    #[test]
    fn boundary_energy_follows_patch_temperature() {
        let mut thermo = air();
        thermo.patch_mut(0).unwrap().t[0] = 600.0;
        thermo.correct().unwrap();

        let patch = thermo.patch(0).unwrap();
        assert_relative_eq!(patch.e[0], CV * 600.0, max_relative = 1e-14);
        assert_relative_eq!(thermo.cp_patch(0).unwrap()[0], thermo.cp()[0], max_relative = 1e-14);
    }

    #[test]
    fn calculators_agree_with_state() {
        let thermo = phase(
            &products_config(),
            vec![1630.0, 10.0, 1e-3],
            vec![3000.0, 1500.0, 800.0],
        );
        let t = thermo.calc_t().unwrap();
        let e = thermo.calc_e().unwrap();

        for i in 0..3 {
            assert_relative_eq!(t[i], thermo.cells().t[i], max_relative = 1e-8);
            assert_relative_eq!(e[i], thermo.cells().e[i], max_relative = 1e-14);
        }
        assert_eq!(thermo.calc_p(), thermo.cells().p);
        assert!(thermo.energy()[0] > 0.0);
    }

    #[test]
    fn rejects_inconsistent_fields() {
        let config = air_config();
        let cells = CellFields::new(vec![1.0, 1.0], vec![300.0, 300.0]).unwrap();
        let patch = PatchFields::new(vec![0, 5], vec![1.0, 1.0], vec![300.0, 300.0]).unwrap();
        let err = FluidThermo::new(&config, cells, vec![patch]).unwrap_err();
        assert!(matches!(err, FluidThermoError::FaceOwner { face: 1, owner: 5, .. }));

        assert!(CellFields::new(vec![1.0], vec![]).is_err());
    }
}
