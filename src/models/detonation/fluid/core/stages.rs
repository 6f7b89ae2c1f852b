//! Stage storage for explicit multi-stage time integration.
//!
//! Each stage `k` of an `N`-stage scheme updates the evolved scalars
//! `U ∈ {ρ, ρe}` as
//!
//! ```text
//! U ← a[k]·U + Σ_{i<k} a[i]·old[old_is[i]]
//!       + dt·(b[k]·L + Σ_{i<k} b[i]·delta[delta_is[i]])
//! ```
//!
//! where `old[old_is[i]]` and `delta[delta_is[i]]` hold the value and rate
//! recorded when stage `i` ran.

use std::ops::{Deref, DerefMut};

use rayon::prelude::*;

use super::{FluidThermo, FluidThermoError};

/// Rates of change of the evolved scalars supplied by the outer solver.
#[derive(Debug, Clone, Copy)]
pub struct StageRates<'a> {
    /// Rate of change of `ρ`, kg/(m³·s).
    pub mass: &'a [f64],

    /// Rate of change of `ρe`, W/m³, excluding afterburn release.
    pub energy: &'a [f64],
}

/// Where the time step stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdeStage {
    /// No stage storage is allocated.
    Uninitialized,

    /// Storage is allocated and stage `k` runs next.
    Staged(usize),

    /// Every stage has run and the storage is spent.
    Finalized,
}

/// One stage's coefficients.
#[derive(Debug, Clone, Copy)]
pub(super) struct Stage<'a> {
    pub k: usize,
    pub a: &'a [f64],
    pub b: &'a [f64],
    pub dt: f64,
}

/// Scoped stage storage.
///
/// Created by [`FluidThermo::ode_step`]; releases the storage when dropped,
/// whether or not every stage ran.
#[derive(Debug)]
pub struct OdeStep<'a> {
    thermo: &'a mut FluidThermo,
}

impl<'a> OdeStep<'a> {
    pub(super) fn new(thermo: &'a mut FluidThermo) -> Self {
        Self { thermo }
    }
}

impl Deref for OdeStep<'_> {
    type Target = FluidThermo;

    fn deref(&self) -> &Self::Target {
        self.thermo
    }
}

impl DerefMut for OdeStep<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.thermo
    }
}

impl Drop for OdeStep<'_> {
    fn drop(&mut self) {
        self.thermo.clear_ode_fields();
    }
}

/// Value and rate history of the evolved scalars.
#[derive(Debug, Clone, PartialEq, Default)]
struct Slot {
    rho: Vec<f64>,
    rho_e: Vec<f64>,
}

impl Slot {
    fn zeros(n: usize) -> Self {
        Self {
            rho: vec![0.0; n],
            rho_e: vec![0.0; n],
        }
    }

    fn rho(&self) -> &[f64] {
        &self.rho
    }

    fn rho_e(&self) -> &[f64] {
        &self.rho_e
    }
}

/// Storage for one time step, created by `set_ode_fields`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct StageStorage {
    old_is: Vec<Option<usize>>,
    delta_is: Vec<Option<usize>>,
    old: Vec<Slot>,
    delta: Vec<Slot>,
    next: usize,
}

impl StageStorage {
    /// Allocates `n_old` value slots and `n_delta` rate slots of `n_cells`.
    pub(super) fn new(
        n_steps: usize,
        old_is: &[Option<usize>],
        n_old: usize,
        delta_is: &[Option<usize>],
        n_delta: usize,
        n_cells: usize,
    ) -> Result<Self, FluidThermoError> {
        if n_steps == 0 {
            return Err(FluidThermoError::Schedule {
                context: "at least one stage is required".into(),
            });
        }
        check_slots("old_is", old_is, n_steps, n_old)?;
        check_slots("delta_is", delta_is, n_steps, n_delta)?;

        Ok(Self {
            old_is: old_is.to_vec(),
            delta_is: delta_is.to_vec(),
            old: vec![Slot::zeros(n_cells); n_old],
            delta: vec![Slot::zeros(n_cells); n_delta],
            next: 0,
        })
    }

    pub(super) fn n_steps(&self) -> usize {
        self.old_is.len()
    }

    pub(super) fn next(&self) -> usize {
        self.next
    }

    pub(super) fn is_finished(&self) -> bool {
        self.next == self.n_steps()
    }

    /// Checks that `stage` may run now.
    pub(super) fn check_stage(&self, stage: &Stage<'_>) -> Result<(), FluidThermoError> {
        let Stage { k, a, b, .. } = *stage;
        if k != self.next || k >= self.n_steps() {
            return Err(FluidThermoError::StageOrder {
                stage: k,
                expected: self.next,
                n_steps: self.n_steps(),
            });
        }
        for (name, coeffs) in [("a", a), ("b", b)] {
            if coeffs.len() != k + 1 {
                return Err(FluidThermoError::Coefficients {
                    name,
                    expected: k + 1,
                    found: coeffs.len(),
                });
            }
        }
        Ok(())
    }

    /// Blended `(ρ, ρe)` for `stage`, as if its values and rates were
    /// already recorded. Leaves the storage untouched.
    pub(super) fn blend(
        &self,
        stage: &Stage<'_>,
        rho: &[f64],
        rho_e: &[f64],
        rates: StageRates<'_>,
    ) -> (Vec<f64>, Vec<f64>) {
        let Stage { k, a, b, dt } = *stage;

        // Earlier stages that recorded a value or rate, with their weights.
        // A slot stage `k` is about to overwrite reads the current entry.
        let olds: Vec<(f64, Option<&Slot>)> = (0..k)
            .filter_map(|i| {
                let slot = self.old_is[i]?;
                let stored = (self.old_is[k] != Some(slot)).then(|| &self.old[slot]);
                Some((a[i], stored))
            })
            .collect();
        let deltas: Vec<(f64, Option<&Slot>)> = (0..k)
            .filter_map(|i| {
                let slot = self.delta_is[i]?;
                let stored = (self.delta_is[k] != Some(slot)).then(|| &self.delta[slot]);
                Some((b[i], stored))
            })
            .collect();

        let blend = |current: &[f64], rate: &[f64], field: fn(&Slot) -> &[f64]| -> Vec<f64> {
            (0..current.len())
                .into_par_iter()
                .map(|cell| {
                    let old: f64 = olds
                        .iter()
                        .map(|(w, s)| w * s.map_or(current[cell], |s| field(s)[cell]))
                        .sum();
                    let delta: f64 = deltas
                        .iter()
                        .map(|(w, s)| w * s.map_or(rate[cell], |s| field(s)[cell]))
                        .sum();
                    a[k] * current[cell] + old + dt * (b[k] * rate[cell] + delta)
                })
                .collect()
        };

        (
            blend(rho, rates.mass, Slot::rho),
            blend(rho_e, rates.energy, Slot::rho_e),
        )
    }

    /// Records the values and rates `stage` started from and moves on to the
    /// next stage.
    pub(super) fn record(
        &mut self,
        stage: &Stage<'_>,
        rho: &[f64],
        rho_e: &[f64],
        rates: StageRates<'_>,
    ) {
        let k = stage.k;
        if let Some(slot) = self.old_is[k] {
            self.old[slot].rho.copy_from_slice(rho);
            self.old[slot].rho_e.copy_from_slice(rho_e);
        }
        if let Some(slot) = self.delta_is[k] {
            self.delta[slot].rho.copy_from_slice(rates.mass);
            self.delta[slot].rho_e.copy_from_slice(rates.energy);
        }
        self.next += 1;
    }

    /// Blends `stage` and records it.
    #[cfg(test)]
    fn advance(
        &mut self,
        stage: &Stage<'_>,
        rho: &[f64],
        rho_e: &[f64],
        rates: StageRates<'_>,
    ) -> (Vec<f64>, Vec<f64>) {
        let blended = self.blend(stage, rho, rho_e, rates);
        self.record(stage, rho, rho_e, rates);
        blended
    }
}

fn check_slots(
    name: &str,
    slots: &[Option<usize>],
    n_steps: usize,
    n_slots: usize,
) -> Result<(), FluidThermoError> {
    if slots.len() != n_steps {
        return Err(FluidThermoError::Schedule {
            context: format!("{name} has {} entries for {n_steps} stages", slots.len()),
        });
    }
    if let Some(slot) = slots.iter().flatten().find(|&&slot| slot >= n_slots) {
        return Err(FluidThermoError::Schedule {
            context: format!("{name} names slot {slot} of {n_slots}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn stage<'a>(k: usize, a: &'a [f64], b: &'a [f64], dt: f64) -> Stage<'a> {
        Stage { k, a, b, dt }
    }

    #[test]
    fn ssp_rk2_blends_old_values() {
        let mut storage = StageStorage::new(2, &[Some(0), None], 1, &[None, None], 0, 1).unwrap();
        let zero = [0.0];

        // U' = -U, U0 = 1.
        let (rho, _) = storage.advance(
            &stage(0, &[1.0], &[1.0], 0.1),
            &[1.0],
            &[2.0],
            StageRates {
                mass: &[-1.0],
                energy: &zero,
            },
        );
        assert_relative_eq!(rho[0], 0.9);

        let (rho, rho_e) = storage.advance(
            &stage(1, &[0.5, 0.5], &[0.0, 0.5], 0.1),
            &rho,
            &[2.0],
            StageRates {
                mass: &[-rho[0]],
                energy: &zero,
            },
        );
        assert_relative_eq!(
            rho[0],
            0.5 * 0.9 + 0.5 * 1.0 + 0.1 * 0.5 * -0.9,
            max_relative = 1e-14
        );
        assert_relative_eq!(rho_e[0], 2.0, max_relative = 1e-14);
        assert!(storage.is_finished());
    }

    #[test]
    fn delta_slots_carry_earlier_rates() {
        let mut storage = StageStorage::new(2, &[None, None], 0, &[Some(0), None], 1, 1).unwrap();
        let zero = [0.0];

        let (rho, _) = storage.advance(
            &stage(0, &[1.0], &[0.5], 1.0),
            &[1.0],
            &zero,
            StageRates {
                mass: &[2.0],
                energy: &zero,
            },
        );
        assert_relative_eq!(rho[0], 2.0);

        let (rho, _) = storage.advance(
            &stage(1, &[0.0, 1.0], &[0.25, 0.25], 1.0),
            &rho,
            &zero,
            StageRates {
                mass: &[4.0],
                energy: &zero,
            },
        );
        assert_relative_eq!(rho[0], 2.0 + 0.25 * 4.0 + 0.25 * 2.0);
    }

    #[test]
    fn rejects_inconsistent_schedules() {
        assert!(StageStorage::new(0, &[], 0, &[], 0, 4).is_err());
        assert!(StageStorage::new(2, &[Some(0)], 1, &[None, None], 0, 4).is_err());
        assert!(StageStorage::new(1, &[Some(1)], 1, &[None], 0, 4).is_err());
    }

    #[test]
    fn checks_stage_order_and_coefficients() {
        let storage = StageStorage::new(2, &[None, None], 0, &[None, None], 0, 1).unwrap();
        assert!(storage.check_stage(&stage(0, &[1.0], &[1.0], 1.0)).is_ok());
        assert!(matches!(
            storage.check_stage(&stage(1, &[0.5, 0.5], &[0.0, 1.0], 1.0)),
            Err(FluidThermoError::StageOrder { stage: 1, expected: 0, .. })
        ));
        assert!(matches!(
            storage.check_stage(&stage(0, &[1.0, 0.0], &[1.0], 1.0)),
            Err(FluidThermoError::Coefficients { name: "a", .. })
        ));
    }
}
