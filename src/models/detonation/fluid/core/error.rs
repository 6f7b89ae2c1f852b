use thiserror::Error;

use crate::support::{config::ConfigError, thermo::RecoveryError};

/// Errors raised by a phase's thermodynamic model.
#[derive(Debug, Error)]
pub enum FluidThermoError {
    /// The phase could not be built from its configuration.
    #[error("invalid thermodynamic configuration")]
    Config(#[from] ConfigError),

    /// Field arrays of one region disagree in length.
    #[error("{field} has {found} values, expected {expected}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// A boundary face names a cell outside the mesh.
    #[error("patch {patch} face {face} names owner cell {owner} of {n_cells}")]
    FaceOwner {
        patch: usize,
        face: usize,
        owner: usize,
        n_cells: usize,
    },

    /// A patch index outside the mesh's boundary.
    #[error("no patch {patch} (have {n_patches})")]
    Patch { patch: usize, n_patches: usize },

    /// State recovery failed in a cell.
    #[error("state recovery failed in cell {cell}")]
    Recovery {
        cell: usize,
        #[source]
        source: RecoveryError,
    },

    /// State recovery failed on a boundary face.
    #[error("state recovery failed on patch {patch} face {face}")]
    PatchRecovery {
        patch: usize,
        face: usize,
        #[source]
        source: RecoveryError,
    },

    /// The stage schedule passed to `set_ode_fields` is inconsistent.
    #[error("invalid stage schedule: {context}")]
    Schedule { context: String },

    /// `set_ode_fields` was called while a time step is in progress.
    #[error("stage storage is already allocated at stage {stage}")]
    AlreadyStaged { stage: usize },

    /// `solve` was called without stage storage.
    #[error("solve called before set_ode_fields")]
    NotStaged,

    /// A stage outside the schedule, or out of order.
    #[error("stage {stage} cannot run now, expected stage {expected} of {n_steps}")]
    StageOrder {
        stage: usize,
        expected: usize,
        n_steps: usize,
    },

    /// A coefficient list has the wrong length for the stage.
    #[error("coefficient list `{name}` has {found} entries, expected {expected}")]
    Coefficients {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}

impl FluidThermoError {
    pub(crate) fn check_length(
        field: &'static str,
        expected: usize,
        found: usize,
    ) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::FieldLength {
                field,
                expected,
                found,
            })
        }
    }
}
