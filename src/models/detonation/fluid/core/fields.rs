use super::FluidThermoError;

/// Cell values of one phase.
///
/// `mu` and `alpha` are transport caches refreshed by
/// [`FluidThermo::correct`](super::FluidThermo::correct).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellFields {
    pub rho: Vec<f64>,
    pub e: Vec<f64>,
    pub t: Vec<f64>,
    pub p: Vec<f64>,
    pub(super) mu: Vec<f64>,
    pub(super) alpha: Vec<f64>,
}

impl CellFields {
    /// Creates cell fields from density and temperature.
    ///
    /// Energy and pressure are left at zero until the owning model evaluates
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::FieldLength`] if the lengths differ.
    pub fn new(rho: Vec<f64>, t: Vec<f64>) -> Result<Self, FluidThermoError> {
        FluidThermoError::check_length("T", rho.len(), t.len())?;
        let n = rho.len();
        Ok(Self {
            rho,
            e: vec![0.0; n],
            t,
            p: vec![0.0; n],
            mu: vec![0.0; n],
            alpha: vec![0.0; n],
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rho.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rho.is_empty()
    }

    pub(super) fn check(&self) -> Result<(), FluidThermoError> {
        let n = self.len();
        for (field, values) in [("e", &self.e), ("T", &self.t), ("p", &self.p)] {
            FluidThermoError::check_length(field, n, values.len())?;
        }
        Ok(())
    }
}

/// Face values of one boundary patch.
///
/// `owners[i]` is the cell adjacent to face `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchFields {
    pub owners: Vec<usize>,
    pub rho: Vec<f64>,
    pub e: Vec<f64>,
    pub t: Vec<f64>,
    pub p: Vec<f64>,
    pub(super) mu: Vec<f64>,
    pub(super) alpha: Vec<f64>,
}

impl PatchFields {
    /// Creates patch fields from face owners, density and temperature.
    ///
    /// # Errors
    ///
    /// Returns [`FluidThermoError::FieldLength`] if the lengths differ.
    pub fn new(owners: Vec<usize>, rho: Vec<f64>, t: Vec<f64>) -> Result<Self, FluidThermoError> {
        let n = owners.len();
        FluidThermoError::check_length("rho", n, rho.len())?;
        FluidThermoError::check_length("T", n, t.len())?;
        Ok(Self {
            owners,
            rho,
            e: vec![0.0; n],
            t,
            p: vec![0.0; n],
            mu: vec![0.0; n],
            alpha: vec![0.0; n],
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub(super) fn check(&self, patch: usize, n_cells: usize) -> Result<(), FluidThermoError> {
        let n = self.len();
        let fields = [("rho", &self.rho), ("e", &self.e), ("T", &self.t), ("p", &self.p)];
        for (field, values) in fields {
            FluidThermoError::check_length(field, n, values.len())?;
        }
        match self.owners.iter().position(|&owner| owner >= n_cells) {
            Some(face) => Err(FluidThermoError::FaceOwner {
                patch,
                face,
                owner: self.owners[face],
                n_cells,
            }),
            None => Ok(()),
        }
    }
}

/// Read-only view of a phase's cell state.
#[derive(Debug, Clone, Copy)]
pub struct ThermoView<'a> {
    pub rho: &'a [f64],
    pub e: &'a [f64],
    pub t: &'a [f64],
    pub p: &'a [f64],
}

impl ThermoView<'_> {
    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.rho.len()
    }
}
