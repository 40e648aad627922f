//! In-memory [`Model`] built from pre-assembled global matrices.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::damping::RayleighDamping;
use crate::dof::{DofId, DofMap};
use crate::error::{ModelError, Result};
use crate::load::LoadHistory;
use crate::model::Model;

/// A model whose global matrices were assembled elsewhere
#[derive(Debug, Clone)]
pub struct AssembledModel {
    ndof: DofMap,
    fdof: DofMap,
    rdof: DofMap,
    stiffness: CsrMatrix<f64>,
    mass: CsrMatrix<f64>,
    loads: Vec<LoadHistory>,
    load_distribution: CsrMatrix<f64>,
    damping: RayleighDamping,
}

impl AssembledModel {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }
}

impl Model for AssembledModel {
    fn ndof(&self) -> &DofMap {
        &self.ndof
    }

    fn fdof(&self) -> &DofMap {
        &self.fdof
    }

    fn rdof(&self) -> &DofMap {
        &self.rdof
    }

    fn stiffness(&self) -> &CsrMatrix<f64> {
        &self.stiffness
    }

    fn mass(&self) -> &CsrMatrix<f64> {
        &self.mass
    }

    fn loads(&self) -> &[LoadHistory] {
        &self.loads
    }

    fn load_distribution(&self) -> &CsrMatrix<f64> {
        &self.load_distribution
    }

    fn damping(&self) -> RayleighDamping {
        self.damping
    }
}

/// A load applied to one dof with a scale factor
#[derive(Debug, Clone)]
struct AppliedLoad {
    dof: DofId,
    factor: f64,
    history: LoadHistory,
}

/// Incremental construction of an [`AssembledModel`].
///
/// Dofs are numbered in the order they are added; the free and restrained
/// maps keep that order.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    ndof: DofMap,
    fdof: DofMap,
    rdof: DofMap,
    stiffness: Option<CsrMatrix<f64>>,
    mass: Option<CsrMatrix<f64>>,
    loads: Vec<AppliedLoad>,
    damping: RayleighDamping,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free dof and return its global index
    pub fn add_dof(&mut self, id: DofId) -> Result<usize> {
        let index = self.ndof.len();
        self.ndof.insert(id, index)?;
        self.fdof.insert(id, index)?;
        Ok(index)
    }

    /// Add a restrained (zero-displacement) dof and return its global index
    pub fn add_restrained_dof(&mut self, id: DofId) -> Result<usize> {
        let index = self.ndof.len();
        self.ndof.insert(id, index)?;
        self.rdof.insert(id, index)?;
        Ok(index)
    }

    pub fn set_stiffness(&mut self, stiffness: CsrMatrix<f64>) -> &mut Self {
        self.stiffness = Some(stiffness);
        self
    }

    pub fn set_stiffness_dense(&mut self, stiffness: &DMatrix<f64>) -> &mut Self {
        self.set_stiffness(CsrMatrix::from(stiffness))
    }

    pub fn set_mass(&mut self, mass: CsrMatrix<f64>) -> &mut Self {
        self.mass = Some(mass);
        self
    }

    pub fn set_mass_dense(&mut self, mass: &DMatrix<f64>) -> &mut Self {
        self.set_mass(CsrMatrix::from(mass))
    }

    pub fn set_damping(&mut self, damping: RayleighDamping) -> &mut Self {
        self.damping = damping;
        self
    }

    /// Apply `history` to dof `id` with unit scale
    pub fn add_load(&mut self, id: DofId, history: LoadHistory) -> Result<&mut Self> {
        self.add_scaled_load(id, 1.0, history)
    }

    /// Apply `factor * history` to dof `id`
    pub fn add_scaled_load(
        &mut self,
        id: DofId,
        factor: f64,
        history: LoadHistory,
    ) -> Result<&mut Self> {
        if !self.ndof.contains(&id) {
            return Err(ModelError::UnknownDof(id));
        }
        self.loads.push(AppliedLoad {
            dof: id,
            factor,
            history,
        });
        Ok(self)
    }

    /// Validate and freeze the model.
    ///
    /// # Errors
    /// - [`ModelError::Empty`] if no dofs were added
    /// - [`ModelError::MissingMatrix`] if stiffness or mass is absent
    /// - [`ModelError::MatrixShape`] if a matrix is not |ndof| square
    pub fn build(self) -> Result<AssembledModel> {
        let n = self.ndof.len();
        if n == 0 {
            return Err(ModelError::Empty);
        }

        let stiffness = self.stiffness.ok_or(ModelError::MissingMatrix("Stiffness"))?;
        let mass = self.mass.ok_or(ModelError::MissingMatrix("Mass"))?;
        check_shape("Stiffness", &stiffness, n)?;
        check_shape("Mass", &mass, n)?;

        let mut distribution = CooMatrix::new(n, self.loads.len());
        for (column, load) in self.loads.iter().enumerate() {
            let row = self
                .ndof
                .get(&load.dof)
                .ok_or(ModelError::UnknownDof(load.dof))?;
            distribution.push(row, column, load.factor);
        }

        Ok(AssembledModel {
            ndof: self.ndof,
            fdof: self.fdof,
            rdof: self.rdof,
            stiffness,
            mass,
            loads: self.loads.into_iter().map(|load| load.history).collect(),
            load_distribution: CsrMatrix::from(&distribution),
            damping: self.damping,
        })
    }
}

fn check_shape(name: &'static str, matrix: &CsrMatrix<f64>, expected: usize) -> Result<()> {
    if matrix.nrows() != expected || matrix.ncols() != expected {
        return Err(ModelError::MatrixShape {
            name,
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            expected,
        });
    }
    Ok(())
}
