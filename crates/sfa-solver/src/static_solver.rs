//! Linear static analysis on a partitioned stiffness matrix.
//!
//! With the dofs split into free (f) and restrained (r) sets:
//!
//! ```text
//! Kff * Uf = Ff - Kfr * Ur
//! ```
//!
//! Restrained displacements are homogeneous (Ur = 0). The full displacement
//! vector is rebuilt by scattering Ur and Uf back to their global indices.

use log::{debug, info};
use nalgebra::DVector;
use serde::Serialize;
use sfa_model::{Model, spmv};

use crate::backend::{SolverBackend, default_backend};
use crate::error::Result;
use crate::loading::{restrict, static_load_vector};

/// Results from static analysis
#[derive(Debug, Clone, Serialize)]
pub struct StaticResults {
    /// Displacement over all dofs (|ndof|), in global index order
    pub displacement: DVector<f64>,
    /// Residual norm of the reduced solve, as reported by the backend
    pub residual_norm: Option<f64>,
}

impl StaticResults {
    /// Displacement of the dof with global index `index`
    pub fn displacement_at(&self, index: usize) -> Option<f64> {
        self.displacement.get(index).copied()
    }
}

/// Static solver for an assembled model
pub struct StaticSolver<'a> {
    model: &'a dyn Model,
    backend: Box<dyn SolverBackend>,
}

impl<'a> StaticSolver<'a> {
    pub fn new(model: &'a dyn Model) -> Self {
        Self::with_backend(model, default_backend())
    }

    pub fn with_backend(model: &'a dyn Model, backend: Box<dyn SolverBackend>) -> Self {
        Self { model, backend }
    }

    /// Solve for the free displacements.
    ///
    /// # Errors
    /// - `NumericalFailure` if Kff is singular or near-singular
    /// - `Model` if the load-distribution operator does not fit the model
    pub fn submit(&self) -> Result<StaticResults> {
        let model = self.model;
        let free = model.free_indices();
        let restrained = model.restrained_indices();
        info!(
            "Static analysis: {} dofs ({} free, {} restrained)",
            model.ndof().len(),
            free.len(),
            restrained.len()
        );

        let k = model.partitioned_stiffness();
        let ur = DVector::zeros(restrained.len());
        let ff = restrict(&static_load_vector(model)?, &free);

        let rhs = ff - spmv(&k.fr, &ur);
        let (uf, solve_info) = self.backend.solve_linear(&k.ff, &rhs)?;
        debug!(
            "{} solved {} equations, residual {:?}",
            solve_info.solver_name,
            uf.len(),
            solve_info.residual_norm
        );

        let mut displacement = DVector::zeros(model.ndof().len());
        for (&i, &u) in restrained.iter().zip(ur.iter()) {
            displacement[i] = u;
        }
        for (&i, &u) in free.iter().zip(uf.iter()) {
            displacement[i] = u;
        }

        Ok(StaticResults {
            displacement,
            residual_norm: solve_info.residual_norm,
        })
    }
}
