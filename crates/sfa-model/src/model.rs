//! The model contract consumed by the analyses.

use nalgebra_sparse::CsrMatrix;

use crate::damping::RayleighDamping;
use crate::dof::DofMap;
use crate::load::LoadHistory;
use crate::partition::{PartitionedMatrix, extract_block};

/// An assembled structural model.
///
/// Implementors own the global matrices and the dof bookkeeping; the
/// analyses only read through this interface.
pub trait Model {
    /// All degrees of freedom
    fn ndof(&self) -> &DofMap;

    /// Free (unknown) degrees of freedom
    fn fdof(&self) -> &DofMap;

    /// Restrained (prescribed) degrees of freedom
    fn rdof(&self) -> &DofMap;

    /// Global stiffness matrix (|ndof| x |ndof|)
    fn stiffness(&self) -> &CsrMatrix<f64>;

    /// Global mass matrix (|ndof| x |ndof|)
    fn mass(&self) -> &CsrMatrix<f64>;

    /// Load histories, one column of the load-distribution operator each
    fn loads(&self) -> &[LoadHistory];

    /// Operator mapping load entries onto the full dof space (|ndof| x |loads|)
    fn load_distribution(&self) -> &CsrMatrix<f64>;

    /// Rayleigh damping coefficients
    fn damping(&self) -> RayleighDamping;

    fn free_indices(&self) -> Vec<usize> {
        self.fdof().indices()
    }

    fn restrained_indices(&self) -> Vec<usize> {
        self.rdof().indices()
    }

    fn partitioned_stiffness(&self) -> PartitionedMatrix {
        PartitionedMatrix::split(
            self.stiffness(),
            &self.free_indices(),
            &self.restrained_indices(),
        )
    }

    fn partitioned_mass(&self) -> PartitionedMatrix {
        PartitionedMatrix::split(self.mass(), &self.free_indices(), &self.restrained_indices())
    }

    /// Kff only, without building the coupling blocks
    fn free_stiffness(&self) -> CsrMatrix<f64> {
        let free = self.free_indices();
        extract_block(self.stiffness(), &free, &free)
    }

    /// Mff only, without building the coupling blocks
    fn free_mass(&self) -> CsrMatrix<f64> {
        let free = self.free_indices();
        extract_block(self.mass(), &free, &free)
    }
}
