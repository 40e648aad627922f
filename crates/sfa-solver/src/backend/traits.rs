//! Backend trait definitions for numerical solvers.
//!
//! These traits abstract over the concrete numerical library used for the
//! reduced-system operations (linear solve, generalized eigenvalue solve).
//! The analyses hand over free-free partitions and never factorize matrices
//! themselves.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

/// Error type for backend operations.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError(pub String);

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {}

impl From<String> for BackendError {
    fn from(s: String) -> Self {
        BackendError(s)
    }
}

impl From<&str> for BackendError {
    fn from(s: &str) -> Self {
        BackendError(s.to_string())
    }
}

/// A symmetric generalized eigenvalue problem: K * phi = lambda * M * phi.
pub struct EigenProblem<'a> {
    /// Stiffness matrix (free-free partition)
    pub stiffness: &'a CsrMatrix<f64>,
    /// Mass matrix (free-free partition)
    pub mass: &'a CsrMatrix<f64>,
    /// Number of eigenpairs to extract
    pub num_modes: usize,
    /// Shift for shift-invert extraction; `None` targets the smallest magnitude
    pub shift: Option<f64>,
    /// Relative eigenvalue accuracy; 0 requests full precision
    pub tolerance: f64,
    /// Whether eigenvectors are returned
    pub eigenvectors: bool,
}

/// Results from an eigenvalue solve.
#[derive(Debug, Clone)]
pub struct EigenResult {
    /// Eigenvalues (lambda = omega^2), sorted ascending
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors as columns in the problem's dof space (n x num_modes)
    pub eigenvectors: Option<DMatrix<f64>>,
}

/// Solver convergence and diagnostic info.
#[derive(Debug, Clone)]
pub struct SolveInfo {
    /// Number of iterations (1 for direct solvers)
    pub iterations: usize,
    /// Final residual norm (if available)
    pub residual_norm: Option<f64>,
    /// Human-readable solver name (e.g., "nalgebra-LU")
    pub solver_name: String,
}

/// Trait for a linear solver backend.
///
/// Implementations solve A * x = b and must fail on a singular or
/// near-singular A rather than return non-finite values.
pub trait LinearSolver: Send + Sync {
    fn solve_linear(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveInfo), BackendError>;
}

/// Trait for an eigenvalue solver backend.
///
/// Implementations return the `num_modes` eigenvalues nearest the shift,
/// sorted ascending. Negative eigenvalues are returned as computed; the
/// caller decides what to do with them.
pub trait EigenSolver: Send + Sync {
    fn solve_eigen(
        &self,
        problem: &EigenProblem<'_>,
    ) -> Result<(EigenResult, SolveInfo), BackendError>;
}

/// Combined backend providing both linear and eigenvalue solvers.
pub trait SolverBackend: LinearSolver + EigenSolver {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}
