//! Canned backends for unit tests.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use super::traits::*;

fn canned(values: Vec<f64>, problem: &EigenProblem<'_>) -> (EigenResult, SolveInfo) {
    let n = problem.stiffness.nrows();
    let vectors = DMatrix::from_fn(n, values.len(), |i, j| (i + j + 1) as f64);
    (
        EigenResult {
            eigenvalues: values,
            eigenvectors: problem.eigenvectors.then_some(vectors),
        },
        SolveInfo {
            iterations: 1,
            residual_norm: None,
            solver_name: "canned".to_string(),
        },
    )
}

/// Returns `[-1e-9, 4.0]` whatever the request, column `j` of the vectors
/// holding `i + j + 1`
pub(crate) struct FixedSpectrum;

/// Returns `num_modes` negative eigenvalues `-1, -2, ...`
pub(crate) struct NegativeSpectrum;

macro_rules! no_linear_solve {
    ($backend:ty) => {
        impl LinearSolver for $backend {
            fn solve_linear(
                &self,
                _matrix: &CsrMatrix<f64>,
                _rhs: &DVector<f64>,
            ) -> Result<(DVector<f64>, SolveInfo), BackendError> {
                Err("not used".into())
            }
        }

        impl SolverBackend for $backend {
            fn name(&self) -> &str {
                "canned"
            }
        }
    };
}

no_linear_solve!(FixedSpectrum);
no_linear_solve!(NegativeSpectrum);

impl EigenSolver for FixedSpectrum {
    fn solve_eigen(
        &self,
        problem: &EigenProblem<'_>,
    ) -> Result<(EigenResult, SolveInfo), BackendError> {
        Ok(canned(vec![-1e-9, 4.0], problem))
    }
}

impl EigenSolver for NegativeSpectrum {
    fn solve_eigen(
        &self,
        problem: &EigenProblem<'_>,
    ) -> Result<(EigenResult, SolveInfo), BackendError> {
        let values = (1..=problem.num_modes).map(|i| -(i as f64)).collect();
        Ok(canned(values, problem))
    }
}
