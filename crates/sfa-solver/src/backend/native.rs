//! Native backend using nalgebra.
//!
//! This is the default backend when no external solver library is available.
//! It supports:
//! - Dense LU decomposition with a pivot-ratio singularity check
//! - Shift-invert subspace iteration with Rayleigh-Ritz projection for the
//!   symmetric generalized eigenvalue problem

use nalgebra::linalg::{LU, SymmetricEigen};
use nalgebra::{DMatrix, DVector, Dyn};
use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;
use sfa_model::spmv;

use super::traits::*;

/// Relative eigenvalue change accepted when full precision is requested
const FULL_PRECISION: f64 = 1e-12;

/// Lower bound of the eigensolver iteration budget
const MIN_ITERATIONS: usize = 100;

/// Projected-mass eigenvalues below this fraction of the largest are rank loss
const RANK_TOLERANCE: f64 = 1e-12;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Native solver backend using nalgebra for all numerical operations.
///
/// Matrices are densified before factorization, so this is suited to
/// small-to-medium reduced systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend {
    max_iterations: Option<usize>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the subspace iteration count. Without a cap the budget is
    /// `max(10 n, 100)` for an n-dof system.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

impl LinearSolver for NativeBackend {
    fn solve_linear(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveInfo), BackendError> {
        let n = matrix.nrows();
        if matrix.ncols() != n || rhs.len() != n {
            return Err(format!(
                "Cannot solve {}x{} system with right-hand side of length {}",
                n,
                matrix.ncols(),
                rhs.len()
            )
            .into());
        }

        let info = |residual_norm| SolveInfo {
            iterations: 1,
            residual_norm: Some(residual_norm),
            solver_name: "nalgebra-LU".to_string(),
        };

        if n == 0 {
            return Ok((DVector::zeros(0), info(0.0)));
        }

        let lu = factorize(DMatrix::from(matrix), "Stiffness")?;
        let x = lu
            .solve(rhs)
            .ok_or(BackendError("Singular matrix in LU decomposition".into()))?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err("LU solve produced non-finite values".into());
        }

        let residual = (spmv(matrix, &x) - rhs).norm();
        Ok((x, info(residual)))
    }
}

impl EigenSolver for NativeBackend {
    fn solve_eigen(
        &self,
        problem: &EigenProblem<'_>,
    ) -> Result<(EigenResult, SolveInfo), BackendError> {
        let n = problem.stiffness.nrows();
        let square = problem.stiffness.ncols() == n
            && problem.mass.nrows() == n
            && problem.mass.ncols() == n;
        if !square {
            return Err("Stiffness and mass must be square and of equal size".into());
        }

        let num_modes = problem.num_modes;
        if num_modes == 0 || num_modes > n {
            return Err(format!(
                "Cannot extract {} eigenpairs from a system with {} dofs",
                num_modes, n
            )
            .into());
        }

        let k = DMatrix::from(problem.stiffness);
        let m = DMatrix::from(problem.mass);
        let sigma = problem.shift.unwrap_or(0.0);
        let lu = factorize(&k - &m * sigma, "Shifted stiffness")?;

        let tolerance = if problem.tolerance > 0.0 {
            problem.tolerance
        } else {
            FULL_PRECISION
        };
        let max_iterations = self
            .max_iterations
            .unwrap_or_else(|| (10 * n).max(MIN_ITERATIONS));

        let mut x = starting_block(&k, &m, sigma, subspace_size(num_modes, n));
        let mut previous: Option<Vec<f64>> = None;

        for iteration in 1..=max_iterations {
            // Y = (K - σM)^-1 * M * X, one independent solve per column
            let mx = &m * &x;
            let columns = (0..mx.ncols())
                .into_par_iter()
                .map(|j| {
                    lu.solve(&mx.column(j).into_owned())
                        .map(|y| y.normalize())
                })
                .collect::<Option<Vec<DVector<f64>>>>()
                .ok_or(BackendError("Shift-invert solve failed".into()))?;
            let y = DMatrix::from_columns(&columns);

            let (values, vectors) = rayleigh_ritz(&k, &m, &y)?;
            if values.len() < num_modes {
                return Err(format!(
                    "Subspace collapsed to {} vectors, {} modes requested",
                    values.len(),
                    num_modes
                )
                .into());
            }

            // Nearest to the shift first
            let mut order: Vec<usize> = (0..values.len()).collect();
            order.sort_by(|&a, &b| {
                (values[a] - sigma)
                    .abs()
                    .total_cmp(&(values[b] - sigma).abs())
            });
            let nearest: Vec<f64> = order[..num_modes].iter().map(|&i| values[i]).collect();
            x = vectors.select_columns(order.iter());

            let converged = previous
                .as_ref()
                .is_some_and(|prev| has_converged(prev, &nearest, sigma, tolerance));
            if converged {
                return Ok(finish(&k, &m, &x, nearest, problem.eigenvectors, iteration));
            }
            previous = Some(nearest);
        }

        Err(format!(
            "Eigensolver did not converge within {} iterations (tolerance {:.1e})",
            max_iterations, tolerance
        )
        .into())
    }
}

impl SolverBackend for NativeBackend {
    fn name(&self) -> &str {
        "native-nalgebra"
    }
}

/// LU-factorize `matrix`, rejecting singular and near-singular pivots.
///
/// The factorization is accepted only when every pivot is finite and
/// `min |u_ii| > max |u_ii| * n * ε`. The test is on the raw pivots with no
/// row or column scaling, so a regular but badly scaled matrix (for example
/// `diag(1e17, 1)`) is reported as near-singular.
fn factorize(matrix: DMatrix<f64>, what: &str) -> Result<LU<f64, Dyn, Dyn>, BackendError> {
    let n = matrix.nrows();
    let lu = matrix.lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    let largest = pivots.max();
    let smallest = pivots.min();

    let regular = largest.is_finite()
        && smallest.is_finite()
        && smallest > largest * n as f64 * f64::EPSILON;
    if !regular {
        return Err(BackendError(format!(
            "{} matrix is singular or near-singular (pivot ratio {:.2e})",
            what,
            smallest / largest
        )));
    }
    Ok(lu)
}

/// Block size: twice the requested count, at least eight extra vectors, capped at n
fn subspace_size(num_modes: usize, n: usize) -> usize {
    (2 * num_modes).max(num_modes + 8).min(n)
}

/// Starting vectors after Bathe: the mass diagonal, unit vectors at the dofs
/// whose diagonal Rayleigh quotient lies nearest the shift, and one irregular
/// vector. A block as wide as the system starts from the identity.
fn starting_block(k: &DMatrix<f64>, m: &DMatrix<f64>, sigma: f64, size: usize) -> DMatrix<f64> {
    let n = k.nrows();
    if size == n {
        return DMatrix::identity(n, n);
    }

    let mut x = DMatrix::zeros(n, size);
    let mass_diagonal = m.diagonal();
    if mass_diagonal.iter().all(|&v| v == 0.0) {
        x.column_mut(0).fill(1.0);
    } else {
        x.set_column(0, &mass_diagonal);
    }

    let distance = |i: usize| {
        if m[(i, i)] > 0.0 {
            (k[(i, i)] / m[(i, i)] - sigma).abs()
        } else {
            f64::INFINITY
        }
    };
    let mut candidates: Vec<usize> = (0..n).collect();
    candidates.sort_by(|&a, &b| distance(a).total_cmp(&distance(b)));

    for (c, &i) in candidates.iter().take(size.saturating_sub(2)).enumerate() {
        x[(i, c + 1)] = 1.0;
    }

    if size >= 2 {
        let last = size - 1;
        for i in 0..n {
            x[(i, last)] = ((i + 1) as f64 * GOLDEN_RATIO).fract() - 0.5;
        }
    }
    x
}

/// Project (K, M) onto span(Y) and return Ritz values with M-orthonormal
/// Ritz vectors (unsorted).
fn rayleigh_ritz(
    k: &DMatrix<f64>,
    m: &DMatrix<f64>,
    y: &DMatrix<f64>,
) -> Result<(Vec<f64>, DMatrix<f64>), BackendError> {
    let kr = symmetric_part(y.transpose() * k * y);
    let mr = symmetric_part(y.transpose() * m * y);

    // Mr loses rank once two basis vectors converge onto the same mode
    let mass_eigen = SymmetricEigen::try_new(mr, f64::EPSILON, 0)
        .ok_or(BackendError("Projected mass eigenproblem failed".into()))?;
    let d = &mass_eigen.eigenvalues;
    let largest = d.max();
    if !(largest > 0.0) {
        return Err("Projected mass matrix is not positive definite".into());
    }

    let kept: Vec<usize> = (0..d.len())
        .filter(|&i| d[i] > largest * RANK_TOLERANCE)
        .collect();
    let inv_sqrt = DVector::from_iterator(kept.len(), kept.iter().map(|&i| d[i].sqrt().recip()));
    let t = mass_eigen.eigenvectors.select_columns(kept.iter()) * DMatrix::from_diagonal(&inv_sqrt);

    let reduced = symmetric_part(t.transpose() * kr * &t);
    let eigen = SymmetricEigen::try_new(reduced, f64::EPSILON, 0)
        .ok_or(BackendError("Projected stiffness eigenproblem failed".into()))?;

    let vectors = y * (t * eigen.eigenvectors);
    Ok((eigen.eigenvalues.iter().copied().collect(), vectors))
}

fn symmetric_part(a: DMatrix<f64>) -> DMatrix<f64> {
    (&a + a.transpose()) * 0.5
}

fn has_converged(previous: &[f64], current: &[f64], sigma: f64, tolerance: f64) -> bool {
    previous.iter().zip(current).all(|(&old, &new)| {
        let scale = (new - sigma).abs().max(new.abs()).max(f64::MIN_POSITIVE);
        (new - old).abs() <= tolerance * scale
    })
}

/// Sort the converged pairs ascending and report the worst residual
fn finish(
    k: &DMatrix<f64>,
    m: &DMatrix<f64>,
    x: &DMatrix<f64>,
    nearest: Vec<f64>,
    want_vectors: bool,
    iterations: usize,
) -> (EigenResult, SolveInfo) {
    let mut order: Vec<usize> = (0..nearest.len()).collect();
    order.sort_by(|&a, &b| nearest[a].total_cmp(&nearest[b]));

    let eigenvalues: Vec<f64> = order.iter().map(|&i| nearest[i]).collect();
    let phi = x.select_columns(order.iter());

    let residual = eigenvalues
        .iter()
        .enumerate()
        .map(|(j, &lambda)| {
            let v = phi.column(j);
            (k * &v - m * &v * lambda).norm()
        })
        .fold(0.0, f64::max);

    (
        EigenResult {
            eigenvalues,
            eigenvectors: want_vectors.then_some(phi),
        },
        SolveInfo {
            iterations,
            residual_norm: Some(residual),
            solver_name: "nalgebra-subspace-iteration".to_string(),
        },
    )
}
