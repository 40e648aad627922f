//! Free/restrained partitioning of global sparse matrices.
//!
//! A global matrix K is split by the free (f) and restrained (r) index sets:
//!
//! ```text
//! | Kff  Kfr |
//! | Krf  Krr |
//! ```
//!
//! Block rows and columns follow the order of the index lists, so a block
//! row `i` corresponds to global row `rows[i]`.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// The four blocks of a partitioned square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedMatrix {
    pub ff: CsrMatrix<f64>,
    pub fr: CsrMatrix<f64>,
    pub rf: CsrMatrix<f64>,
    pub rr: CsrMatrix<f64>,
}

impl PartitionedMatrix {
    /// Split `matrix` by the free and restrained global indices.
    pub fn split(matrix: &CsrMatrix<f64>, free: &[usize], restrained: &[usize]) -> Self {
        Self {
            ff: extract_block(matrix, free, free),
            fr: extract_block(matrix, free, restrained),
            rf: extract_block(matrix, restrained, free),
            rr: extract_block(matrix, restrained, restrained),
        }
    }
}

/// Extract the submatrix `matrix[rows, cols]`.
///
/// Indices outside `matrix` are ignored, so the block is zero there.
pub fn extract_block(matrix: &CsrMatrix<f64>, rows: &[usize], cols: &[usize]) -> CsrMatrix<f64> {
    let row_map = local_positions(rows, matrix.nrows());
    let col_map = local_positions(cols, matrix.ncols());

    let mut coo = CooMatrix::new(rows.len(), cols.len());
    for (i, j, &value) in matrix.triplet_iter() {
        if let (Some(bi), Some(bj)) = (row_map[i], col_map[j]) {
            coo.push(bi, bj, value);
        }
    }
    CsrMatrix::from(&coo)
}

/// Map each global index to its position in `indices` (if any)
fn local_positions(indices: &[usize], size: usize) -> Vec<Option<usize>> {
    let mut positions = vec![None; size];
    for (local, &global) in indices.iter().enumerate() {
        if global < size {
            positions[global] = Some(local);
        }
    }
    positions
}

/// Sparse matrix-vector product y = A*x
pub fn spmv(matrix: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let mut y = DVector::zeros(matrix.nrows());
    for (i, j, &value) in matrix.triplet_iter() {
        y[i] += value * x[j];
    }
    y
}

/// Sparse-dense product Y = A*X for a dense right-hand side with many columns
pub fn spmm(matrix: &CsrMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut y = DMatrix::zeros(matrix.nrows(), x.ncols());
    for (i, j, &value) in matrix.triplet_iter() {
        for c in 0..x.ncols() {
            y[(i, c)] += value * x[(j, c)];
        }
    }
    y
}
