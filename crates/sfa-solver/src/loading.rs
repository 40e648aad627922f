//! Conversion of model load histories into global force vectors.
//!
//! # Workflow
//! 1. Evaluate each load history (its fully applied magnitude, or sampled on a time grid)
//! 2. Apply the model's load-distribution operator to reach the full dof space
//! 3. The analyses restrict or project the result as they need

use nalgebra::{DMatrix, DVector};
use sfa_model::{LoadHistory, Model, ModelError, spmm, spmv};

use crate::error::Result;

/// Full-space force vector from the fully applied load magnitudes
pub fn static_load_vector(model: &dyn Model) -> Result<DVector<f64>> {
    check_load_distribution(model)?;
    let loads = model.loads();
    let magnitudes = DVector::from_iterator(
        loads.len(),
        loads.iter().map(LoadHistory::static_magnitude),
    );
    Ok(spmv(model.load_distribution(), &magnitudes))
}

/// Full-space force history (|ndof| x |times|) with every load sampled on `times`
pub fn sampled_load_matrix(model: &dyn Model, times: &[f64]) -> Result<DMatrix<f64>> {
    check_load_distribution(model)?;
    let loads = model.loads();
    let mut sampled = DMatrix::zeros(loads.len(), times.len());
    for (i, load) in loads.iter().enumerate() {
        for (j, value) in load.sample(times).into_iter().enumerate() {
            sampled[(i, j)] = value;
        }
    }
    Ok(spmm(model.load_distribution(), &sampled))
}

/// Pick `indices` out of a full-space vector
pub fn restrict(full: &DVector<f64>, indices: &[usize]) -> DVector<f64> {
    DVector::from_iterator(indices.len(), indices.iter().map(|&i| full[i]))
}

fn check_load_distribution(model: &dyn Model) -> Result<()> {
    let operator = model.load_distribution();
    let expected = (model.ndof().len(), model.loads().len());
    if (operator.nrows(), operator.ncols()) != expected {
        return Err(ModelError::DimensionMismatch(format!(
            "load distribution is {}x{}, expected {}x{}",
            operator.nrows(),
            operator.ncols(),
            expected.0,
            expected.1
        ))
        .into());
    }
    Ok(())
}
