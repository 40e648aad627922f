//! Error types for sfa-solver

use sfa_model::ModelError;
use thiserror::Error;

use crate::backend::BackendError;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Out-of-domain configuration value, raised when the value is set
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Singular system, eigensolver non-convergence or a violated invariant
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl From<BackendError> for AnalysisError {
    fn from(err: BackendError) -> Self {
        AnalysisError::NumericalFailure(err.0)
    }
}
