//! Error types for sfa-model

use thiserror::Error;

use crate::dof::DofId;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Degree of freedom {0} defined twice")]
    DuplicateDof(DofId),

    #[error("Degree of freedom {0} not found in model")]
    UnknownDof(DofId),

    #[error("Model has no degrees of freedom")]
    Empty,

    #[error("{name} matrix is {rows}x{cols}, expected {expected}x{expected}")]
    MatrixShape {
        name: &'static str,
        rows: usize,
        cols: usize,
        expected: usize,
    },

    #[error("{0} matrix not supplied")]
    MissingMatrix(&'static str),

    #[error("Invalid load history: {0}")]
    InvalidLoad(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}
