//! Assembled structural model consumed by the sfa analyses.
//!
//! The analyses never see elements or meshes. They read:
//! - dof partitions (`ndof`, `fdof`, `rdof`) as ordered id → index maps
//! - global stiffness and mass matrices in CSR form
//! - load histories and the operator distributing them onto the dofs
//! - Rayleigh damping coefficients
//!
//! [`Model`] is that contract; [`AssembledModel`] is an in-memory
//! implementation built with [`ModelBuilder`].

pub mod assembled;
pub mod damping;
pub mod dof;
pub mod error;
pub mod load;
pub mod model;
pub mod partition;

pub use assembled::{AssembledModel, ModelBuilder};
pub use damping::RayleighDamping;
pub use dof::{DofId, DofMap};
pub use error::{ModelError, Result};
pub use load::LoadHistory;
pub use model::Model;
pub use partition::{PartitionedMatrix, extract_block, spmm, spmv};
