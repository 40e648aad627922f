//! Numerical backend abstraction layer.
//!
//! The analyses partition the model, then dispatch the heavy numerical work
//! (factorization, eigen-extraction) to a backend through the
//! [`LinearSolver`] and [`EigenSolver`] traits. Any parallelism lives inside
//! a backend; the analyses themselves run sequentially.
//!
//! # Architecture
//!
//! ```text
//! Model (CSR K, M, dof partitions)
//!         │
//!         ▼
//! Analyses (partition, normalize, time-step)
//!         │
//!         ▼
//! Backend Trait Layer (LinearSolver, EigenSolver)
//!         │
//!         ▼
//! NativeBackend (nalgebra LU, shift-invert subspace iteration)
//! ```

#[cfg(test)]
pub(crate) mod fixtures;
pub mod native;
pub mod traits;

pub use native::NativeBackend;
pub use traits::*;

/// Returns the default solver backend.
pub fn default_backend() -> Box<dyn SolverBackend> {
    Box::new(NativeBackend::new())
}
