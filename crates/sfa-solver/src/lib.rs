//! Structural analyses of an assembled finite-element model.
//!
//! Three analyses share the [`sfa_model::Model`] contract:
//! - [`StaticSolver`]: partitioned linear solve `Kff·Uf = Ff − Kfr·Ur`
//! - [`ModalSolver`]: shift-invert eigen-extraction with mass or
//!   displacement normalization
//! - [`DynamicSolver`]: modal superposition on up to ten modes, integrated
//!   with Newmark-β
//!
//! Factorization and eigen-extraction go through the [`backend`] traits;
//! [`NativeBackend`] is the default.

pub mod analysis;
pub mod backend;
pub mod dynamic_solver;
pub mod error;
pub mod loading;
pub mod modal_solver;
pub mod static_solver;

pub use analysis::{AnalysisConfig, AnalysisPipeline, AnalysisResults, AnalysisType};
pub use backend::{
    BackendError, EigenProblem, EigenResult, EigenSolver, LinearSolver, NativeBackend, SolveInfo,
    SolverBackend, default_backend,
};
pub use dynamic_solver::{
    DynamicResults, DynamicSolver, MODE_TRUNCATION, ModalResponse, NewmarkConfig,
    integrate_modal, stable_increment, time_grid,
};
pub use error::{AnalysisError, Result};
pub use modal_solver::{ModalResults, ModalSolver, NormalizationMethod};
pub use static_solver::{StaticResults, StaticSolver};
