//! Analysis pipeline definitions and execution framework.
//!
//! This module selects one of the analyses from a configuration value,
//! applies the configuration through the solver's validated setters and
//! submits it against a model.

use serde::Serialize;
use sfa_model::Model;

use crate::dynamic_solver::{DynamicResults, DynamicSolver, NewmarkConfig};
use crate::error::Result;
use crate::modal_solver::{ModalResults, ModalSolver, NormalizationMethod};
use crate::static_solver::{StaticResults, StaticSolver};

/// Analysis type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisType {
    /// Linear static structural analysis
    LinearStatic,
    /// Modal/frequency analysis
    Modal,
    /// Modal dynamics with superposition
    ModalDynamic,
}

/// Analysis configuration and control
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Type of analysis to perform
    pub analysis_type: AnalysisType,
    /// Eigenvalue shift; 0 targets the smallest magnitude (modal)
    pub sigma: f64,
    /// Relative eigenvalue accuracy; 0 means full precision (modal)
    pub tolerance: f64,
    /// Number of eigenpairs (modal)
    pub number_of_eigenvalues: usize,
    /// Mode shape normalization (modal)
    pub normalization: NormalizationMethod,
    /// Whether mode shapes are returned (modal)
    pub return_mode_shapes: bool,
    /// Simulated duration in seconds (dynamic)
    pub time_period: f64,
    /// Requested increment in seconds (dynamic)
    pub increment_size: f64,
    /// Newmark parameters (dynamic)
    pub newmark: NewmarkConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::LinearStatic,
            sigma: 0.0,
            tolerance: 0.0,
            number_of_eigenvalues: 1,
            normalization: NormalizationMethod::Mass,
            return_mode_shapes: true,
            time_period: 1.0,
            increment_size: 0.1,
            newmark: NewmarkConfig::linear_acceleration(),
        }
    }
}

impl AnalysisConfig {
    pub fn linear_static() -> Self {
        Self::default()
    }

    pub fn modal(number_of_eigenvalues: usize) -> Self {
        Self {
            analysis_type: AnalysisType::Modal,
            number_of_eigenvalues,
            ..Default::default()
        }
    }

    pub fn dynamic(time_period: f64, increment_size: f64) -> Self {
        Self {
            analysis_type: AnalysisType::ModalDynamic,
            time_period,
            increment_size,
            ..Default::default()
        }
    }
}

/// Results of whichever analysis ran
#[derive(Debug, Clone, Serialize)]
pub enum AnalysisResults {
    Static(StaticResults),
    Modal(ModalResults),
    Dynamic(DynamicResults),
}

impl AnalysisResults {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisResults::Static(_) => AnalysisType::LinearStatic,
            AnalysisResults::Modal(_) => AnalysisType::Modal,
            AnalysisResults::Dynamic(_) => AnalysisType::ModalDynamic,
        }
    }
}

/// Main analysis pipeline orchestrator
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    /// Create a new analysis pipeline with the given configuration
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the configured analysis on `model`
    ///
    /// Configuration errors surface as `InvalidParameter` before any solve.
    pub fn run(&self, model: &dyn Model) -> Result<AnalysisResults> {
        let config = &self.config;
        match config.analysis_type {
            AnalysisType::LinearStatic => {
                let results = StaticSolver::new(model).submit()?;
                Ok(AnalysisResults::Static(results))
            }
            AnalysisType::Modal => {
                let mut solver = ModalSolver::new(model);
                solver
                    .set_sigma(config.sigma)?
                    .set_tolerance(config.tolerance)?
                    .set_number_of_eigenvalues(config.number_of_eigenvalues)?
                    .set_normalization_method(config.normalization)
                    .set_return_mode_shapes(config.return_mode_shapes);
                Ok(AnalysisResults::Modal(solver.submit()?))
            }
            AnalysisType::ModalDynamic => {
                let mut solver = DynamicSolver::new(model);
                solver
                    .set_time_period(config.time_period)?
                    .set_increment_size(config.increment_size)?
                    .set_newmark_config(config.newmark)?;
                Ok(AnalysisResults::Dynamic(solver.submit()?))
            }
        }
    }
}
