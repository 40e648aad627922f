//! Modal analysis solver for computing natural frequencies and mode shapes.
//!
//! This module implements eigenvalue analysis for undamped free vibration on
//! the free-free partition:
//! (Kff - λMff)φ = 0
//!
//! where:
//! - Kff, Mff = stiffness and mass restricted to the free dofs
//! - λ = ω² (squared angular frequency)
//! - φ = mode shape (eigenvector)
//!
//! # Workflow
//! 1. Extract Kff and Mff from the model
//! 2. Solve the generalized eigenvalue problem near the shift σ
//! 3. Drop spurious negative eigenvalues together with their vectors
//! 4. Normalize the mode shapes (mass or displacement)
//! 5. Expand mode shapes back to the full dof space, restrained rows zero
//! 6. Convert eigenvalues to frequencies: f = √λ / (2π)
//!
//! # Example
//! ```no_run
//! use sfa_model::AssembledModel;
//! use sfa_solver::{ModalSolver, NormalizationMethod};
//!
//! # fn example(model: AssembledModel) -> sfa_solver::Result<()> {
//! let mut solver = ModalSolver::new(&model);
//! solver
//!     .set_number_of_eigenvalues(5)?
//!     .set_normalization_method(NormalizationMethod::Mass);
//! let results = solver.submit()?;
//!
//! println!("Natural frequencies (Hz):");
//! for (i, freq) in results.frequencies.iter().enumerate() {
//!     println!("  Mode {}: {:.2} Hz", i + 1, freq);
//! }
//! # Ok(())
//! # }
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use serde::Serialize;
use sfa_model::{Model, spmv};

use crate::backend::{EigenProblem, SolverBackend, default_backend};
use crate::error::{AnalysisError, Result};

/// Mode shape scaling applied after extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NormalizationMethod {
    /// Largest-magnitude component becomes ±1
    Displacement,
    /// φᵀ Mff φ = 1
    #[default]
    Mass,
}

impl FromStr for NormalizationMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("displacement") {
            Ok(NormalizationMethod::Displacement)
        } else if s.eq_ignore_ascii_case("mass") {
            Ok(NormalizationMethod::Mass)
        } else {
            Err(AnalysisError::InvalidParameter(format!(
                "Normalization method must be either \"Displacement\" or \"Mass\", got \"{}\"",
                s
            )))
        }
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationMethod::Displacement => write!(f, "Displacement"),
            NormalizationMethod::Mass => write!(f, "Mass"),
        }
    }
}

/// Results from modal analysis
#[derive(Debug, Clone, Serialize)]
pub struct ModalResults {
    /// Natural frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Eigenvalues (λ = ω² = (2πf)²)
    pub eigenvalues: Vec<f64>,
    /// Mode shapes, one column per retained mode (|ndof| × modes).
    /// `None` when mode shapes were not requested.
    pub modes: Option<DMatrix<f64>>,
    /// Number of negative eigenvalues dropped from the result
    pub discarded: usize,
}

impl ModalResults {
    /// Number of retained modes
    pub fn num_modes(&self) -> usize {
        self.frequencies.len()
    }

    /// Get the i-th mode shape as a vector
    pub fn mode_shape(&self, mode_index: usize) -> Option<DVector<f64>> {
        let modes = self.modes.as_ref()?;
        if mode_index >= modes.ncols() {
            return None;
        }
        Some(modes.column(mode_index).into())
    }

    /// Get angular frequency (rad/s) for a given mode
    pub fn angular_frequency(&self, mode_index: usize) -> Option<f64> {
        self.eigenvalues
            .get(mode_index)
            .map(|&lambda| lambda.sqrt())
    }

    /// Period (s) of a given mode
    pub fn period(&self, mode_index: usize) -> Option<f64> {
        self.frequencies.get(mode_index).map(|&f| 1.0 / f)
    }
}

/// Extraction settings shared by the modal and dynamic analyses
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModalSettings {
    pub sigma: Option<f64>,
    pub tolerance: f64,
    pub number_of_eigenvalues: usize,
    pub normalization: NormalizationMethod,
    pub return_mode_shapes: bool,
}

impl Default for ModalSettings {
    fn default() -> Self {
        Self {
            sigma: None,
            tolerance: 0.0,
            number_of_eigenvalues: 1,
            normalization: NormalizationMethod::Mass,
            return_mode_shapes: true,
        }
    }
}

/// Modal analysis solver
pub struct ModalSolver<'a> {
    model: &'a dyn Model,
    backend: Box<dyn SolverBackend>,
    settings: ModalSettings,
}

impl std::fmt::Debug for ModalSolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalSolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> ModalSolver<'a> {
    /// Create a modal solver with default settings: no shift, full precision,
    /// one eigenvalue, mass normalization, mode shapes returned.
    pub fn new(model: &'a dyn Model) -> Self {
        Self::with_backend(model, default_backend())
    }

    pub fn with_backend(model: &'a dyn Model, backend: Box<dyn SolverBackend>) -> Self {
        Self {
            model,
            backend,
            settings: ModalSettings::default(),
        }
    }

    /// Shift near which eigenvalues are extracted.
    ///
    /// Zero disables the shift and targets the smallest-magnitude
    /// eigenvalues. Negative or non-finite values are rejected.
    pub fn set_sigma(&mut self, sigma: f64) -> Result<&mut Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Sigma must be positive, got {}",
                sigma
            )));
        }
        self.settings.sigma = (sigma > 0.0).then_some(sigma);
        Ok(self)
    }

    /// Relative eigenvalue accuracy; 0 means full precision.
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<&mut Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Tolerance must be non-negative, got {}",
                tolerance
            )));
        }
        self.settings.tolerance = tolerance;
        Ok(self)
    }

    /// Number of eigenpairs to extract, between 1 and |fdof| - 1.
    pub fn set_number_of_eigenvalues(&mut self, number: usize) -> Result<&mut Self> {
        let limit = self.model.fdof().len().saturating_sub(1);
        if number == 0 || number > limit {
            return Err(AnalysisError::InvalidParameter(format!(
                "Number of eigenvalues must be between 1 and {} (free dofs minus one), got {}",
                limit, number
            )));
        }
        self.settings.number_of_eigenvalues = number;
        Ok(self)
    }

    pub fn set_normalization_method(&mut self, method: NormalizationMethod) -> &mut Self {
        self.settings.normalization = method;
        self
    }

    /// Skip eigenvector extraction and normalization when `false`.
    pub fn set_return_mode_shapes(&mut self, value: bool) -> &mut Self {
        self.settings.return_mode_shapes = value;
        self
    }

    pub fn sigma(&self) -> Option<f64> {
        self.settings.sigma
    }

    pub fn tolerance(&self) -> f64 {
        self.settings.tolerance
    }

    pub fn number_of_eigenvalues(&self) -> usize {
        self.settings.number_of_eigenvalues
    }

    pub fn normalization_method(&self) -> NormalizationMethod {
        self.settings.normalization
    }

    pub fn returns_mode_shapes(&self) -> bool {
        self.settings.return_mode_shapes
    }

    /// Solve the modal analysis problem
    ///
    /// # Errors
    /// Returns `NumericalFailure` if:
    /// - Kff - σMff is singular
    /// - the eigensolver does not converge
    /// - a mode shape has no positive norm to normalize by
    pub fn submit(&self) -> Result<ModalResults> {
        extract_modes(self.model, self.backend.as_ref(), &self.settings)
    }
}

/// Run one modal extraction on `model`
pub(crate) fn extract_modes(
    model: &dyn Model,
    backend: &dyn SolverBackend,
    settings: &ModalSettings,
) -> Result<ModalResults> {
    let free = model.free_indices();
    info!(
        "Modal analysis: {} eigenvalues from {} free dofs (sigma {:?})",
        settings.number_of_eigenvalues,
        free.len(),
        settings.sigma
    );

    let kff = model.free_stiffness();
    let mff = model.free_mass();
    let problem = EigenProblem {
        stiffness: &kff,
        mass: &mff,
        num_modes: settings.number_of_eigenvalues,
        shift: settings.sigma,
        tolerance: settings.tolerance,
        eigenvectors: settings.return_mode_shapes,
    };
    let (solution, solve_info) = backend.solve_eigen(&problem)?;
    debug!(
        "{} converged in {} iterations, residual {:?}",
        solve_info.solver_name, solve_info.iterations, solve_info.residual_norm
    );

    let vectors = solution
        .eigenvectors
        .filter(|_| settings.return_mode_shapes);
    let (eigenvalues, vectors, discarded) = discard_negative(solution.eigenvalues, vectors);
    if discarded > 0 {
        warn!(
            "{} negative eigenvalues discarded, {} retained",
            discarded,
            eigenvalues.len()
        );
    }

    let modes = match vectors {
        Some(vectors) => {
            let normalized = normalize(vectors, &mff, settings.normalization)?;
            Some(expand(&normalized, &free, model.ndof().len()))
        }
        None => None,
    };

    let frequencies: Vec<f64> = eigenvalues
        .iter()
        .map(|&lambda| lambda.sqrt() / (2.0 * PI))
        .collect();
    info!("Modal analysis complete: {} modes", frequencies.len());

    Ok(ModalResults {
        frequencies,
        eigenvalues,
        modes,
        discarded,
    })
}

/// Keep the non-negative eigenvalues and their vectors; returns the
/// number dropped.
fn discard_negative(
    values: Vec<f64>,
    vectors: Option<DMatrix<f64>>,
) -> (Vec<f64>, Option<DMatrix<f64>>, usize) {
    let kept: Vec<usize> = (0..values.len()).filter(|&i| values[i] >= 0.0).collect();
    let discarded = values.len() - kept.len();
    if discarded == 0 {
        return (values, vectors, 0);
    }

    let retained = kept.iter().map(|&i| values[i]).collect();
    let vectors = vectors.map(|v| v.select_columns(kept.iter()));
    (retained, vectors, discarded)
}

fn normalize(
    mut vectors: DMatrix<f64>,
    mass: &CsrMatrix<f64>,
    method: NormalizationMethod,
) -> Result<DMatrix<f64>> {
    for j in 0..vectors.ncols() {
        let v = vectors.column(j).into_owned();
        let scale = match method {
            NormalizationMethod::Mass => v.dot(&spmv(mass, &v)).sqrt(),
            NormalizationMethod::Displacement => v.amax(),
        };
        if !(scale.is_finite() && scale > 0.0) {
            return Err(AnalysisError::NumericalFailure(format!(
                "Mode {} cannot be normalized ({} scale {})",
                j + 1,
                method,
                scale
            )));
        }
        vectors.column_mut(j).unscale_mut(scale);
    }
    Ok(vectors)
}

/// Scatter free-dof rows into a zero |ndof| × modes matrix
fn expand(vectors: &DMatrix<f64>, free: &[usize], ndof: usize) -> DMatrix<f64> {
    let mut modes = DMatrix::zeros(ndof, vectors.ncols());
    for (row, &index) in free.iter().enumerate() {
        modes.row_mut(index).copy_from(&vectors.row(row));
    }
    modes
}
