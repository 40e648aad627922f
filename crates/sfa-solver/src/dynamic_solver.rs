//! Dynamic analysis by modal superposition with Newmark time integration.
//!
//! Solves the transient structural dynamics problem
//! M*ü + C*u̇ + K*u = F(t)
//! on a truncated set of mass-normalized modes, where it decouples into one
//! equation per mode i:
//!
//! ```text
//! q̈ᵢ + 2ζᵢωᵢ q̇ᵢ + ωᵢ² qᵢ = φᵢᵀ F(t)
//! ```
//!
//! - ωᵢ = 2πfᵢ from the modal analysis
//! - ζᵢ from Rayleigh damping: ζ = α/(4πf) + βπf
//!
//! # Newmark Method
//!
//! The Newmark β-method is an implicit time integration scheme:
//!
//! ```text
//! u_{n+1} = u_n + Δt*u̇_n + (Δt²/2)*[(1-2β)*ü_n + 2β*ü_{n+1}]
//! u̇_{n+1} = u̇_n + Δt*[(1-γ)*ü_n + γ*ü_{n+1}]
//! ```
//!
//! Standard parameter choices:
//! - **Average acceleration** (unconditionally stable): γ = 1/2, β = 1/4
//! - **Linear acceleration**: γ = 1/2, β = 1/6
//! - **Fox-Goodwin**: γ = 1/2, β = 1/12
//!
//! The solver uses linear acceleration unless configured otherwise. It is
//! only conditionally stable, so the increment is capped at a tenth of the
//! shortest retained period.
//!
//! # Example
//!
//! ```no_run
//! use sfa_model::AssembledModel;
//! use sfa_solver::DynamicSolver;
//!
//! # fn example(model: AssembledModel) -> sfa_solver::Result<()> {
//! let mut solver = DynamicSolver::new(&model);
//! solver.set_time_period(2.0)?.set_increment_size(0.001)?;
//!
//! let results = solver.submit()?;
//! println!("Computed {} time steps", results.num_steps());
//! println!("Final modal displacement: {:?}", results.displacement_at(results.num_steps() - 1));
//! # Ok(())
//! # }
//! ```

use std::f64::consts::PI;

use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use sfa_model::Model;

use crate::backend::{SolverBackend, default_backend};
use crate::error::{AnalysisError, Result};
use crate::loading::sampled_load_matrix;
use crate::modal_solver::{ModalSettings, extract_modes};

/// Largest number of modes retained for superposition
pub const MODE_TRUNCATION: usize = 10;

/// Increments per period of the highest retained mode, at least
const STEPS_PER_PERIOD: f64 = 10.0;

/// Relative slack when dividing the period into whole increments
const GRID_SNAP: f64 = 1e-9;

/// Newmark time integration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewmarkConfig {
    /// Newmark β parameter (controls acceleration)
    pub beta: f64,
    /// Newmark γ parameter (controls velocity)
    pub gamma: f64,
}

impl NewmarkConfig {
    /// Average acceleration method (unconditionally stable, 2nd order accurate)
    ///
    /// γ = 1/2, β = 1/4
    pub fn average_acceleration() -> Self {
        Self {
            beta: 0.25,
            gamma: 0.5,
        }
    }

    /// Linear acceleration method (conditionally stable)
    ///
    /// γ = 1/2, β = 1/6
    pub fn linear_acceleration() -> Self {
        Self {
            beta: 1.0 / 6.0,
            gamma: 0.5,
        }
    }

    /// Fox-Goodwin method
    ///
    /// γ = 1/2, β = 1/12
    pub fn fox_goodwin() -> Self {
        Self {
            beta: 1.0 / 12.0,
            gamma: 0.5,
        }
    }

    fn validate(&self) -> Result<()> {
        let valid = self.beta.is_finite()
            && self.gamma.is_finite()
            && self.beta > 0.0
            && self.gamma > 0.0;
        if !valid {
            return Err(AnalysisError::InvalidParameter(format!(
                "Newmark parameters must be positive, got beta {} gamma {}",
                self.beta, self.gamma
            )));
        }
        Ok(())
    }
}

impl Default for NewmarkConfig {
    fn default() -> Self {
        Self::linear_acceleration()
    }
}

/// Modal coordinate histories, one row per mode and one column per time sample
#[derive(Debug, Clone, Serialize)]
pub struct ModalResponse {
    pub displacement: DMatrix<f64>,
    pub velocity: DMatrix<f64>,
    pub acceleration: DMatrix<f64>,
}

/// Dynamic analysis results
#[derive(Debug, Clone, Serialize)]
pub struct DynamicResults {
    /// Time samples
    pub time: Vec<f64>,
    /// Modal displacements (modes × time samples)
    pub displacement: DMatrix<f64>,
    /// Modal velocities (modes × time samples)
    pub velocity: DMatrix<f64>,
    /// Modal accelerations (modes × time samples)
    pub acceleration: DMatrix<f64>,
    /// Natural frequencies (Hz) of the retained modes
    pub frequencies: Vec<f64>,
    /// Mass-normalized mode shapes (|ndof| × modes)
    pub modes: DMatrix<f64>,
    /// Damping ratio of each retained mode
    pub damping_ratios: Vec<f64>,
    /// Increment actually used
    pub increment: f64,
}

impl DynamicResults {
    /// Get modal displacement at a specific time step
    pub fn displacement_at(&self, step: usize) -> Option<DVector<f64>> {
        column(&self.displacement, step)
    }

    /// Get modal velocity at a specific time step
    pub fn velocity_at(&self, step: usize) -> Option<DVector<f64>> {
        column(&self.velocity, step)
    }

    /// Get modal acceleration at a specific time step
    pub fn acceleration_at(&self, step: usize) -> Option<DVector<f64>> {
        column(&self.acceleration, step)
    }

    /// Get number of time steps
    pub fn num_steps(&self) -> usize {
        self.time.len()
    }
}

fn column(history: &DMatrix<f64>, step: usize) -> Option<DVector<f64>> {
    (step < history.ncols()).then(|| history.column(step).into_owned())
}

/// Dynamic analysis solver
pub struct DynamicSolver<'a> {
    model: &'a dyn Model,
    backend: Box<dyn SolverBackend>,
    config: NewmarkConfig,
    time_period: f64,
    increment_size: f64,
}

impl<'a> DynamicSolver<'a> {
    /// Create a dynamic solver: period 1 s, increment 0.1 s, linear acceleration
    pub fn new(model: &'a dyn Model) -> Self {
        Self::with_backend(model, default_backend())
    }

    pub fn with_backend(model: &'a dyn Model, backend: Box<dyn SolverBackend>) -> Self {
        Self {
            model,
            backend,
            config: NewmarkConfig::default(),
            time_period: 1.0,
            increment_size: 0.1,
        }
    }

    /// Total simulated duration (s)
    pub fn set_time_period(&mut self, period: f64) -> Result<&mut Self> {
        if !(period.is_finite() && period > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Time period must be positive, got {}",
                period
            )));
        }
        self.time_period = period;
        Ok(self)
    }

    /// Requested time step (s); may be reduced for stability
    pub fn set_increment_size(&mut self, size: f64) -> Result<&mut Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Increment size must be positive, got {}",
                size
            )));
        }
        self.increment_size = size;
        Ok(self)
    }

    pub fn set_newmark_config(&mut self, config: NewmarkConfig) -> Result<&mut Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn time_period(&self) -> f64 {
        self.time_period
    }

    pub fn increment_size(&self) -> f64 {
        self.increment_size
    }

    pub fn newmark_config(&self) -> NewmarkConfig {
        self.config
    }

    /// Run the modal extraction and integrate the modal equations
    ///
    /// # Errors
    /// - `NumericalFailure` if the modal extraction fails or retains no mode
    /// - `NumericalFailure` if an effective modal stiffness is not positive
    pub fn submit(&self) -> Result<DynamicResults> {
        let model = self.model;
        let settings = ModalSettings {
            number_of_eigenvalues: MODE_TRUNCATION.min(model.fdof().len()),
            return_mode_shapes: true,
            ..ModalSettings::default()
        };
        let modal = extract_modes(model, self.backend.as_ref(), &settings)?;
        let modes = modal.modes.ok_or_else(|| {
            AnalysisError::NumericalFailure("Modal analysis returned no mode shapes".into())
        })?;
        let frequencies = modal.frequencies;
        let highest = match frequencies.last() {
            Some(&f) => f,
            None => {
                return Err(AnalysisError::NumericalFailure(
                    "No modes retained for superposition".into(),
                ));
            }
        };

        let increment = stable_increment(self.increment_size, highest);
        if increment < self.increment_size {
            debug!(
                "Increment reduced from {:.3e} to {:.3e} s (highest mode {:.3} Hz)",
                self.increment_size, increment, highest
            );
        }
        let time = time_grid(self.time_period, increment);
        info!(
            "Dynamic analysis: {} modes, {} time samples at {:.3e} s",
            frequencies.len(),
            time.len(),
            increment
        );

        let damping = model.damping();
        let damping_ratios: Vec<f64> = frequencies.iter().map(|&f| damping.ratio(f)).collect();

        let forces = modes.transpose() * sampled_load_matrix(model, &time)?;
        let response = integrate_modal(
            &self.config,
            &frequencies,
            &damping_ratios,
            &forces,
            increment,
        )?;
        info!("Dynamic analysis complete");

        Ok(DynamicResults {
            time,
            displacement: response.displacement,
            velocity: response.velocity,
            acceleration: response.acceleration,
            frequencies,
            modes,
            damping_ratios,
            increment,
        })
    }
}

/// Cap `requested` at a tenth of the period of `highest_frequency`
pub fn stable_increment(requested: f64, highest_frequency: f64) -> f64 {
    let limit = 1.0 / (STEPS_PER_PERIOD * highest_frequency);
    if requested > limit { limit } else { requested }
}

/// Uniform samples `0, h, 2h, ...` up to the first one reaching `period`
pub fn time_grid(period: f64, step: f64) -> Vec<f64> {
    let ratio = period / step;
    let nearest = ratio.round();
    let count = if (ratio - nearest).abs() <= GRID_SNAP * ratio.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    (0..=count as usize).map(|i| i as f64 * step).collect()
}

/// Integrate decoupled modal equations with unit modal mass.
///
/// `forces` holds one row per mode and one column per time sample, spaced
/// `step` apart. Motion starts from rest; the initial acceleration follows
/// from the equation of motion at t = 0.
pub fn integrate_modal(
    config: &NewmarkConfig,
    frequencies: &[f64],
    damping_ratios: &[f64],
    forces: &DMatrix<f64>,
    step: f64,
) -> Result<ModalResponse> {
    config.validate()?;
    if !(step.is_finite() && step > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "Increment size must be positive, got {}",
            step
        )));
    }
    let num_modes = frequencies.len();
    if damping_ratios.len() != num_modes || forces.nrows() != num_modes {
        return Err(AnalysisError::InvalidParameter(format!(
            "{} frequencies, {} damping ratios and {} force rows do not match",
            num_modes,
            damping_ratios.len(),
            forces.nrows()
        )));
    }

    let (beta, gamma, h) = (config.beta, config.gamma, step);
    let num_samples = forces.ncols();
    let mut dsp = DMatrix::zeros(num_modes, num_samples);
    let mut vlc = DMatrix::zeros(num_modes, num_samples);
    let mut acc = DMatrix::zeros(num_modes, num_samples);
    if num_samples == 0 {
        return Ok(ModalResponse {
            displacement: dsp,
            velocity: vlc,
            acceleration: acc,
        });
    }

    // Kinematic update constants
    let c1 = gamma / (beta * h);
    let c2 = 1.0 - gamma / beta;
    let c3 = h * (1.0 - gamma / (2.0 * beta));
    let c4 = 1.0 / (beta * h * h);
    let c5 = -1.0 / (beta * h);
    let c6 = -(1.0 / (2.0 * beta) - 1.0);

    for i in 0..num_modes {
        let omega = 2.0 * PI * frequencies[i];
        let k = omega * omega;
        let c = 2.0 * omega * damping_ratios[i];

        // Effective stiffness contributions of the previous state
        let a1 = 1.0 / (beta * h * h) + gamma / (beta * h) * c;
        let a2 = 1.0 / (beta * h) + (gamma / beta - 1.0) * c;
        let a3 = (1.0 / (2.0 * beta) - 1.0) + h * (gamma / (2.0 * beta) - 1.0) * c;
        let effective = k + a1;
        if !(effective.is_finite() && effective > 0.0) {
            return Err(AnalysisError::NumericalFailure(format!(
                "Effective stiffness of mode {} is {} (frequency {} Hz, damping ratio {})",
                i + 1,
                effective,
                frequencies[i],
                damping_ratios[i]
            )));
        }

        acc[(i, 0)] = forces[(i, 0)] - c * vlc[(i, 0)] - k * dsp[(i, 0)];

        for j in 0..num_samples - 1 {
            let (u, v, a) = (dsp[(i, j)], vlc[(i, j)], acc[(i, j)]);
            let next = (forces[(i, j + 1)] + a1 * u + a2 * v + a3 * a) / effective;
            let du = next - u;

            dsp[(i, j + 1)] = next;
            vlc[(i, j + 1)] = c1 * du + c2 * v + c3 * a;
            acc[(i, j + 1)] = c4 * du + c5 * v + c6 * a;
        }
    }

    Ok(ModalResponse {
        displacement: dsp,
        velocity: vlc,
        acceleration: acc,
    })
}
