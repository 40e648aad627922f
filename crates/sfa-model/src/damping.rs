//! Rayleigh (proportional) damping coefficients.
//!
//! C = α*M + β*K, which in modal coordinates gives the per-mode ratio
//! ζ = α/(2ω) + βω/2 = α/(4πf) + βπf.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Mass- and stiffness-proportional damping coefficients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RayleighDamping {
    /// Mass-proportional coefficient α
    pub alpha: f64,
    /// Stiffness-proportional coefficient β
    pub beta: f64,
}

impl RayleighDamping {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Damping ratio of a mode with natural frequency `frequency` (Hz)
    pub fn ratio(&self, frequency: f64) -> f64 {
        self.alpha / (4.0 * PI * frequency) + self.beta * PI * frequency
    }

    /// Compute α and β from two modal frequencies and their damping ratios
    ///
    /// # Arguments
    /// * `freq1` - First modal frequency (Hz)
    /// * `freq2` - Second modal frequency (Hz)
    /// * `zeta1` - Damping ratio for freq1 (e.g., 0.05 for 5%)
    /// * `zeta2` - Damping ratio for freq2
    pub fn from_modal_damping(freq1: f64, freq2: f64, zeta1: f64, zeta2: f64) -> Self {
        let omega1 = 2.0 * PI * freq1;
        let omega2 = 2.0 * PI * freq2;

        // Solve: ζ1 = α/(2ω1) + βω1/2
        //        ζ2 = α/(2ω2) + βω2/2
        let beta = 2.0 * (zeta2 * omega2 - zeta1 * omega1) / (omega2 * omega2 - omega1 * omega1);
        let alpha = 2.0 * zeta1 * omega1 - beta * omega1 * omega1;

        Self { alpha, beta }
    }
}
