//! Time-varying load histories.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A load defined as a piecewise-linear function of time.
///
/// Between samples the magnitude is interpolated linearly; outside the
/// sampled range it is held at the first or last magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadHistory {
    time: Vec<f64>,
    magnitude: Vec<f64>,
}

impl LoadHistory {
    /// Create a load history from paired samples.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidLoad`] if the sequences are empty, differ
    /// in length, contain non-finite values, or time is not strictly increasing.
    pub fn new(time: Vec<f64>, magnitude: Vec<f64>) -> Result<Self> {
        if time.is_empty() {
            return Err(ModelError::InvalidLoad("history has no samples".to_string()));
        }
        if time.len() != magnitude.len() {
            return Err(ModelError::InvalidLoad(format!(
                "{} time samples but {} magnitudes",
                time.len(),
                magnitude.len()
            )));
        }
        if time.iter().chain(magnitude.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidLoad("non-finite sample".to_string()));
        }
        if let Some(w) = time.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ModelError::InvalidLoad(format!(
                "time must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }

        Ok(Self { time, magnitude })
    }

    /// A load that holds `magnitude` for all time.
    pub fn constant(magnitude: f64) -> Self {
        Self {
            time: vec![0.0],
            magnitude: vec![magnitude],
        }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn magnitude(&self) -> &[f64] {
        &self.magnitude
    }

    /// Fully applied magnitude (last sample), used for static analysis.
    pub fn static_magnitude(&self) -> f64 {
        self.magnitude[self.magnitude.len() - 1]
    }

    /// Magnitude at time `t`.
    pub fn interpolate(&self, t: f64) -> f64 {
        let last = self.time.len() - 1;
        if t <= self.time[0] {
            return self.magnitude[0];
        }
        if t >= self.time[last] {
            return self.magnitude[last];
        }

        // First sample strictly after t; guaranteed in 1..=last here
        let upper = self.time.partition_point(|&ti| ti <= t);
        let (t0, t1) = (self.time[upper - 1], self.time[upper]);
        let (m0, m1) = (self.magnitude[upper - 1], self.magnitude[upper]);
        m0 + (m1 - m0) * (t - t0) / (t1 - t0)
    }

    /// Magnitudes at every time in `times`.
    pub fn sample(&self, times: &[f64]) -> Vec<f64> {
        times.iter().map(|&t| self.interpolate(t)).collect()
    }
}
