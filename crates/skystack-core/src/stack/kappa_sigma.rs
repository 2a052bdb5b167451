use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ITERATIONS, DEFAULT_KAPPA};
use crate::error::{Result, SkystackError};

/// Parameters for kappa-sigma clipping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KappaSigmaParams {
    /// Values beyond mean +/- kappa * sigma are rejected (default: 2.0).
    pub kappa: f64,
    /// Maximum number of rejection passes (default: 5).
    pub iterations: usize,
}

impl Default for KappaSigmaParams {
    fn default() -> Self {
        Self {
            kappa: DEFAULT_KAPPA,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KappaSigmaParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.kappa.is_finite() && self.kappa > 0.0) {
            return Err(SkystackError::InvalidParameter(format!(
                "kappa must be positive, got {}",
                self.kappa
            )));
        }
        if self.iterations == 0 {
            return Err(SkystackError::InvalidParameter(
                "kappa-sigma needs at least one iteration".into(),
            ));
        }
        Ok(())
    }
}

/// Whether a sample takes part in the current kappa-sigma pass.
///
/// Zero means "no data" and never takes part.
#[inline]
pub(crate) fn included(v: f64, lower: f64, upper: f64) -> bool {
    v != 0.0 && v >= lower && v <= upper
}

/// Kappa-sigma clipped mean of one pixel's samples.
///
/// Bounds start at `[1, max_value]`. Each pass takes the mean and sigma of
/// the samples inside the bounds and moves the bounds to
/// `mean +/- kappa * sigma`. Iteration stops as soon as a pass keeps no
/// sample or keeps every frame, so further passes never change a converged
/// mean. No sample left gives 0.
pub fn kappa_sigma(values: &[f64], params: &KappaSigmaParams, max_value: f64) -> f64 {
    let total = values.len();
    let mut lower = 1.0;
    let mut upper = max_value;
    let mut mean = 0.0;

    for _ in 0..params.iterations {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut n = 0usize;
        for &v in values {
            let kept = if included(v, lower, upper) { v } else { 0.0 };
            sum += kept;
            sum_sq += kept * kept;
            n += included(v, lower, upper) as usize;
        }

        mean = if n == 0 { 0.0 } else { sum / n as f64 };
        if n == 0 || n == total {
            break;
        }
        let sigma = (sum_sq / n as f64 - mean * mean).max(0.0).sqrt();
        lower = mean - params.kappa * sigma;
        upper = mean + params.kappa * sigma;
    }

    mean
}
