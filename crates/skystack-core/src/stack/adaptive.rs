use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ITERATIONS;
use crate::error::{Result, SkystackError};

/// Parameters for the auto-adaptive weighted average.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoAdaptiveParams {
    /// Number of reweighting passes (default: 5).
    pub iterations: usize,
}

impl Default for AutoAdaptiveParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl AutoAdaptiveParams {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SkystackError::InvalidParameter(
                "auto-adaptive weighting needs at least one iteration".into(),
            ));
        }
        Ok(())
    }
}

/// Weight of a sample at distance `d` from the mean, given variance `sigma_sq`.
///
/// `sigma² / (sigma² + d²)`, or 1 when both are zero.
#[inline]
pub(crate) fn weight(sigma_sq: f64, d: f64) -> f64 {
    let denominator = sigma_sq + d * d;
    if denominator == 0.0 {
        1.0
    } else {
        sigma_sq / denominator
    }
}

/// Auto-adaptive weighted mean of one pixel's samples.
///
/// Starts from the plain mean; every pass recomputes the variance around
/// the current mean and reweights each sample by `sigma² / (sigma² + d²)`.
/// An empty slice gives 0.
pub fn auto_adaptive(values: &[f64], params: &AutoAdaptiveParams) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mut sum = 0.0;
    for &v in values {
        sum += v;
    }
    let mut mean = sum / n;

    for _ in 0..params.iterations {
        let mut s = 0.0;
        for &v in values {
            let d = v - mean;
            s += d * d;
        }
        let sigma_sq = s / n;

        let mut weights = 0.0;
        let mut weighted = 0.0;
        for &v in values {
            let w = weight(sigma_sq, v - mean);
            weights += w;
            weighted += v * w;
        }
        // At least one weight is positive, so `weights` cannot be zero.
        mean = weighted / weights;
    }

    mean
}
