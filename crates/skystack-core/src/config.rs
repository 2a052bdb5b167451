use serde::{Deserialize, Serialize};

use crate::calibration::{BackgroundCalibrationMode, CalibrationInterpolation};
use crate::color::cfa::CfaPattern;
use crate::consts::DEFAULT_ENTROPY_WINDOW;
use crate::error::{Result, SkystackError};
use crate::stack::adaptive::AutoAdaptiveParams;
use crate::stack::kappa_sigma::KappaSigmaParams;

/// Settings for a complete stacking run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StackConfig {
    /// Background calibration against the first frame; `None` disables it.
    #[serde(default)]
    pub calibration: Option<CalibrationConfig>,
    /// Median pre-filter applied to every frame; `None` disables it.
    #[serde(default)]
    pub median_filter: Option<MedianFilterConfig>,
    #[serde(default)]
    pub composition: CompositionConfig,
    #[serde(default)]
    pub entropy: EntropyConfig,
}

impl StackConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref calibration) = self.calibration {
            calibration.validate()?;
        }
        self.composition.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub interpolation: CalibrationInterpolation,
    /// Scale from sample units to histogram levels (1.0 for 16-bit data).
    pub multiplier: f64,
    pub mode: BackgroundCalibrationMode,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            interpolation: CalibrationInterpolation::default(),
            multiplier: 1.0,
            mode: BackgroundCalibrationMode::default(),
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            return Err(SkystackError::InvalidParameter(format!(
                "histogram multiplier must be positive, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedianFilterConfig {
    pub radius: usize,
    #[serde(default)]
    pub cfa: Option<CfaPattern>,
}

impl Default for MedianFilterConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            cfa: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntropyConfig {
    /// Tiles are `2 * window_size + 1` pixels wide.
    pub window_size: usize,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_ENTROPY_WINDOW,
        }
    }
}

/// Per-pixel combination method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProcessingMethod {
    Average,
    Median,
    KappaSigma(KappaSigmaParams),
    AutoAdaptive(AutoAdaptiveParams),
}

impl Default for ProcessingMethod {
    fn default() -> Self {
        Self::KappaSigma(KappaSigmaParams::default())
    }
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Average => write!(f, "Average"),
            Self::Median => write!(f, "Median"),
            Self::KappaSigma(p) => write!(f, "Kappa-Sigma (kappa={}, iterations={})", p.kappa, p.iterations),
            Self::AutoAdaptive(p) => write!(f, "Auto-Adaptive (iterations={})", p.iterations),
        }
    }
}

/// Which row composers the engine may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelPreference {
    /// Use the batched lane path when it supports the stack.
    #[default]
    Auto,
    /// Only the scalar reference path.
    ScalarOnly,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Request frame homogenization; neither built-in composer provides it.
    #[serde(default)]
    pub homogenize: bool,
    #[serde(default)]
    pub kernel: KernelPreference,
    pub method: ProcessingMethod,
}

impl CompositionConfig {
    pub fn validate(&self) -> Result<()> {
        match self.method {
            ProcessingMethod::KappaSigma(ref p) => p.validate(),
            ProcessingMethod::AutoAdaptive(ref p) => p.validate(),
            ProcessingMethod::Average | ProcessingMethod::Median => Ok(()),
        }
    }
}
