use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, SkystackError};
use crate::frame::Image;
use crate::progress::ProgressSink;
use crate::sample::Sample;
use crate::source::PixelSource;

use super::histogram::ChannelHistograms;
use super::interpolation::{LinearInterpolation, RationalInterpolation};

/// How the reference frame's target background is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundCalibrationMode {
    /// Each channel keeps its own background as target.
    #[default]
    PerChannel,
    /// One background shared by all channels.
    Rgb(RgbBackgroundMethod),
}

/// Reduction used to pick the shared RGB background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RgbBackgroundMethod {
    Maximum,
    Minimum,
    #[default]
    Median,
}

/// Curve shape used when remapping intensities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationInterpolation {
    #[default]
    Rational,
    Linear,
}

/// Background (median) and maximum per channel, in working units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundStats {
    pub background: [f64; 3],
    pub maximum: [f64; 3],
}

impl BackgroundStats {
    /// Derive background and maximum from prebuilt histograms.
    ///
    /// Both values are bucket levels divided by `multiplier`.
    pub fn from_histograms(histograms: &ChannelHistograms, multiplier: f64) -> Self {
        let pixel_count = histograms.red.total();
        let mut background = [0.0; 3];
        let mut maximum = [0.0; 3];
        for c in 0..3 {
            let h = histograms.channel(c);
            background[c] = h.median_index(pixel_count) as f64 / multiplier;
            maximum[c] = h.max_index() as f64 / multiplier;
        }
        Self {
            background,
            maximum,
        }
    }

    /// Histogram `source` and derive its statistics.
    pub fn measure<S: PixelSource + ?Sized>(
        source: &S,
        multiplier: f64,
        progress: &dyn ProgressSink,
    ) -> Result<Self> {
        check_multiplier(multiplier)?;
        let histograms = ChannelHistograms::build(source, multiplier, progress);
        let stats = Self::from_histograms(&histograms, multiplier);
        info!(
            red = stats.background[0],
            green = stats.background[1],
            blue = stats.background[2],
            "Background calibration: median"
        );
        Ok(stats)
    }
}

fn check_multiplier(multiplier: f64) -> Result<()> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(SkystackError::InvalidParameter(format!(
            "histogram multiplier must be positive, got {multiplier}"
        )))
    }
}

/// Target backgrounds fixed by the reference frame of a stacking session.
///
/// Computed once and handed to every later [`BackgroundCalibration::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionCalibration {
    pub target_background: [f64; 3],
}

impl SessionCalibration {
    pub fn from_reference(reference: &BackgroundStats, mode: BackgroundCalibrationMode) -> Self {
        let bk = reference.background;
        let target_background = match mode {
            BackgroundCalibrationMode::PerChannel => bk,
            BackgroundCalibrationMode::Rgb(method) => {
                let shared = match method {
                    RgbBackgroundMethod::Maximum => bk[0].max(bk[1]).max(bk[2]),
                    RgbBackgroundMethod::Minimum => bk[0].min(bk[1]).min(bk[2]),
                    RgbBackgroundMethod::Median => median3(bk[0], bk[1], bk[2]),
                };
                // Channels without enough range above the shared level keep their own.
                std::array::from_fn(|c| {
                    if reference.maximum[c] > shared {
                        shared
                    } else {
                        bk[c]
                    }
                })
            }
        };
        info!(
            red = target_background[0],
            green = target_background[1],
            blue = target_background[2],
            "Target background"
        );
        Self { target_background }
    }
}

fn median3(a: f64, b: f64, c: f64) -> f64 {
    a.max(b).min(a.min(b).max(c))
}

/// Calibration curve of one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationCurve {
    pub source_background: f64,
    pub source_max: f64,
    pub target_background: f64,
    pub target_max: f64,
    rational: RationalInterpolation,
    linear: LinearInterpolation,
}

impl CalibrationCurve {
    pub fn new(source_background: f64, source_max: f64, target_background: f64) -> Self {
        // The maximum is preserved, so target_max == source_max.
        let source_max = source_max.max(source_background);
        let target_background = target_background.min(source_max);
        let x = [0.0, source_background, source_max];
        let y = [0.0, target_background, source_max];
        Self {
            source_background,
            source_max,
            target_background,
            target_max: source_max,
            rational: RationalInterpolation::new(x, y),
            linear: LinearInterpolation::new(x, y),
        }
    }

    /// Range-based (rational) mapping.
    pub fn rational(&self, v: f64) -> f64 {
        self.rational.interpolate(v)
    }

    /// Piecewise linear mapping.
    pub fn linear(&self, v: f64) -> f64 {
        self.linear.interpolate(v)
    }

    pub fn map(&self, v: f64, interpolation: CalibrationInterpolation) -> f64 {
        match interpolation {
            CalibrationInterpolation::Rational => self.rational(v),
            CalibrationInterpolation::Linear => self.linear(v),
        }
    }
}

/// Per-channel remapping that brings a frame's background to the session target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundCalibration {
    curves: [CalibrationCurve; 3],
    interpolation: CalibrationInterpolation,
}

impl BackgroundCalibration {
    pub fn new(
        stats: &BackgroundStats,
        session: &SessionCalibration,
        interpolation: CalibrationInterpolation,
    ) -> Self {
        let curves = std::array::from_fn(|c| {
            CalibrationCurve::new(
                stats.background[c],
                stats.maximum[c],
                session.target_background[c],
            )
        });
        Self {
            curves,
            interpolation,
        }
    }

    pub fn curve(&self, channel: usize) -> &CalibrationCurve {
        &self.curves[channel]
    }

    pub fn interpolation(&self) -> CalibrationInterpolation {
        self.interpolation
    }

    #[inline]
    pub fn calibrate(&self, channel: usize, value: f64) -> f64 {
        self.curves[channel].map(value, self.interpolation)
    }

    /// Remap every sample of `image` through its channel's curve.
    ///
    /// Gray images use the red curve.
    pub fn apply<T: Sample>(&self, image: &mut Image<T>) {
        let (w, h) = (image.width(), image.height());
        let channels = image.channels();
        let row_len = image.row_len();
        let calibrate_row = |row: &mut [T]| {
            for (c, run) in row.chunks_mut(w).enumerate().take(channels) {
                let curve = &self.curves[c];
                for v in run.iter_mut() {
                    *v = T::from_f64_saturating(curve.map(v.to_f64_lossy(), self.interpolation));
                }
            }
        };
        if row_len == 0 {
            return;
        }
        if w * h >= PARALLEL_PIXEL_THRESHOLD {
            image
                .samples_mut()
                .par_chunks_mut(row_len)
                .for_each(calibrate_row);
        } else {
            image.samples_mut().chunks_mut(row_len).for_each(calibrate_row);
        }
        debug!(width = w, height = h, "Background calibration applied");
    }
}
