//! Batched composition: `LANE_WIDTH` neighbouring pixels of a row are
//! carried through every kappa-sigma or auto-adaptive pass together, so
//! the per-frame inner loops run over fixed-size arrays and vectorize.
//!
//! Every lane performs exactly the operations of the scalar reference in
//! the same order; pixels past the last full batch use the reference
//! directly.

use crate::config::{CompositionConfig, ProcessingMethod};
use crate::consts::LANE_WIDTH;
use crate::error::Result;
use crate::sample::{Sample, SampleKind};

use super::adaptive::{weight, AutoAdaptiveParams};
use super::composer::{
    compose_pixel, method_name, ComposeOutcome, Declined, RowComposer, RowFrames, RowStack,
};
use super::kappa_sigma::{included, KappaSigmaParams};

type Lanes = [f64; LANE_WIDTH];

/// Accelerated composer for kappa-sigma and auto-adaptive stacks of
/// 16-bit, 32-bit integer or 32-bit float samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct LaneComposer;

impl RowComposer for LaneComposer {
    fn name(&self) -> &str {
        "Lanes"
    }

    fn supports(&self, kind: SampleKind, config: &CompositionConfig) -> std::result::Result<(), Declined> {
        if config.homogenize {
            return Err(Declined::Homogenization);
        }
        match config.method {
            ProcessingMethod::KappaSigma(_) | ProcessingMethod::AutoAdaptive(_) => {}
            ref other => return Err(Declined::Method(method_name(other))),
        }
        match kind {
            SampleKind::U16 | SampleKind::U32 | SampleKind::F32 => Ok(()),
            other => Err(Declined::SampleType(other)),
        }
    }

    fn compose_row(
        &self,
        rows: &RowStack<'_>,
        config: &CompositionConfig,
        out: &mut [f32],
    ) -> Result<ComposeOutcome> {
        rows.validate(out)?;
        if let Err(reason) = self.supports(rows.frames.kind(), config) {
            return Ok(ComposeOutcome::NotHandled(reason));
        }
        match rows.frames {
            RowFrames::U16(ref frames) => compose_lanes(frames, rows.width, &config.method, out),
            RowFrames::U32(ref frames) => compose_lanes(frames, rows.width, &config.method, out),
            RowFrames::F32(ref frames) => compose_lanes(frames, rows.width, &config.method, out),
            _ => return Ok(ComposeOutcome::NotHandled(Declined::SampleType(rows.frames.kind()))),
        }
        Ok(ComposeOutcome::Handled)
    }
}

fn compose_lanes<T: Sample>(
    frames: &[&[T]],
    width: usize,
    method: &ProcessingMethod,
    out: &mut [f32],
) {
    let mut values = vec![0.0f64; frames.len()];
    let full = width / LANE_WIDTH * LANE_WIDTH;

    for (c, out) in out.chunks_mut(width).enumerate() {
        let offset = c * width;
        for start in (0..full).step_by(LANE_WIDTH) {
            let means = match method {
                ProcessingMethod::KappaSigma(params) => kappa_sigma_lanes(frames, offset + start, params),
                ProcessingMethod::AutoAdaptive(params) => auto_adaptive_lanes(frames, offset + start, params),
                _ => std::array::from_fn(|lane| {
                    compose_pixel(frames, offset + start + lane, method, &mut values)
                }),
            };
            for (o, m) in out[start..start + LANE_WIDTH].iter_mut().zip(means) {
                *o = m as f32;
            }
        }
        // Rest of the row
        for x in full..width {
            out[x] = compose_pixel(frames, offset + x, method, &mut values) as f32;
        }
    }
}

#[inline]
fn load<T: Sample>(frame: &[T], start: usize) -> Lanes {
    let samples = &frame[start..start + LANE_WIDTH];
    std::array::from_fn(|lane| samples[lane].to_f64_lossy())
}

fn kappa_sigma_lanes<T: Sample>(frames: &[&[T]], start: usize, params: &KappaSigmaParams) -> Lanes {
    let total = frames.len();
    let mut lower: Lanes = [1.0; LANE_WIDTH];
    let mut upper: Lanes = [T::max_f64(); LANE_WIDTH];
    let mut mean: Lanes = [0.0; LANE_WIDTH];
    let mut done = [false; LANE_WIDTH];

    for _ in 0..params.iterations {
        let mut sum: Lanes = [0.0; LANE_WIDTH];
        let mut sum_sq: Lanes = [0.0; LANE_WIDTH];
        let mut n = [0usize; LANE_WIDTH];

        for frame in frames {
            let v = load(frame, start);
            for lane in 0..LANE_WIDTH {
                let inside = included(v[lane], lower[lane], upper[lane]);
                let kept = if inside { v[lane] } else { 0.0 };
                sum[lane] += kept;
                sum_sq[lane] += kept * kept;
                n[lane] += inside as usize;
            }
        }

        for lane in 0..LANE_WIDTH {
            if done[lane] {
                continue;
            }
            let count = n[lane];
            mean[lane] = if count == 0 { 0.0 } else { sum[lane] / count as f64 };
            if count == 0 || count == total {
                done[lane] = true;
                continue;
            }
            let sigma = (sum_sq[lane] / count as f64 - mean[lane] * mean[lane])
                .max(0.0)
                .sqrt();
            lower[lane] = mean[lane] - params.kappa * sigma;
            upper[lane] = mean[lane] + params.kappa * sigma;
        }

        if done.iter().all(|&d| d) {
            break;
        }
    }

    mean
}

fn auto_adaptive_lanes<T: Sample>(frames: &[&[T]], start: usize, params: &AutoAdaptiveParams) -> Lanes {
    let n = frames.len() as f64;

    let mut sum: Lanes = [0.0; LANE_WIDTH];
    for frame in frames {
        let v = load(frame, start);
        for lane in 0..LANE_WIDTH {
            sum[lane] += v[lane];
        }
    }
    let mut mean: Lanes = std::array::from_fn(|lane| sum[lane] / n);

    for _ in 0..params.iterations {
        let mut s: Lanes = [0.0; LANE_WIDTH];
        for frame in frames {
            let v = load(frame, start);
            for lane in 0..LANE_WIDTH {
                let d = v[lane] - mean[lane];
                s[lane] += d * d;
            }
        }
        let sigma_sq: Lanes = std::array::from_fn(|lane| s[lane] / n);

        let mut weights: Lanes = [0.0; LANE_WIDTH];
        let mut weighted: Lanes = [0.0; LANE_WIDTH];
        for frame in frames {
            let v = load(frame, start);
            for lane in 0..LANE_WIDTH {
                let w = weight(sigma_sq[lane], v[lane] - mean[lane]);
                weights[lane] += w;
                weighted[lane] += v[lane] * w;
            }
        }
        mean = std::array::from_fn(|lane| weighted[lane] / weights[lane]);
    }

    mean
}
