use crate::config::{CompositionConfig, ProcessingMethod};
use crate::error::{Result, SkystackError};
use crate::sample::{Sample, SampleKind};

use super::adaptive::auto_adaptive;
use super::kappa_sigma::kappa_sigma;
use super::mean::mean;
use super::median::median_value;

/// Per-frame slices of one image row, tagged by sample type.
///
/// Every slice holds `channels` runs of `width` samples (red, green, blue).
#[derive(Clone, Debug)]
pub enum RowFrames<'a> {
    U8(Vec<&'a [u8]>),
    U16(Vec<&'a [u16]>),
    U32(Vec<&'a [u32]>),
    F32(Vec<&'a [f32]>),
    F64(Vec<&'a [f64]>),
}

/// Run `$body` with `$rows` bound to the typed slice list inside [`RowFrames`].
macro_rules! with_rows {
    ($frames:expr, $rows:ident => $body:expr) => {
        match $frames {
            $crate::stack::composer::RowFrames::U8($rows) => $body,
            $crate::stack::composer::RowFrames::U16($rows) => $body,
            $crate::stack::composer::RowFrames::U32($rows) => $body,
            $crate::stack::composer::RowFrames::F32($rows) => $body,
            $crate::stack::composer::RowFrames::F64($rows) => $body,
        }
    };
}

impl RowFrames<'_> {
    pub fn kind(&self) -> SampleKind {
        match self {
            Self::U8(_) => SampleKind::U8,
            Self::U16(_) => SampleKind::U16,
            Self::U32(_) => SampleKind::U32,
            Self::F32(_) => SampleKind::F32,
            Self::F64(_) => SampleKind::F64,
        }
    }

    pub fn len(&self) -> usize {
        with_rows!(self, rows => rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a composer needs to produce one output row.
#[derive(Clone, Debug)]
pub struct RowStack<'a> {
    pub row: usize,
    pub width: usize,
    pub channels: usize,
    /// Frame count of the stack this row belongs to.
    pub declared_frames: usize,
    pub frames: RowFrames<'a>,
}

impl RowStack<'_> {
    /// Samples in one row across all channels.
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    /// Check the row against the stack it claims to come from.
    pub fn validate(&self, out: &[f32]) -> Result<()> {
        if self.frames.is_empty() {
            return Err(SkystackError::EmptyStack);
        }
        if self.frames.len() != self.declared_frames {
            return Err(SkystackError::FrameCountMismatch {
                declared: self.declared_frames,
                supplied: self.frames.len(),
            });
        }
        let expected = self.row_len();
        with_rows!(&self.frames, rows => {
            if let Some((index, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
                return Err(SkystackError::RowLengthMismatch {
                    index,
                    expected,
                    got: r.len(),
                });
            }
        });
        if out.len() != expected {
            return Err(SkystackError::OutputRowMismatch {
                expected,
                got: out.len(),
            });
        }
        Ok(())
    }
}

/// Why a composer left a row to someone else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declined {
    SampleType(SampleKind),
    Method(&'static str),
    Homogenization,
}

impl std::fmt::Display for Declined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SampleType(kind) => write!(f, "{kind} samples not supported"),
            Self::Method(name) => write!(f, "{name} not supported"),
            Self::Homogenization => write!(f, "homogenization not supported"),
        }
    }
}

/// Result of offering a row to a composer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// The output row was written.
    Handled,
    /// The output row was not touched; another composer must process it.
    NotHandled(Declined),
}

/// A strategy that combines the frames of one row into the output row.
pub trait RowComposer: Send + Sync {
    fn name(&self) -> &str;

    /// Whether rows of `kind` can be composed with `config`.
    fn supports(&self, kind: SampleKind, config: &CompositionConfig) -> std::result::Result<(), Declined>;

    /// Compose `rows` into `out` (`channels * width` floats).
    ///
    /// Shape violations are errors; unsupported input is
    /// [`ComposeOutcome::NotHandled`].
    fn compose_row(
        &self,
        rows: &RowStack<'_>,
        config: &CompositionConfig,
        out: &mut [f32],
    ) -> Result<ComposeOutcome>;
}

pub(crate) fn method_name(method: &ProcessingMethod) -> &'static str {
    match method {
        ProcessingMethod::Average => "Average",
        ProcessingMethod::Median => "Median",
        ProcessingMethod::KappaSigma(_) => "Kappa-Sigma",
        ProcessingMethod::AutoAdaptive(_) => "Auto-Adaptive",
    }
}

/// Reference composer: one pixel at a time, every sample type and method.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarComposer;

impl RowComposer for ScalarComposer {
    fn name(&self) -> &str {
        "Scalar"
    }

    fn supports(&self, _kind: SampleKind, config: &CompositionConfig) -> std::result::Result<(), Declined> {
        if config.homogenize {
            return Err(Declined::Homogenization);
        }
        Ok(())
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
        with_rows!(&rows.frames, frames => compose_scalar(frames, &config.method, out));
        Ok(ComposeOutcome::Handled)
    }
}

fn compose_scalar<T: Sample>(frames: &[&[T]], method: &ProcessingMethod, out: &mut [f32]) {
    let mut values = vec![0.0f64; frames.len()];
    for (i, out) in out.iter_mut().enumerate() {
        *out = compose_pixel(frames, i, method, &mut values) as f32;
    }
}

/// Combine sample `index` of every frame with `method`.
pub(crate) fn compose_pixel<T: Sample>(
    frames: &[&[T]],
    index: usize,
    method: &ProcessingMethod,
    values: &mut [f64],
) -> f64 {
    for (v, frame) in values.iter_mut().zip(frames) {
        *v = frame[index].to_f64_lossy();
    }
    match method {
        ProcessingMethod::Average => mean(values),
        ProcessingMethod::Median => median_value(values),
        ProcessingMethod::KappaSigma(params) => kappa_sigma(values, params, T::max_f64()),
        ProcessingMethod::AutoAdaptive(params) => auto_adaptive(values, params),
    }
}
