use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{CompositionConfig, KernelPreference};
use crate::consts::COMPOSE_ROW_BLOCK;
use crate::error::{Result, SkystackError};
use crate::frame::{AnyImage, ChannelLayout, Image};
use crate::progress::{ProgressGate, ProgressSink};
use crate::sample::SampleKind;

use super::composer::{ComposeOutcome, RowComposer, RowFrames, RowStack, ScalarComposer};
use super::lanes::LaneComposer;

/// Aligned frames of identical shape and sample type.
#[derive(Clone, Debug)]
pub enum FrameStack {
    U8(Vec<Image<u8>>),
    U16(Vec<Image<u16>>),
    U32(Vec<Image<u32>>),
    F32(Vec<Image<f32>>),
    F64(Vec<Image<f64>>),
}

macro_rules! with_frames {
    ($stack:expr, $frames:ident => $body:expr) => {
        match $stack {
            FrameStack::U8($frames) => $body,
            FrameStack::U16($frames) => $body,
            FrameStack::U32($frames) => $body,
            FrameStack::F32($frames) => $body,
            FrameStack::F64($frames) => $body,
        }
    };
}

macro_rules! unwrap_frames {
    ($frames:expr, $variant:ident, $expected:expr) => {
        $frames
            .into_iter()
            .enumerate()
            .map(|(index, frame)| match frame {
                AnyImage::$variant(image) => Ok(image),
                other => Err(SkystackError::SampleKindMismatch {
                    index,
                    expected: $expected,
                    got: other.kind(),
                }),
            })
            .collect::<Result<Vec<_>>>()
            .map(FrameStack::$variant)
    };
}

impl FrameStack {
    /// Group frames into a stack.
    ///
    /// Fails when `frames` is empty or the frames differ in sample type,
    /// dimensions or channel count.
    pub fn new(frames: Vec<AnyImage>) -> Result<Self> {
        let first = frames.first().ok_or(SkystackError::EmptyStack)?;
        let (width, height, channels) = (first.width(), first.height(), first.channels());
        let expected = first.kind();

        for (index, frame) in frames.iter().enumerate() {
            if frame.width() != width || frame.height() != height || frame.channels() != channels {
                return Err(SkystackError::FrameShapeMismatch {
                    index,
                    width,
                    height,
                    channels,
                    got_width: frame.width(),
                    got_height: frame.height(),
                    got_channels: frame.channels(),
                });
            }
        }

        match expected {
            SampleKind::U8 => unwrap_frames!(frames, U8, expected),
            SampleKind::U16 => unwrap_frames!(frames, U16, expected),
            SampleKind::U32 => unwrap_frames!(frames, U32, expected),
            SampleKind::F32 => unwrap_frames!(frames, F32, expected),
            SampleKind::F64 => unwrap_frames!(frames, F64, expected),
        }
    }

    /// Group typed images into a stack.
    pub fn from_images<I: Into<AnyImage>>(frames: Vec<I>) -> Result<Self> {
        Self::new(frames.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        with_frames!(self, frames => frames.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Self::U8(_) => SampleKind::U8,
            Self::U16(_) => SampleKind::U16,
            Self::U32(_) => SampleKind::U32,
            Self::F32(_) => SampleKind::F32,
            Self::F64(_) => SampleKind::F64,
        }
    }

    pub fn width(&self) -> usize {
        with_frames!(self, frames => frames.first().map_or(0, |f| f.width()))
    }

    pub fn height(&self) -> usize {
        with_frames!(self, frames => frames.first().map_or(0, |f| f.height()))
    }

    pub fn channels(&self) -> usize {
        with_frames!(self, frames => frames.first().map_or(1, |f| f.channels()))
    }

    pub fn layout(&self) -> ChannelLayout {
        if self.channels() == 1 {
            ChannelLayout::Gray
        } else {
            ChannelLayout::Rgb
        }
    }

    /// Slices of image row `row` across all frames.
    pub fn row_stack(&self, row: usize) -> RowStack<'_> {
        let frames = match self {
            Self::U8(f) => RowFrames::U8(f.iter().map(|i| i.row(row)).collect()),
            Self::U16(f) => RowFrames::U16(f.iter().map(|i| i.row(row)).collect()),
            Self::U32(f) => RowFrames::U32(f.iter().map(|i| i.row(row)).collect()),
            Self::F32(f) => RowFrames::F32(f.iter().map(|i| i.row(row)).collect()),
            Self::F64(f) => RowFrames::F64(f.iter().map(|i| i.row(row)).collect()),
        };
        RowStack {
            row,
            width: self.width(),
            channels: self.channels(),
            declared_frames: self.len(),
            frames,
        }
    }
}

/// Compose `stack` into a new float image using the built-in composers.
pub fn compose_stack(
    stack: &FrameStack,
    config: &CompositionConfig,
    progress: &dyn ProgressSink,
) -> Result<Image<f32>> {
    let mut output = Image::zeros(stack.width(), stack.height(), stack.layout());
    compose_stack_with(stack, config, &ScalarComposer, &mut output, progress)?;
    Ok(output)
}

/// Compose `stack` into `output`, offering each row to the lane composer
/// first and to `fallback` when the lanes decline.
///
/// A row that neither composer handles fails the call with
/// [`SkystackError::Unhandled`].
pub fn compose_stack_with(
    stack: &FrameStack,
    config: &CompositionConfig,
    fallback: &dyn RowComposer,
    output: &mut Image<f32>,
    progress: &dyn ProgressSink,
) -> Result<()> {
    config.validate()?;
    let (w, h, channels) = (stack.width(), stack.height(), stack.channels());
    if output.width() != w || output.height() != h || output.channels() != channels {
        return Err(SkystackError::OutputShapeMismatch {
            width: w,
            height: h,
            channels,
            got_width: output.width(),
            got_height: output.height(),
            got_channels: output.channels(),
        });
    }
    let row_len = output.row_len();
    if row_len == 0 || h == 0 {
        return Ok(());
    }

    let lanes = LaneComposer;
    let accelerated: Option<&dyn RowComposer> = match config.kernel {
        KernelPreference::ScalarOnly => None,
        KernelPreference::Auto => match lanes.supports(stack.kind(), config) {
            Ok(()) => Some(&lanes),
            Err(reason) => {
                debug!(%reason, "Lane composer unavailable");
                None
            }
        },
    };
    info!(
        frames = stack.len(),
        width = w,
        height = h,
        method = %config.method,
        composer = accelerated.map_or(fallback.name(), |c| c.name()),
        "Composing stack"
    );

    let gate = ProgressGate::begin(progress, h);
    let composed = output
        .samples_mut()
        .par_chunks_mut(COMPOSE_ROW_BLOCK * row_len)
        .enumerate()
        .try_for_each(|(block, out_rows)| -> Result<()> {
            let first_row = block * COMPOSE_ROW_BLOCK;
            for (i, out) in out_rows.chunks_mut(row_len).enumerate() {
                let rows = stack.row_stack(first_row + i);
                compose_row_with(&rows, config, accelerated, fallback, out)?;
            }
            gate.record(out_rows.len() / row_len);
            Ok(())
        });
    gate.finish();

    composed
}

fn compose_row_with(
    rows: &RowStack<'_>,
    config: &CompositionConfig,
    accelerated: Option<&dyn RowComposer>,
    fallback: &dyn RowComposer,
    out: &mut [f32],
) -> Result<()> {
    if let Some(composer) = accelerated {
        if composer.compose_row(rows, config, out)? == ComposeOutcome::Handled {
            return Ok(());
        }
    }
    match fallback.compose_row(rows, config, out)? {
        ComposeOutcome::Handled => Ok(()),
        ComposeOutcome::NotHandled(reason) => Err(SkystackError::Unhandled {
            row: rows.row,
            reason: reason.to_string(),
        }),
    }
}
