use thiserror::Error;

use crate::sample::SampleKind;

#[derive(Error, Debug)]
pub enum SkystackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Unsupported channel count: {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    #[error("Empty frame stack")]
    EmptyStack,

    #[error("Frame count mismatch: stack declares {declared} frames, got {supplied} rows")]
    FrameCountMismatch { declared: usize, supplied: usize },

    #[error("Frame {index} is {got_width}x{got_height}x{got_channels}, expected {width}x{height}x{channels}")]
    FrameShapeMismatch {
        index: usize,
        width: usize,
        height: usize,
        channels: usize,
        got_width: usize,
        got_height: usize,
        got_channels: usize,
    },

    #[error("Frame {index} has sample type {got:?}, stack uses {expected:?}")]
    SampleKindMismatch {
        index: usize,
        expected: SampleKind,
        got: SampleKind,
    },

    #[error("Row of frame {index} holds {got} samples, expected {expected}")]
    RowLengthMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("Output row holds {got} samples, expected {expected}")]
    OutputRowMismatch { expected: usize, got: usize },

    #[error("Output buffer is {got_width}x{got_height}x{got_channels}, expected {width}x{height}x{channels}")]
    OutputShapeMismatch {
        width: usize,
        height: usize,
        channels: usize,
        got_width: usize,
        got_height: usize,
        got_channels: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Row {row} was not handled by any composer ({reason})")]
    Unhandled { row: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, SkystackError>;
