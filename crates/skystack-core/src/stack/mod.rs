pub mod adaptive;
pub mod compose;
pub mod composer;
pub mod kappa_sigma;
pub mod lanes;
pub mod mean;
pub mod median;

pub use adaptive::{auto_adaptive, AutoAdaptiveParams};
pub use compose::{compose_stack, compose_stack_with, FrameStack};
pub use composer::{ComposeOutcome, Declined, RowComposer, RowFrames, RowStack, ScalarComposer};
pub use kappa_sigma::{kappa_sigma, KappaSigmaParams};
pub use lanes::LaneComposer;
pub use mean::mean;
pub use median::median_value;
