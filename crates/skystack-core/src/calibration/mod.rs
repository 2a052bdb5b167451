pub mod background;
pub mod histogram;
pub mod interpolation;

pub use background::{
    BackgroundCalibration, BackgroundCalibrationMode, BackgroundStats, CalibrationCurve,
    CalibrationInterpolation, RgbBackgroundMethod, SessionCalibration,
};
pub use histogram::{ChannelHistograms, Histogram};
