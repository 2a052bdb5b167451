pub mod calibration;
pub mod color;
pub mod config;
pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod progress;
pub mod quality;
pub mod sample;
pub mod source;
pub mod stack;
