pub mod median;

pub use median::{median, median_filter};
