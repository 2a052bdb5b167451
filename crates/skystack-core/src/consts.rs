/// Number of histogram buckets per channel (16-bit levels).
pub const HISTOGRAM_SIZE: usize = 65_536;

/// Highest histogram bucket index.
pub const HISTOGRAM_MAX_LEVEL: f64 = (HISTOGRAM_SIZE - 1) as f64;

/// Rows accumulated per histogram task.
pub const HISTOGRAM_ROW_BLOCK: usize = 10;

/// Rows filtered per median filter task.
pub const MEDIAN_ROW_BLOCK: usize = 20;

/// Rows composed per composition task.
pub const COMPOSE_ROW_BLOCK: usize = 10;

/// Pixels processed together by the batched composition path.
pub const LANE_WIDTH: usize = 16;

/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default kappa for kappa-sigma clipping.
pub const DEFAULT_KAPPA: f64 = 2.0;

/// Default number of kappa-sigma / auto-adaptive iterations.
pub const DEFAULT_ITERATIONS: usize = 5;

/// Default half-size of an entropy tile; tiles are `2 * window + 1` wide.
pub const DEFAULT_ENTROPY_WINDOW: usize = 10;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;
