use rayon::prelude::*;
use tracing::debug;

use crate::calibration::histogram::Histogram;
use crate::error::{Result, SkystackError};
use crate::progress::{ProgressGate, ProgressSink};
use crate::source::PixelSource;

/// Entropy of every tile of an image, per channel.
///
/// Values are stored row-major: tile `(x, y)` is at `x + y * tiles_x`.
#[derive(Clone, Debug, PartialEq)]
pub struct EntropyGrid {
    pub window_size: usize,
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
}

impl EntropyGrid {
    /// Edge length of a full tile.
    pub fn tile_size(&self) -> usize {
        2 * self.window_size + 1
    }

    /// Entropy triple of tile `(x, y)`.
    pub fn entropy(&self, x: usize, y: usize) -> [f64; 3] {
        let i = x + y * self.tiles_x;
        [self.red[i], self.green[i], self.blue[i]]
    }

    /// Entropy triple of the tile containing pixel `(px, py)`.
    pub fn entropy_at_pixel(&self, px: usize, py: usize) -> [f64; 3] {
        let size = self.tile_size();
        self.entropy(
            (px / size).min(self.tiles_x.saturating_sub(1)),
            (py / size).min(self.tiles_y.saturating_sub(1)),
        )
    }

    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

/// Compute the Shannon entropy of every `(2 * window_size + 1)` square tile.
///
/// The last tile row and column are clipped to the image. Work is split by
/// tile column; each task reuses its own full-range histograms.
pub fn square_entropies<S: PixelSource + ?Sized>(
    source: &S,
    window_size: usize,
    progress: &dyn ProgressSink,
) -> Result<EntropyGrid> {
    let (w, h) = (source.width(), source.height());
    if w == 0 || h == 0 {
        return Err(SkystackError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    let size = 2 * window_size + 1;
    let tiles_x = w.div_ceil(size);
    let tiles_y = h.div_ceil(size);

    let gate = ProgressGate::begin(progress, tiles_x);
    let columns: Vec<Vec<[f64; 3]>> = (0..tiles_x)
        .into_par_iter()
        .map_init(TileScratch::new, |scratch, tx| {
            let min_x = tx * size;
            let max_x = ((tx + 1) * size).min(w);
            let column = (0..tiles_y)
                .map(|ty| {
                    let min_y = ty * size;
                    let max_y = ((ty + 1) * size).min(h);
                    scratch.tile_entropy(source, min_x..max_x, min_y..max_y)
                })
                .collect();
            gate.record(1);
            column
        })
        .collect();
    gate.finish();

    let n = tiles_x * tiles_y;
    let mut grid = EntropyGrid {
        window_size,
        tiles_x,
        tiles_y,
        red: vec![0.0; n],
        green: vec![0.0; n],
        blue: vec![0.0; n],
    };
    for (tx, column) in columns.into_iter().enumerate() {
        for (ty, [r, g, b]) in column.into_iter().enumerate() {
            let i = tx + ty * tiles_x;
            grid.red[i] = r;
            grid.green[i] = g;
            grid.blue[i] = b;
        }
    }

    debug!(tiles_x, tiles_y, window_size, "Square entropies computed");
    Ok(grid)
}

/// Per-task histograms and the levels seen in the current tile.
struct TileScratch {
    histograms: [Histogram; 3],
    levels: [Vec<u16>; 3],
}

impl TileScratch {
    fn new() -> Self {
        Self {
            histograms: std::array::from_fn(|_| Histogram::new()),
            levels: std::array::from_fn(|_| Vec::new()),
        }
    }

    fn tile_entropy<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        xs: std::ops::Range<usize>,
        ys: std::ops::Range<usize>,
    ) -> [f64; 3] {
        for levels in &mut self.levels {
            levels.clear();
        }
        for y in ys {
            for x in xs.clone() {
                let px = source.rgb16(x, y);
                for c in 0..3 {
                    self.histograms[c].add(px[c] as usize);
                    self.levels[c].push(px[c]);
                }
            }
        }

        std::array::from_fn(|c| {
            let entropy = shannon_entropy(&self.histograms[c], &self.levels[c]);
            self.histograms[c].clear_levels(self.levels[c].iter().copied());
            entropy
        })
    }
}

/// Tile entropy in bits: every pixel adds `-p * log2(p)`, where `p` is the
/// frequency of its own level within the tile.
///
/// `levels` holds one entry per pixel of the tile.
fn shannon_entropy(histogram: &Histogram, levels: &[u16]) -> f64 {
    let n = levels.len() as f64;
    if levels.is_empty() {
        return 0.0;
    }
    let entropy: f64 = levels
        .iter()
        .map(|&level| {
            let p = histogram.count(level as usize) as f64 / n;
            -p * p.log2()
        })
        .sum();
    // A single level gives -1 * log2(1) = -0.0.
    entropy.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pixel_contributes() {
        // Four pixels at p = 1/2, each adding 1/2 bit.
        let mut h = Histogram::new();
        let levels = vec![5u16, 9, 5, 9];
        for &l in &levels {
            h.add(l as usize);
        }
        assert!((shannon_entropy(&h, &levels) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn single_level_is_zero() {
        let mut h = Histogram::new();
        let levels = vec![42u16; 9];
        for &l in &levels {
            h.add(l as usize);
        }
        assert_eq!(shannon_entropy(&h, &levels), 0.0);
    }
}
