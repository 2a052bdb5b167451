use std::ops::AddAssign;

use rayon::prelude::*;
use tracing::debug;

use crate::consts::{HISTOGRAM_MAX_LEVEL, HISTOGRAM_ROW_BLOCK, HISTOGRAM_SIZE};
use crate::progress::{ProgressGate, ProgressSink};
use crate::source::PixelSource;

/// Bucket counts over the 16-bit level range for one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<u32>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: vec![0; HISTOGRAM_SIZE],
        }
    }

    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }

    #[inline]
    pub fn count(&self, level: usize) -> u32 {
        self.buckets[level]
    }

    #[inline]
    pub fn add(&mut self, level: usize) {
        self.buckets[level] += 1;
    }

    /// Number of samples accumulated.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|&c| c as u64).sum()
    }

    /// Highest level with a nonzero count, or 0 for an empty histogram.
    pub fn max_index(&self) -> usize {
        self.buckets.iter().rposition(|&c| c != 0).unwrap_or(0)
    }

    /// Smallest level whose cumulative count reaches `pixel_count / 2`.
    pub fn median_index(&self, pixel_count: u64) -> usize {
        let half = pixel_count / 2;
        let mut cumulative = 0u64;
        for (level, &c) in self.buckets.iter().enumerate() {
            cumulative += c as u64;
            if cumulative >= half {
                return level;
            }
        }
        HISTOGRAM_SIZE - 1
    }

    /// Reset only the given levels to zero.
    pub(crate) fn clear_levels(&mut self, levels: impl IntoIterator<Item = u16>) {
        for level in levels {
            self.buckets[level as usize] = 0;
        }
    }
}

impl AddAssign<&Histogram> for Histogram {
    fn add_assign(&mut self, rhs: &Histogram) {
        for (a, b) in self.buckets.iter_mut().zip(&rhs.buckets) {
            *a += *b;
        }
    }
}

/// Red, green and blue histograms of one image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelHistograms {
    pub red: Histogram,
    pub green: Histogram,
    pub blue: Histogram,
}

impl ChannelHistograms {
    pub fn channel(&self, channel: usize) -> &Histogram {
        match channel {
            0 => &self.red,
            1 => &self.green,
            _ => &self.blue,
        }
    }

    /// Histogram every pixel of `source`, scaling values by `multiplier`.
    ///
    /// Each sample lands in bucket `min(value * multiplier, 65535)`
    /// (truncated, negatives in bucket 0). Row blocks are accumulated into
    /// task-private histograms that are summed at the end.
    pub fn build<S: PixelSource + ?Sized>(
        source: &S,
        multiplier: f64,
        progress: &dyn ProgressSink,
    ) -> Self {
        let (w, h) = (source.width(), source.height());
        let gate = ProgressGate::begin(progress, h);

        let starts: Vec<usize> = (0..h).step_by(HISTOGRAM_ROW_BLOCK).collect();
        let result = starts
            .into_par_iter()
            .fold(ChannelHistograms::default, |mut acc, start| {
                let end = (start + HISTOGRAM_ROW_BLOCK).min(h);
                for y in start..end {
                    for x in 0..w {
                        let [r, g, b] = source.rgb(x, y);
                        acc.red.add(bucket(r, multiplier));
                        acc.green.add(bucket(g, multiplier));
                        acc.blue.add(bucket(b, multiplier));
                    }
                }
                gate.record(end - start);
                acc
            })
            .reduce(ChannelHistograms::default, |mut a, b| {
                a += &b;
                a
            });

        gate.finish();
        debug!(width = w, height = h, multiplier, "Histograms built");
        result
    }
}

impl AddAssign<&ChannelHistograms> for ChannelHistograms {
    fn add_assign(&mut self, rhs: &ChannelHistograms) {
        self.red += &rhs.red;
        self.green += &rhs.green;
        self.blue += &rhs.blue;
    }
}

#[inline]
fn bucket(value: f64, multiplier: f64) -> usize {
    // `as` maps negatives and NaN to 0.
    (value * multiplier).min(HISTOGRAM_MAX_LEVEL) as usize
}
