use rayon::prelude::*;
use tracing::debug;

use crate::color::cfa::CfaPattern;
use crate::consts::MEDIAN_ROW_BLOCK;
use crate::error::{Result, SkystackError};
use crate::frame::{AnyImage, Image};
use crate::progress::{ProgressGate, ProgressSink};
use crate::sample::Sample;
use crate::with_image;

/// Median filter `input` into `output` with a `(2 * radius + 1)` square window.
///
/// The window is clipped at the image border. With a CFA pattern only
/// photosites of the center's Bayer color take part. Each channel is
/// filtered on its own.
pub fn median_filter<T: Sample>(
    input: &Image<T>,
    radius: usize,
    cfa: Option<CfaPattern>,
    output: &mut Image<T>,
    progress: &dyn ProgressSink,
) -> Result<()> {
    if !input.same_shape(output) {
        return Err(SkystackError::OutputShapeMismatch {
            width: input.width(),
            height: input.height(),
            channels: input.channels(),
            got_width: output.width(),
            got_height: output.height(),
            got_channels: output.channels(),
        });
    }
    let (w, h) = (input.width(), input.height());
    let row_len = input.row_len();
    if row_len == 0 || h == 0 {
        return Ok(());
    }

    let gate = ProgressGate::begin(progress, h);
    let window = (2 * radius + 1) * (2 * radius + 1);
    output
        .samples_mut()
        .par_chunks_mut(MEDIAN_ROW_BLOCK * row_len)
        .enumerate()
        .for_each_init(
            || Vec::with_capacity(window),
            |values, (block, out_rows)| {
                let first_row = block * MEDIAN_ROW_BLOCK;
                for (i, out_row) in out_rows.chunks_mut(row_len).enumerate() {
                    let row = first_row + i;
                    for (c, out) in out_row.chunks_mut(w).enumerate() {
                        filter_row(input, c, row, radius, cfa, values, out);
                    }
                }
                gate.record(out_rows.len() / row_len);
            },
        );
    gate.finish();

    debug!(width = w, height = h, radius, cfa = ?cfa, "Median filter applied");
    Ok(())
}

fn filter_row<T: Sample>(
    input: &Image<T>,
    channel: usize,
    row: usize,
    radius: usize,
    cfa: Option<CfaPattern>,
    values: &mut Vec<T>,
    out: &mut [T],
) {
    let (w, h) = (input.width(), input.height());
    let y_min = row.saturating_sub(radius);
    let y_max = (row + radius).min(h - 1);

    for (col, out) in out.iter_mut().enumerate() {
        let x_min = col.saturating_sub(radius);
        let x_max = (col + radius).min(w - 1);
        values.clear();
        match cfa {
            Some(pattern) => {
                let color = pattern.color_at(col, row);
                for y in y_min..=y_max {
                    let line = input.channel_row(y, channel);
                    for x in x_min..=x_max {
                        if pattern.color_at(x, y) == color {
                            values.push(line[x]);
                        }
                    }
                }
            }
            None => {
                for y in y_min..=y_max {
                    values.extend_from_slice(&input.channel_row(y, channel)[x_min..=x_max]);
                }
            }
        }
        *out = median(values);
    }
}

/// Median of `values`; the mean of the two central elements for even counts.
///
/// Reorders `values`. Returns zero for an empty slice.
pub fn median<T: Sample>(values: &mut [T]) -> T {
    let n = values.len();
    if n == 0 {
        return T::zero();
    }
    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, T::total_cmp_sample);
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }
    let lower_max = lower
        .iter()
        .copied()
        .max_by(T::total_cmp_sample)
        .unwrap_or(upper);
    T::from_f64_saturating((lower_max.to_f64_lossy() + upper.to_f64_lossy()) / 2.0)
}

impl AnyImage {
    /// Median filtered copy of this image, same sample type.
    pub fn median_filtered(
        &self,
        radius: usize,
        cfa: Option<CfaPattern>,
        progress: &dyn ProgressSink,
    ) -> Result<AnyImage> {
        with_image!(self, img => {
            let mut out = Image::zeros(img.width(), img.height(), img.layout());
            median_filter(img, radius, cfa, &mut out, progress)?;
            Ok(AnyImage::from(out))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_and_even_medians() {
        assert_eq!(median(&mut [5u16, 1, 3]), 3);
        assert_eq!(median(&mut [4u16, 1, 3, 2]), 2);
        assert_eq!(median(&mut [4.0f32, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median::<u8>(&mut []), 0);
    }

    #[test]
    fn even_median_of_large_integers_does_not_overflow() {
        assert_eq!(median(&mut [u32::MAX, u32::MAX - 2]), u32::MAX - 1);
    }
}
