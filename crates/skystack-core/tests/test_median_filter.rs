mod common;

use common::{gray_image, rgb_image, RecordingProgress};
use skystack_core::color::cfa::{BayerColor, CfaPattern};
use skystack_core::error::SkystackError;
use skystack_core::filters::{median, median_filter};
use skystack_core::frame::{AnyImage, ChannelLayout, Image};
use skystack_core::progress::NoProgress;
use skystack_core::sample::SampleKind;

fn filtered<T: skystack_core::sample::Sample>(
    input: &Image<T>,
    radius: usize,
    cfa: Option<CfaPattern>,
) -> Image<T> {
    let mut out = Image::zeros(input.width(), input.height(), input.layout());
    median_filter(input, radius, cfa, &mut out, &NoProgress).unwrap();
    out
}

fn mosaic(w: usize, h: usize, pattern: CfaPattern) -> Image<u16> {
    gray_image(w, h, |x, y| match pattern.color_at(x, y) {
        BayerColor::Red => 100,
        BayerColor::Green => 200,
        BayerColor::Blue => 300,
    })
}

#[test]
fn test_uniform_image_is_unchanged() {
    let image = Image::filled(17, 9, ChannelLayout::Rgb, 42u16);
    for radius in [0, 1, 2, 5] {
        assert_eq!(filtered(&image, radius, None).samples(), image.samples());
        assert_eq!(
            filtered(&image, radius, Some(CfaPattern::GBRG)).samples(),
            image.samples()
        );
    }
}

#[test]
fn test_radius_zero_is_identity() {
    let image = gray_image(6, 5, |x, y| (x * 13 + y * 101) as u16);
    assert_eq!(filtered(&image, 0, None).samples(), image.samples());
}

#[test]
fn test_hot_pixel_removed() {
    let image = gray_image(5, 5, |x, y| if (x, y) == (2, 2) { 1000u16 } else { 10 });
    let out = filtered(&image, 1, None);
    assert!(out.samples().iter().all(|&v| v == 10));
}

#[test]
fn test_border_window_is_clipped() {
    let image = gray_image(3, 1, |x, _| [1u16, 5, 9][x]);
    let out = filtered(&image, 1, None);
    // Two samples at each border: mean of the central pair.
    assert_eq!(out.samples(), &[3, 5, 7]);

    let floats = gray_image(3, 1, |x, _| [1.0f32, 4.0, 9.0][x]);
    let out = filtered(&floats, 1, None);
    assert_eq!(out.samples(), &[2.5, 4.0, 6.5]);
}

#[test]
fn test_cfa_keeps_colors_apart() {
    for pattern in [CfaPattern::RGGB, CfaPattern::GRBG, CfaPattern::GBRG, CfaPattern::BGGR] {
        let image = mosaic(8, 6, pattern);
        let out = filtered(&image, 1, Some(pattern));
        assert_eq!(out.samples(), image.samples(), "{pattern:?}");
    }

    // Without the pattern, the blue site of an RGGB cell is outvoted.
    let image = mosaic(4, 4, CfaPattern::RGGB);
    let out = filtered(&image, 1, None);
    assert_eq!(out.get(1, 1, 0), 200);
}

#[test]
fn test_cfa_removes_hot_photosite() {
    let mut image = mosaic(10, 10, CfaPattern::RGGB);
    image.set(4, 4, 0, 60_000); // red site
    let out = filtered(&image, 2, Some(CfaPattern::RGGB));
    assert_eq!(out.get(4, 4, 0), 100);
    assert_eq!(out.get(5, 4, 0), 200);
}

#[test]
fn test_channels_filtered_separately() {
    let image = rgb_image(5, 5, |x, y| {
        let spike = (x, y) == (2, 2);
        [if spike { 250u8 } else { 1 }, 2, if spike { 0 } else { 3 }]
    });
    let out = filtered(&image, 1, None);
    assert!(out.plane(0).iter().all(|&v| v == 1));
    assert!(out.plane(1).iter().all(|&v| v == 2));
    assert!(out.plane(2).iter().all(|&v| v == 3));
}

#[test]
fn test_tall_image_spans_row_blocks() {
    let image = gray_image(7, 103, |x, y| ((x + y) % 4) as u32 * 1000);
    let out = filtered(&image, 1, None);
    // Compare against a direct per-pixel evaluation.
    for y in 0..103usize {
        for x in 0..7usize {
            let mut values = Vec::new();
            for yy in y.saturating_sub(1)..=(y + 1).min(102) {
                for xx in x.saturating_sub(1)..=(x + 1).min(6) {
                    values.push(image.get(xx, yy, 0));
                }
            }
            assert_eq!(out.get(x, y, 0), median(&mut values), "({x}, {y})");
        }
    }
}

#[test]
fn test_output_shape_mismatch() {
    let image = gray_image(4, 4, |_, _| 1u16);
    let mut out = Image::zeros(4, 3, ChannelLayout::Gray);
    let err = median_filter(&image, 1, None, &mut out, &NoProgress).unwrap_err();
    assert!(matches!(err, SkystackError::OutputShapeMismatch { .. }));
}

#[test]
fn test_any_image_keeps_sample_type() {
    let image = AnyImage::from(gray_image(4, 4, |x, _| x as f64));
    let out = image.median_filtered(1, None, &NoProgress).unwrap();
    assert_eq!(out.kind(), SampleKind::F64);
    assert_eq!((out.width(), out.height()), (4, 4));
}

#[test]
fn test_median_filter_progress_protocol() {
    let image = gray_image(8, 45, |x, y| (x * y) as u16);
    let mut out = Image::zeros(8, 45, ChannelLayout::Gray);
    let progress = RecordingProgress::default();
    median_filter(&image, 2, None, &mut out, &progress).unwrap();
    progress.assert_single_pass(45);
}
