mod common;

use approx::assert_abs_diff_eq;
use common::{gray_image, rgb_image, RecordingProgress};
use skystack_core::error::SkystackError;
use skystack_core::frame::{ChannelLayout, Image};
use skystack_core::progress::NoProgress;
use skystack_core::quality::square_entropies;

/// Per-pixel entropy sum of a tile given the count of each level.
fn tile_entropy(counts: &[usize]) -> f64 {
    let n: usize = counts.iter().sum();
    counts
        .iter()
        .map(|&k| {
            let p = k as f64 / n as f64;
            k as f64 * -p * p.log2()
        })
        .sum()
}

#[test]
fn test_uniform_image_has_zero_entropy() {
    let image = Image::filled(50, 30, ChannelLayout::Rgb, 1234u16);
    let grid = square_entropies(&image, 10, &NoProgress).unwrap();
    assert_eq!(grid.tile_size(), 21);
    assert_eq!((grid.tiles_x, grid.tiles_y), (3, 2));
    assert_eq!(grid.len(), 6);
    for ty in 0..grid.tiles_y {
        for tx in 0..grid.tiles_x {
            assert_eq!(grid.entropy(tx, ty), [0.0; 3]);
        }
    }
}

#[test]
fn test_single_pixel_tiles() {
    let image = gray_image(5, 4, |x, y| (x * 31 + y * 7) as u16);
    let grid = square_entropies(&image, 0, &NoProgress).unwrap();
    assert_eq!((grid.tiles_x, grid.tiles_y), (5, 4));
    assert!(grid.red.iter().all(|&e| e == 0.0));
}

#[test]
fn test_distinct_levels_give_log2_count() {
    let image = gray_image(3, 3, |x, y| (y * 3 + x) as u16 * 100);
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    assert_eq!((grid.tiles_x, grid.tiles_y), (1, 1));
    assert_abs_diff_eq!(grid.entropy(0, 0)[0], 9f64.log2(), epsilon = 1e-12);
    assert_abs_diff_eq!(grid.entropy(0, 0)[0], tile_entropy(&[1; 9]), epsilon = 1e-12);
}

#[test]
fn test_repeated_levels_count_once_per_pixel() {
    // Levels 1, 1, 2, 2, 2, 3, 3, 3, 3 in a 3x3 tile.
    let levels = [1u16, 1, 2, 2, 2, 3, 3, 3, 3];
    let image = gray_image(3, 3, |x, y| levels[y * 3 + x]);
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    assert_abs_diff_eq!(grid.entropy(0, 0)[0], tile_entropy(&[2, 3, 4]), epsilon = 1e-12);
}

#[test]
fn test_two_level_tile() {
    // Top row one level, the rest another: three pixels at p = 1/3, six at 2/3.
    let image = gray_image(3, 3, |_, y| if y == 0 { 10u16 } else { 20 });
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    let expected = 3f64.log2() + 4.0 * 1.5f64.log2();
    assert_abs_diff_eq!(grid.entropy(0, 0)[0], expected, epsilon = 1e-12);
    assert_abs_diff_eq!(expected, tile_entropy(&[3, 6]), epsilon = 1e-12);
    assert_abs_diff_eq!(expected, 3.925, epsilon = 1e-3);
}

#[test]
fn test_edge_tiles_are_clipped() {
    // Second tile column holds only x = 3: three pixels with three levels.
    let image = gray_image(4, 3, |x, y| if x == 3 { (y as u16 + 1) * 1000 } else { 7 });
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    assert_eq!((grid.tiles_x, grid.tiles_y), (2, 1));
    assert_eq!(grid.entropy(0, 0)[0], 0.0);
    assert_abs_diff_eq!(grid.entropy(1, 0)[0], 3f64.log2(), epsilon = 1e-12);
    assert_eq!(grid.entropy_at_pixel(3, 2), grid.entropy(1, 0));
    assert_eq!(grid.entropy_at_pixel(2, 0), grid.entropy(0, 0));
}

#[test]
fn test_channels_are_independent() {
    let image = rgb_image(3, 3, |x, y| [5u8, if x == 0 { 1 } else { 2 }, (y * 3 + x) as u8]);
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    let [r, g, b] = grid.entropy(0, 0);
    assert_eq!(r, 0.0);
    assert_abs_diff_eq!(g, tile_entropy(&[3, 6]), epsilon = 1e-12);
    assert_abs_diff_eq!(b, 9f64.log2(), epsilon = 1e-12);
}

#[test]
fn test_scratch_reuse_across_tiles() {
    // Many tiles per column: leftovers from one tile must not leak into the next.
    let image = gray_image(9, 90, |x, y| if (y / 3) % 2 == 0 { (x % 3) as u16 } else { 500 });
    let grid = square_entropies(&image, 1, &NoProgress).unwrap();
    for ty in 0..grid.tiles_y {
        for tx in 0..grid.tiles_x {
            let e = grid.entropy(tx, ty)[0];
            if ty % 2 == 0 {
                assert_abs_diff_eq!(e, 3f64.log2(), epsilon = 1e-12);
            } else {
                assert_eq!(e, 0.0);
            }
        }
    }
}

#[test]
fn test_empty_image_is_rejected() {
    let image = Image::<u16>::zeros(0, 5, ChannelLayout::Gray);
    let err = square_entropies(&image, 2, &NoProgress).unwrap_err();
    assert!(matches!(err, SkystackError::InvalidDimensions { width: 0, height: 5 }));
}

#[test]
fn test_entropy_progress_counts_tile_columns() {
    let image = gray_image(40, 12, |x, y| (x ^ y) as u16);
    let progress = RecordingProgress::default();
    let grid = square_entropies(&image, 2, &progress).unwrap();
    progress.assert_single_pass(grid.tiles_x);
}
