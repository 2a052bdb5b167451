#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use skystack_core::frame::{ChannelLayout, Image};
use skystack_core::progress::ProgressSink;
use skystack_core::sample::Sample;

/// Gray image whose pixel `(x, y)` is `f(x, y)`.
pub fn gray_image<T: Sample>(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> T) -> Image<T> {
    let mut image = Image::zeros(w, h, ChannelLayout::Gray);
    for y in 0..h {
        for x in 0..w {
            image.set(x, y, 0, f(x, y));
        }
    }
    image
}

/// RGB image whose pixel `(x, y)` is `f(x, y)`.
pub fn rgb_image<T: Sample>(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> [T; 3]) -> Image<T> {
    let mut image = Image::zeros(w, h, ChannelLayout::Rgb);
    for y in 0..h {
        for x in 0..w {
            for (c, v) in f(x, y).into_iter().enumerate() {
                image.set(x, y, c, v);
            }
        }
    }
    image
}

/// Gray frames of constant value, one per entry in `values`.
pub fn constant_frames<T: Sample>(w: usize, h: usize, values: &[T]) -> Vec<Image<T>> {
    values
        .iter()
        .map(|&v| Image::filled(w, h, ChannelLayout::Gray, v))
        .collect()
}

/// Reproducible RGB 16-bit frames around a common signal, with noise and
/// occasional hot pixels and dropouts.
pub fn noisy_rgb_frames(w: usize, h: usize, count: usize, seed: u64) -> Vec<Image<u16>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let signal: Vec<u16> = (0..w * h * 3).map(|_| rng.random_range(500..20_000)).collect();
    (0..count)
        .map(|_| {
            rgb_image(w, h, |x, y| {
                std::array::from_fn(|c| {
                    let base = signal[(y * w + x) * 3 + c] as i32;
                    let roll: u32 = rng.random_range(0..100);
                    let v = match roll {
                        0 => 65_535,
                        1 => 0,
                        _ => base + rng.random_range(-300..=300),
                    };
                    v.clamp(0, 65_535) as u16
                })
            })
        })
        .collect()
}

/// Everything a progress sink was told, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Begin(usize),
    Advance(usize),
    End,
    Workers(usize),
}

#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Check the begin/advance/end protocol of a single pass over `total` steps.
    pub fn assert_single_pass(&self, total: usize) {
        let events = self.events();
        assert!(events.contains(&ProgressEvent::Begin(total)), "{events:?}");
        assert_eq!(events.iter().filter(|e| **e == ProgressEvent::End).count(), 1);
        assert_eq!(events.last(), Some(&ProgressEvent::Workers(1)));
        let steps: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Advance(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert!(steps.windows(2).all(|w| w[0] <= w[1]), "{steps:?}");
        assert!(steps.iter().all(|&s| s <= total));
    }
}

impl ProgressSink for RecordingProgress {
    fn begin(&self, total_steps: usize) {
        self.events.lock().unwrap().push(ProgressEvent::Begin(total_steps));
    }

    fn advance(&self, step: usize) {
        self.events.lock().unwrap().push(ProgressEvent::Advance(step));
    }

    fn end(&self) {
        self.events.lock().unwrap().push(ProgressEvent::End);
    }

    fn set_workers(&self, workers: usize) {
        self.events.lock().unwrap().push(ProgressEvent::Workers(workers));
    }
}
