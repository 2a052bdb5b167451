use crate::frame::{AnyImage, Image};
use crate::sample::Sample;
use crate::with_image;

/// Random-access read view of a gray or RGB image.
///
/// Gray sources report the same value for all three channels, so the
/// engines can always work on RGB triples.
pub trait PixelSource: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn channels(&self) -> usize;

    /// Channel values in native sample units.
    fn rgb(&self, x: usize, y: usize) -> [f64; 3];

    /// Channel values quantized to 16-bit levels.
    fn rgb16(&self, x: usize, y: usize) -> [u16; 3];

    fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }
}

impl<T: Sample> PixelSource for Image<T> {
    fn width(&self) -> usize {
        Image::width(self)
    }

    fn height(&self) -> usize {
        Image::height(self)
    }

    fn channels(&self) -> usize {
        Image::channels(self)
    }

    #[inline]
    fn rgb(&self, x: usize, y: usize) -> [f64; 3] {
        if Image::channels(self) == 1 {
            let v = self.get(x, y, 0).to_f64_lossy();
            [v, v, v]
        } else {
            [
                self.get(x, y, 0).to_f64_lossy(),
                self.get(x, y, 1).to_f64_lossy(),
                self.get(x, y, 2).to_f64_lossy(),
            ]
        }
    }

    #[inline]
    fn rgb16(&self, x: usize, y: usize) -> [u16; 3] {
        if Image::channels(self) == 1 {
            let v = self.get(x, y, 0).level16();
            [v, v, v]
        } else {
            [
                self.get(x, y, 0).level16(),
                self.get(x, y, 1).level16(),
                self.get(x, y, 2).level16(),
            ]
        }
    }
}

impl PixelSource for AnyImage {
    fn width(&self) -> usize {
        AnyImage::width(self)
    }

    fn height(&self) -> usize {
        AnyImage::height(self)
    }

    fn channels(&self) -> usize {
        AnyImage::channels(self)
    }

    fn rgb(&self, x: usize, y: usize) -> [f64; 3] {
        with_image!(self, img => img.rgb(x, y))
    }

    fn rgb16(&self, x: usize, y: usize) -> [u16; 3] {
        with_image!(self, img => img.rgb16(x, y))
    }
}
