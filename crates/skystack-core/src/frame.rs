use ndarray::{Array3, ArrayView2, ArrayViewMut2, Axis};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{Result, SkystackError};
use crate::sample::{Sample, SampleKind};

/// Channel layout of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelLayout {
    Gray,
    Rgb,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => COLOR_CHANNEL_COUNT,
        }
    }

    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            COLOR_CHANNEL_COUNT => Ok(Self::Rgb),
            n => Err(SkystackError::UnsupportedChannels(n)),
        }
    }
}

/// A gray or RGB image with samples of type `T`.
///
/// Data is stored with shape `(height, channels, width)`: every image row
/// holds its red, green and blue runs back to back, so one row of any
/// channel count is a single contiguous slice.
#[derive(Clone, Debug)]
pub struct Image<T> {
    data: Array3<T>,
}

impl<T: Sample> Image<T> {
    /// A zero-filled image.
    pub fn zeros(width: usize, height: usize, layout: ChannelLayout) -> Self {
        Self {
            data: Array3::from_elem((height, layout.channels(), width), T::zero()),
        }
    }

    /// An image with every sample set to `value`.
    pub fn filled(width: usize, height: usize, layout: ChannelLayout, value: T) -> Self {
        Self {
            data: Array3::from_elem((height, layout.channels(), width), value),
        }
    }

    /// Wrap an `(height, channels, width)` array.
    pub fn from_array(data: Array3<T>) -> Result<Self> {
        ChannelLayout::from_channels(data.len_of(Axis(1)))?;
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Build a single-channel image from a row-major buffer.
    pub fn from_gray(width: usize, height: usize, pixels: Vec<T>) -> Result<Self> {
        let data = Array3::from_shape_vec((height, 1, width), pixels)
            .map_err(|_| SkystackError::InvalidDimensions { width, height })?;
        Ok(Self { data })
    }

    /// Build an RGB image from three row-major channel buffers.
    pub fn from_planes(width: usize, height: usize, red: &[T], green: &[T], blue: &[T]) -> Result<Self> {
        let len = width * height;
        if red.len() != len || green.len() != len || blue.len() != len {
            return Err(SkystackError::InvalidDimensions { width, height });
        }
        let mut image = Self::zeros(width, height, ChannelLayout::Rgb);
        for (c, plane) in [red, green, blue].into_iter().enumerate() {
            for row in 0..height {
                image
                    .channel_row_mut(row, c)
                    .copy_from_slice(&plane[row * width..(row + 1) * width]);
            }
        }
        Ok(image)
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn layout(&self) -> ChannelLayout {
        if self.channels() == 1 {
            ChannelLayout::Gray
        } else {
            ChannelLayout::Rgb
        }
    }

    pub fn kind(&self) -> SampleKind {
        T::KIND
    }

    /// Samples per image row (all channels).
    pub fn row_len(&self) -> usize {
        self.channels() * self.width()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> T {
        self.data[[y, channel, x]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: T) {
        self.data[[y, channel, x]] = value;
    }

    /// Underlying `(height, channels, width)` array.
    pub fn array(&self) -> &Array3<T> {
        &self.data
    }

    /// One channel as a `(height, width)` view.
    pub fn plane(&self, channel: usize) -> ArrayView2<'_, T> {
        self.data.index_axis(Axis(1), channel)
    }

    pub fn plane_mut(&mut self, channel: usize) -> ArrayViewMut2<'_, T> {
        self.data.index_axis_mut(Axis(1), channel)
    }

    /// All samples in memory order.
    pub fn samples(&self) -> &[T] {
        self.data
            .as_slice()
            .expect("image data is kept in standard layout")
    }

    pub fn samples_mut(&mut self) -> &mut [T] {
        self.data
            .as_slice_mut()
            .expect("image data is kept in standard layout")
    }

    /// One image row: `channels` runs of `width` samples.
    pub fn row(&self, y: usize) -> &[T] {
        let len = self.row_len();
        &self.samples()[y * len..(y + 1) * len]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let len = self.row_len();
        &mut self.samples_mut()[y * len..(y + 1) * len]
    }

    pub fn channel_row(&self, y: usize, channel: usize) -> &[T] {
        let w = self.width();
        &self.row(y)[channel * w..(channel + 1) * w]
    }

    pub fn channel_row_mut(&mut self, y: usize, channel: usize) -> &mut [T] {
        let w = self.width();
        &mut self.row_mut(y)[channel * w..(channel + 1) * w]
    }

    pub fn same_shape<U: Sample>(&self, other: &Image<U>) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.channels() == other.channels()
    }
}

/// An image of any supported sample type.
#[derive(Clone, Debug)]
pub enum AnyImage {
    U8(Image<u8>),
    U16(Image<u16>),
    U32(Image<u32>),
    F32(Image<f32>),
    F64(Image<f64>),
}

/// Run `$body` with `$img` bound to the typed image inside an [`AnyImage`].
#[macro_export]
macro_rules! with_image {
    ($any:expr, $img:ident => $body:expr) => {
        match $any {
            $crate::frame::AnyImage::U8($img) => $body,
            $crate::frame::AnyImage::U16($img) => $body,
            $crate::frame::AnyImage::U32($img) => $body,
            $crate::frame::AnyImage::F32($img) => $body,
            $crate::frame::AnyImage::F64($img) => $body,
        }
    };
}

impl AnyImage {
    pub fn kind(&self) -> SampleKind {
        with_image!(self, img => img.kind())
    }

    pub fn width(&self) -> usize {
        with_image!(self, img => img.width())
    }

    pub fn height(&self) -> usize {
        with_image!(self, img => img.height())
    }

    pub fn channels(&self) -> usize {
        with_image!(self, img => img.channels())
    }

    pub fn layout(&self) -> ChannelLayout {
        with_image!(self, img => img.layout())
    }

    /// Copy into a float image, keeping native sample values.
    pub fn to_f32(&self) -> Image<f32> {
        with_image!(self, img => convert(img))
    }
}

macro_rules! impl_from_image {
    ($t:ty, $variant:ident) => {
        impl From<Image<$t>> for AnyImage {
            fn from(image: Image<$t>) -> Self {
                Self::$variant(image)
            }
        }
    };
}

impl_from_image!(u8, U8);
impl_from_image!(u16, U16);
impl_from_image!(u32, U32);
impl_from_image!(f32, F32);
impl_from_image!(f64, F64);

/// Convert every sample to another sample type (saturating).
pub fn convert<S: Sample, D: Sample>(image: &Image<S>) -> Image<D> {
    Image {
        data: image
            .data
            .mapv(|v| D::from_f64_saturating(v.to_f64_lossy())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_hold_channel_runs() {
        let image = Image::from_planes(2, 2, &[1u16, 2, 3, 4], &[5, 6, 7, 8], &[9, 10, 11, 12]).unwrap();
        assert_eq!(image.row(1), &[3, 4, 7, 8, 11, 12]);
        assert_eq!(image.channel_row(0, 2), &[9, 10]);
        assert_eq!(image.get(1, 0, 1), 6);
        assert_eq!(image.plane(0)[[1, 0]], 3);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(Image::from_gray(3, 2, vec![0u8; 5]).is_err());
        assert!(Image::from_planes(1, 1, &[0u8], &[0], &[]).is_err());
        assert!(Image::from_array(Array3::<f32>::zeros((2, 2, 2))).is_err());
    }

    #[test]
    fn non_standard_arrays_are_copied() {
        let data = Array3::from_shape_fn((3, 1, 2), |(y, _, x)| (y * 10 + x) as u16);
        let transposed = data.permuted_axes([2, 1, 0]);
        let image = Image::from_array(transposed).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.row(1), &[1, 11, 21]);
    }

    #[test]
    fn any_image_dispatch() {
        let any = AnyImage::from(Image::filled(4, 3, ChannelLayout::Rgb, 7u8));
        assert_eq!(any.kind(), SampleKind::U8);
        assert_eq!(any.layout(), ChannelLayout::Rgb);
        assert!(any.to_f32().samples().iter().all(|&v| v == 7.0));
    }
}
