use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb};
use tracing::debug;

use crate::error::{Result, SkystackError};
use crate::frame::{AnyImage, ChannelLayout, Image};
use crate::sample::SampleKind;

/// Sample value that maps to full scale when saving data of `kind`.
///
/// Float data is taken to be on the 16-bit scale.
pub fn white_level(kind: SampleKind) -> f32 {
    match kind {
        SampleKind::U8 => u8::MAX as f32,
        SampleKind::U32 => u32::MAX as f32,
        SampleKind::U16 | SampleKind::F32 | SampleKind::F64 => u16::MAX as f32,
    }
}

/// Load an image file, keeping its native sample type where possible.
///
/// 8-bit and 16-bit gray or RGB files load as `U8`/`U16`, 32-bit float
/// RGB as `F32`. Alpha is dropped and anything else is widened to 16 bits.
pub fn load_image(path: &Path) -> Result<AnyImage> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    debug!(path = %path.display(), width = w, height = h, color = ?img.color(), "Loaded image");

    let any = match img {
        DynamicImage::ImageLuma8(buf) => AnyImage::U8(Image::from_gray(w, h, buf.into_raw())?),
        DynamicImage::ImageLuma16(buf) => AnyImage::U16(Image::from_gray(w, h, buf.into_raw())?),
        DynamicImage::ImageRgb8(buf) => AnyImage::U8(interleaved_to_image(w, h, buf.as_raw())?),
        DynamicImage::ImageRgb16(buf) => AnyImage::U16(interleaved_to_image(w, h, buf.as_raw())?),
        DynamicImage::ImageRgb32F(buf) => AnyImage::F32(interleaved_to_image(w, h, buf.as_raw())?),
        other if other.color().has_color() => {
            let buf = other.to_rgb16();
            AnyImage::U16(interleaved_to_image(w, h, buf.as_raw())?)
        }
        other => AnyImage::U16(Image::from_gray(w, h, other.to_luma16().into_raw())?),
    };
    Ok(any)
}

fn interleaved_to_image<T: crate::sample::Sample>(w: usize, h: usize, raw: &[T]) -> Result<Image<T>> {
    if raw.len() != w * h * 3 {
        return Err(SkystackError::InvalidDimensions { width: w, height: h });
    }
    let mut image = Image::zeros(w, h, ChannelLayout::Rgb);
    for y in 0..h {
        let src = &raw[y * w * 3..(y + 1) * w * 3];
        let row = image.row_mut(y);
        for (x, px) in src.chunks_exact(3).enumerate() {
            row[x] = px[0];
            row[w + x] = px[1];
            row[2 * w + x] = px[2];
        }
    }
    Ok(image)
}

#[inline]
fn to_level(v: f32, white: f32, max: f32) -> f32 {
    (v * (max / white)).clamp(0.0, max).round()
}

fn interleave<P: Copy>(image: &Image<f32>, map: impl Fn(f32) -> P) -> Vec<P> {
    let (w, h, channels) = (image.width(), image.height(), image.channels());
    let mut pixels = Vec::with_capacity(w * h * channels);
    for y in 0..h {
        let row = image.row(y);
        for x in 0..w {
            for c in 0..channels {
                pixels.push(map(row[c * w + x]));
            }
        }
    }
    pixels
}

/// Save as 16-bit TIFF; `white` maps to 65535.
pub fn save_tiff(image: &Image<f32>, white: f32, path: &Path) -> Result<()> {
    let (w, h) = (image.width() as u32, image.height() as u32);
    let pixels = interleave(image, |v| to_level(v, white, 65535.0) as u16);
    match image.layout() {
        ChannelLayout::Gray => ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .expect("buffer size matches dimensions")
            .save_with_format(path, ImageFormat::Tiff)?,
        ChannelLayout::Rgb => ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .expect("buffer size matches dimensions")
            .save_with_format(path, ImageFormat::Tiff)?,
    }
    Ok(())
}

/// Save as 8-bit PNG; `white` maps to 255.
pub fn save_png(image: &Image<f32>, white: f32, path: &Path) -> Result<()> {
    let (w, h) = (image.width() as u32, image.height() as u32);
    let pixels = interleave(image, |v| to_level(v, white, 255.0) as u8);
    match image.layout() {
        ChannelLayout::Gray => ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .expect("buffer size matches dimensions")
            .save_with_format(path, ImageFormat::Png)?,
        ChannelLayout::Rgb => ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .expect("buffer size matches dimensions")
            .save_with_format(path, ImageFormat::Png)?,
    }
    Ok(())
}

/// Save an image, choosing format from file extension (TIFF by default).
pub fn save_image(image: &Image<f32>, white: f32, path: &Path) -> Result<()> {
    if !(white.is_finite() && white > 0.0) {
        return Err(SkystackError::InvalidParameter(format!(
            "white level must be positive, got {white}"
        )));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(image, white, path),
        _ => save_tiff(image, white, path),
    }
}

/// Save an image of any sample type on its own full scale.
pub fn save_any(image: &AnyImage, path: &Path) -> Result<()> {
    save_image(&image.to_f32(), white_level(image.kind()), path)
}
