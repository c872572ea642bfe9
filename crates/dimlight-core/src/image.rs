//! Image representation for the resource pipeline.

use std::fmt;
use std::io::Cursor;

use image::error::{
    ImageFormatHint, ParameterError, ParameterErrorKind, UnsupportedError, UnsupportedErrorKind,
};
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::transform::params::TransformParams;

/// Container format a source asset was decoded from.
///
/// Transformed images are re-encoded in the same format so callers get back
/// what they would have received without the provider in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
    Tiff,
}

impl SourceFormat {
    /// Map a detected `image` format onto a supported source format.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::WebP => Some(Self::WebP),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
            Self::Tiff => ImageFormat::Tiff,
        }
    }

    /// Preferred file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::WebP => "webp",
            Self::Tiff => "tiff",
        }
    }

    /// Whether the encoder can store an alpha channel.
    pub const fn has_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
            Self::Gif => write!(f, "GIF"),
            Self::Bmp => write!(f, "BMP"),
            Self::WebP => write!(f, "WebP"),
            Self::Tiff => write!(f, "TIFF"),
        }
    }
}

/// Decoded image. Always stored as straight-alpha RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width × height` entries.
    pub pixels: Vec<Rgba>,
    /// Container format of the source asset.
    pub format: SourceFormat,
}

impl DecodedImage {
    /// An image filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgba, format: SourceFormat) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
            format,
        }
    }

    /// Detect the container format and decode to RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let detected = image::guess_format(bytes)?;
        let format = SourceFormat::from_image_format(detected).ok_or_else(|| {
            ImageError::Unsupported(UnsupportedError::from_format_and_kind(
                ImageFormatHint::Exact(detected),
                UnsupportedErrorKind::Format(ImageFormatHint::Exact(detected)),
            ))
        })?;

        let rgba = image::load_from_memory_with_format(bytes, detected)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();

        Ok(Self {
            width,
            height,
            pixels,
            format,
        })
    }

    /// Encode in the source format. JPEG drops the alpha channel.
    pub fn encode(&self) -> Result<Vec<u8>, ImageError> {
        let raw: &[u8] = bytemuck::cast_slice(&self.pixels);
        let buffer = RgbaImage::from_raw(self.width, self.height, raw.to_vec()).ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))
        })?;

        let mut out = Cursor::new(Vec::new());
        let image = DynamicImage::ImageRgba8(buffer);
        if self.format.has_alpha() {
            image.write_to(&mut out, self.format.image_format())?;
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_to(&mut out, self.format.image_format())?;
        }
        Ok(out.into_inner())
    }
}

/// A decoded image after the desaturation transform, plus the parameters
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    image: DecodedImage,
    params: TransformParams,
}

impl TransformedImage {
    pub fn new(image: DecodedImage, params: TransformParams) -> Self {
        Self { image, params }
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.image.pixels
    }

    pub fn format(&self) -> SourceFormat {
        self.image.format
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// Re-encode in the source format.
    pub fn encode(&self) -> Result<Vec<u8>, ImageError> {
        self.image.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_keeps_pixels_exactly() {
        let mut image = DecodedImage::solid(2, 3, [10, 20, 30, 40], SourceFormat::Png);
        image.pixels[4] = [255, 0, 128, 255];
        let decoded = DecodedImage::decode(&image.encode().unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_jpeg_is_detected_and_opaque() {
        let image = DecodedImage::solid(8, 8, [200, 200, 200, 100], SourceFormat::Jpeg);
        let decoded = DecodedImage::decode(&image.encode().unwrap()).unwrap();
        assert_eq!(decoded.format, SourceFormat::Jpeg);
        assert_eq!((decoded.width, decoded.height), (8, 8));
        assert!(decoded.pixels.iter().all(|px| px[3] == 255));
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        assert!(DecodedImage::decode(b"definitely not an image").is_err());
        assert!(DecodedImage::decode(&[]).is_err());
    }

    #[test]
    fn test_truncated_png_fails_to_decode() {
        let bytes = DecodedImage::solid(4, 4, [1, 2, 3, 4], SourceFormat::Png)
            .encode()
            .unwrap();
        assert!(DecodedImage::decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_mismatched_buffer_fails_to_encode() {
        let mut image = DecodedImage::solid(2, 2, [0, 0, 0, 255], SourceFormat::Png);
        image.pixels.pop();
        assert!(image.encode().is_err());
    }
}
