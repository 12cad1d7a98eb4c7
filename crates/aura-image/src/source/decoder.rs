//! Image decoder for various formats
//!
//! Supports PNG, JPEG, GIF, WebP via the image crate. Decoded pixels are
//! stored premultiplied, ready to be composited by tiny-skia.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat};
use tiny_skia::{ColorU8, Pixmap, PixmapRef};

use super::ImagePath;
use crate::error::LoadError;
use crate::geometry::Size;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.len() < 8 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: GIF87a or GIF89a
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// Get format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "gif" => Self::Gif,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    fn to_image_format(self) -> Option<ImgFormat> {
        match self {
            Self::Png => Some(ImgFormat::Png),
            Self::Jpeg => Some(ImgFormat::Jpeg),
            Self::Gif => Some(ImgFormat::Gif),
            Self::WebP => Some(ImgFormat::WebP),
            Self::Unknown => None,
        }
    }
}

/// A decoded image ready for compositing
#[derive(Clone)]
pub struct DecodedImage {
    /// Premultiplied RGBA pixels
    pixmap: Pixmap,
    /// Format detected while decoding
    format: ImageFormat,
}

impl DecodedImage {
    /// Create from straight (non-premultiplied) RGBA data.
    ///
    /// Returns `None` for zero dimensions or a buffer of the wrong length.
    pub fn from_rgba(pixels: &[u8], width: u32, height: u32) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected {
            return None;
        }

        let mut pixmap = Pixmap::new(width, height)?;
        premultiply_into(&mut pixmap, pixels.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]));

        Some(Self { pixmap, format: ImageFormat::Unknown })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Intrinsic size in pixels
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Memory size in bytes
    pub fn memory_size(&self) -> usize {
        self.pixmap.data().len()
    }

    /// Borrow the premultiplied pixels for drawing
    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }

    /// Straight RGBA pixel at (x, y); `None` outside the image
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format)
            .finish()
    }
}

/// Turns an image path into decoded pixels.
///
/// The cache calls this at most once per path at a time.
pub trait Decode: Send + Sync {
    fn decode(&self, path: &ImagePath) -> Result<DecodedImage, LoadError>;
}

/// File-system decoder backed by the image crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode image from bytes
    pub fn decode_bytes(data: &[u8]) -> Result<DecodedImage, LoadError> {
        let format = ImageFormat::from_bytes(data);
        Self::decode_with_format(data, format)
    }

    /// Decode with known format
    pub fn decode_with_format(data: &[u8], format: ImageFormat) -> Result<DecodedImage, LoadError> {
        let img_format = format
            .to_image_format()
            .ok_or_else(|| LoadError::UnsupportedFormat(format!("{} bytes of unknown data", data.len())))?;

        let img = image::load(Cursor::new(data), img_format)
            .map_err(|e| LoadError::DecodeFailed(e.to_string()))?;

        Self::image_to_decoded(img, format)
    }

    /// Convert DynamicImage to DecodedImage
    fn image_to_decoded(img: DynamicImage, format: ImageFormat) -> Result<DecodedImage, LoadError> {
        let (width, height) = img.dimensions();
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| LoadError::DecodeFailed(format!("invalid dimensions {width}x{height}")))?;

        let rgba = img.into_rgba8();
        premultiply_into(&mut pixmap, rgba.pixels().map(|p| p.0));

        Ok(DecodedImage { pixmap, format })
    }
}

impl Decode for ImageDecoder {
    fn decode(&self, path: &ImagePath) -> Result<DecodedImage, LoadError> {
        if path.is_empty() {
            return Err(LoadError::NotFound("empty path".into()));
        }

        let data = std::fs::read(path.as_path())
            .map_err(|e| LoadError::NotFound(format!("{path}: {e}")))?;

        // Magic bytes win; the extension only helps when they are inconclusive
        let format = match ImageFormat::from_bytes(&data) {
            ImageFormat::Unknown => path
                .extension()
                .map(|ext| ImageFormat::from_extension(&ext))
                .unwrap_or(ImageFormat::Unknown),
            format => format,
        };

        if format == ImageFormat::Unknown {
            return Err(LoadError::UnsupportedFormat(path.to_string()));
        }

        Self::decode_with_format(&data, format)
    }
}

fn premultiply_into(pixmap: &mut Pixmap, pixels: impl Iterator<Item = [u8; 4]>) {
    for (dst, [r, g, b, a]) in pixmap.pixels_mut().iter_mut().zip(pixels) {
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
}
