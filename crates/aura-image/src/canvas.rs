//! Canvas - premultiplied pixel buffer backed by a tiny-skia Pixmap

use std::path::Path;

use tiny_skia::{FilterQuality, Mask, Pixmap, PixmapPaint, Transform};

use crate::Color;
use crate::geometry::Rect;
use crate::source::DecodedImage;

/// Pixel canvas
#[derive(Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Create a transparent canvas; `None` for zero or oversized dimensions
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Draw `image` scaled into `dest`, optionally through a coverage mask
    pub fn draw_image(
        &mut self,
        image: &DecodedImage,
        dest: Rect,
        quality: FilterQuality,
        mask: Option<&Mask>,
    ) {
        if dest.is_empty() || image.size().is_empty() {
            return;
        }

        let scale_x = dest.w / image.width() as f32;
        let scale_y = dest.h / image.height() as f32;

        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };

        self.pixmap.draw_pixmap(
            0,
            0,
            image.pixmap(),
            &paint,
            Transform::from_row(scale_x, 0.0, 0.0, scale_y, dest.x, dest.y),
            mask,
        );
    }

    /// Straight-alpha color at (x, y); `None` outside the canvas
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(color.red(), color.green(), color.blue(), color.alpha()))
    }

    /// Premultiplied RGBA bytes, as handed to a platform surface
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Encode as PNG and write to `path`
    pub fn save_png(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let png = self
            .pixmap
            .encode_png()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, png)
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
