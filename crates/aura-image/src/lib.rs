//! Aura Image - native image view core
//!
//! Loads an image from a file path, lays it out inside a target rectangle
//! according to a resize mode, masks it to a rounded rectangle and reports
//! success or failure to the view's owner.
//!
//! This crate provides:
//! - [`ImageSource`]: shared decode cache (LRU by entry count and bytes)
//!   that joins concurrent decodes of the same path
//! - [`RenderSurface`]: per-view state, stale-result discarding and
//!   `on_load` / `on_error` delivery on the owning thread
//! - Layout for stretch, aspect-fit, aspect-fill and center modes
//! - Rounded-corner compositing with tiny-skia
//!
//! # Example
//! ```rust,ignore
//! use aura_image::{Config, ImageSource, RenderSurface, Rect, ResizeMode};
//!
//! let config = Config::default();
//! let source = ImageSource::new(&config.source);
//! let mut surface = RenderSurface::new(source, config.render);
//! surface.on_load(|e| println!("loaded {} ({}x{})", e.path, e.width, e.height));
//! surface.set_target_rect(Rect::new(0.0, 0.0, 320.0, 240.0));
//! surface.set_resize_mode(ResizeMode::AspectFill);
//! surface.set_corner_radius(8.0);
//! surface.set_path("/photos/cat.jpg");
//! surface.wait_for_completion();
//! ```

mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod source;
pub mod surface;

pub use canvas::Canvas;
pub use config::{Config, RenderConfig, SourceConfig};
pub use error::{ConfigError, FailureReason, LoadError};
pub use geometry::{Rect, Size};
pub use source::{Decode, DecodedImage, ImageDecoder, ImageFormat, ImagePath, ImageSource, SourceStats};
pub use surface::{CornerRadius, ErrorEvent, LoadEvent, RenderSurface, RenderedFrame, ResizeMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Color (RGBA)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}
