//! Image source
//!
//! Decoding and caching of images keyed by path.

mod cache;
mod decoder;
mod loader;
mod path;

pub use cache::ImageCache;
pub use decoder::{Decode, DecodedImage, ImageDecoder, ImageFormat};
pub use loader::{ImageSource, LoadResult, SourceStats};
pub use path::ImagePath;
