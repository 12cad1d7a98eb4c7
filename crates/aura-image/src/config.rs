//! Configuration

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decode cache limits
    pub source: SourceConfig,
    /// Compositing options
    pub render: RenderConfig,
}

impl Config {
    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Decode cache limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum number of cached images
    pub max_entries: usize,
    /// Maximum decoded bytes held by the cache
    pub max_bytes: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_entries: 64,
            max_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Compositing options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bilinear filtering when scaling (nearest otherwise)
    pub smooth_scaling: bool,
    /// Anti-alias the rounded corner mask
    pub anti_alias: bool,
    /// Largest canvas, in pixels, a frame may allocate; bigger targets
    /// render no pixels
    pub max_canvas_pixels: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            smooth_scaling: true,
            anti_alias: true,
            max_canvas_pixels: 4096 * 4096,
        }
    }
}
