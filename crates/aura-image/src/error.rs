//! Error types

use serde::Serialize;

/// Why a load failed, as reported to the surface owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// Path empty, missing, or unreadable
    NotFound,
    /// Bytes present but not a decodable image, or an unsupported format
    DecodeError,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::DecodeError => write!(f, "decode error"),
        }
    }
}

/// A failed image load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode failed: {0}")]
    DecodeFailed(String),
}

impl LoadError {
    /// The reason discriminant delivered through `on_error`
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::NotFound(_) => FailureReason::NotFound,
            Self::UnsupportedFormat(_) | Self::DecodeFailed(_) => FailureReason::DecodeError,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
