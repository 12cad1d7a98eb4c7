//! Events delivered to the surface owner

use serde::Serialize;

use crate::error::FailureReason;
use crate::source::ImagePath;

/// Fired once when a requested image has been decoded and rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadEvent {
    pub path: ImagePath,
    /// Intrinsic width of the source image
    pub width: u32,
    /// Intrinsic height of the source image
    pub height: u32,
}

/// Fired once when a requested image could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    pub path: ImagePath,
    pub reason: FailureReason,
    pub message: String,
}
