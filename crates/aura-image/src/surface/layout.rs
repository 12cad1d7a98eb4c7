//! Resize policy and draw-rect computation
//!
//! Maps an image's intrinsic size into a target rectangle.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};

/// Scaling mode for images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// Stretch to fill (may distort)
    #[serde(alias = "fill")]
    Stretch,
    /// Scale to fit, maintain aspect ratio (may letterbox)
    #[default]
    #[serde(alias = "contain")]
    AspectFit,
    /// Scale to cover, maintain aspect ratio (may crop)
    #[serde(alias = "cover")]
    AspectFill,
    /// No scaling, centered (may crop)
    #[serde(alias = "none")]
    Center,
}

impl ResizeMode {
    pub const ALL: [ResizeMode; 4] = [
        ResizeMode::Stretch,
        ResizeMode::AspectFit,
        ResizeMode::AspectFill,
        ResizeMode::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::AspectFit => "aspect-fit",
            Self::AspectFill => "aspect-fill",
            Self::Center => "center",
        }
    }
}

/// The native view exposes resize mode as a single flag: set means the
/// image fills its frame, unset means it fits inside it.
impl From<bool> for ResizeMode {
    fn from(fill: bool) -> Self {
        if fill { Self::AspectFill } else { Self::AspectFit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resize mode: {0}")]
pub struct ParseResizeModeError(String);

impl FromStr for ResizeMode {
    type Err = ParseResizeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stretch" | "fill" => Ok(Self::Stretch),
            "aspect-fit" | "aspectfit" | "contain" => Ok(Self::AspectFit),
            "aspect-fill" | "aspectfill" | "cover" => Ok(Self::AspectFill),
            "center" | "none" => Ok(Self::Center),
            _ => Err(ParseResizeModeError(s.to_string())),
        }
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute where an image of `intrinsic` size is drawn inside `target`.
///
/// The result may extend past `target` (aspect-fill, or center with a
/// larger image); compositing clips it. A target or image with no area
/// yields an empty rect at the target's centre.
pub fn draw_rect(intrinsic: Size, target: Rect, mode: ResizeMode) -> Rect {
    if target.is_empty() || intrinsic.is_empty() {
        return empty_at(&target);
    }

    let img_w = intrinsic.width as f32;
    let img_h = intrinsic.height as f32;

    match mode {
        ResizeMode::Stretch => target,
        ResizeMode::AspectFit => {
            let scale = (target.w / img_w).min(target.h / img_h);
            centered(&target, img_w * scale, img_h * scale)
        }
        ResizeMode::AspectFill => {
            let scale = (target.w / img_w).max(target.h / img_h);
            centered(&target, img_w * scale, img_h * scale)
        }
        ResizeMode::Center => centered(&target, img_w, img_h),
    }
}

fn centered(target: &Rect, w: f32, h: f32) -> Rect {
    Rect::new(
        target.x + (target.w - w) / 2.0,
        target.y + (target.h - h) / 2.0,
        w,
        h,
    )
}

fn empty_at(target: &Rect) -> Rect {
    let collapsed = target.collapsed();
    if collapsed.x.is_finite() && collapsed.y.is_finite() {
        collapsed
    } else {
        Rect::ZERO
    }
}
