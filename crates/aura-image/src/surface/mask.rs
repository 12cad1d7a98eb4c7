//! Rounded-rectangle corner mask

use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};

use crate::geometry::Rect;

/// Cubic Bézier control distance for a quarter circle of radius 1
const KAPPA: f32 = 0.552_284_8;

/// Corner radius; never negative, 0 disables masking
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct CornerRadius(f32);

impl CornerRadius {
    pub const NONE: CornerRadius = CornerRadius(0.0);

    /// Negative and non-finite radii become 0
    pub fn new(radius: f32) -> Self {
        if radius.is_finite() && radius > 0.0 {
            Self(radius)
        } else {
            Self::NONE
        }
    }

    pub fn get(&self) -> f32 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 <= 0.0
    }

    /// Radius usable on `rect`: at most half its shorter side
    pub fn clamped_to(&self, rect: &Rect) -> f32 {
        if rect.is_empty() {
            return 0.0;
        }
        self.0.min(rect.min_side() / 2.0)
    }
}

impl From<f32> for CornerRadius {
    fn from(radius: f32) -> Self {
        Self::new(radius)
    }
}

/// Path of `rect` with all four corners rounded by `radius`.
///
/// The radius is clamped to half the shorter side; a zero radius gives a
/// plain rectangle.
pub fn rounded_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    let r = CornerRadius::new(radius).clamped_to(&rect);
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(rect.to_skia()?));
    }

    let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.cubic_to(right - r + k, top, right, top + r - k, right, top + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.cubic_to(left + r - k, bottom, left, bottom - r + k, left, bottom - r);
    pb.line_to(left, top + r);
    pb.cubic_to(left, top + r - k, left + r - k, top, left + r, top);
    pb.close();
    pb.finish()
}

/// Coverage mask of a `width`x`height` canvas that keeps only the rounded
/// `rect`. Returns `None` when there is nothing to mask.
pub fn rounded_mask(width: u32, height: u32, rect: Rect, radius: CornerRadius, anti_alias: bool) -> Option<Mask> {
    if radius.is_none() {
        return None;
    }

    let path = rounded_rect_path(rect, radius.get())?;
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(&path, FillRule::Winding, anti_alias, Transform::identity());
    Some(mask)
}
