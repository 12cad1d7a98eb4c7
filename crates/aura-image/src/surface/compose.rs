//! Compositing of a decoded image into a target rectangle

use tiny_skia::FilterQuality;

use super::layout::{self, ResizeMode};
use super::mask::{self, CornerRadius};
use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::geometry::Rect;
use crate::source::DecodedImage;

/// Result of rendering one image into a surface
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    /// Target rectangle in surface coordinates
    pub target: Rect,
    /// Where the image is drawn, before clipping to `target`
    pub draw_rect: Rect,
    /// Part of `draw_rect` inside `target`
    pub visible: Option<Rect>,
    /// Corner radius actually applied
    pub radius: f32,
    /// Pixels covering `target`, origin at its top-left; `None` when the
    /// target has no area or is over the canvas limit
    pub canvas: Option<Canvas>,
}

impl RenderedFrame {
    pub fn is_empty(&self) -> bool {
        self.canvas.is_none() || self.draw_rect.is_empty()
    }
}

/// Lay out `image` inside `target` and render it through the corner mask
pub fn compose(
    image: &DecodedImage,
    target: Rect,
    mode: ResizeMode,
    radius: CornerRadius,
    config: &RenderConfig,
) -> RenderedFrame {
    let draw_rect = layout::draw_rect(image.size(), target, mode);
    let visible = draw_rect.intersect(&target);
    let applied = radius.clamped_to(&target);

    let canvas = if target.is_empty() {
        None
    } else if f64::from(target.w.ceil()) * f64::from(target.h.ceil()) > config.max_canvas_pixels as f64 {
        tracing::warn!(
            "Target {}x{} exceeds the {} pixel canvas limit, not rendering",
            target.w,
            target.h,
            config.max_canvas_pixels
        );
        None
    } else {
        Canvas::new(target.w.ceil() as u32, target.h.ceil() as u32)
    };

    let canvas = canvas.map(|mut canvas| {
        let local = Rect::from_size(target.w, target.h);
        let mask = mask::rounded_mask(
            canvas.width(),
            canvas.height(),
            local,
            CornerRadius::new(applied),
            config.anti_alias,
        );

        let quality = if config.smooth_scaling {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };

        canvas.draw_image(image, draw_rect.translate(-target.x, -target.y), quality, mask.as_ref());
        canvas
    });

    RenderedFrame {
        target,
        draw_rect,
        visible,
        radius: applied,
        canvas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn solid(width: u32, height: u32) -> DecodedImage {
        let pixels = [255, 0, 0, 255].repeat((width * height) as usize);
        DecodedImage::from_rgba(&pixels, width, height).unwrap()
    }

    fn sharp() -> RenderConfig {
        RenderConfig {
            smooth_scaling: false,
            anti_alias: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_compose_letterboxed() {
        let frame = compose(
            &solid(400, 100),
            Rect::new(0.0, 0.0, 100.0, 50.0),
            ResizeMode::AspectFit,
            CornerRadius::NONE,
            &sharp(),
        );

        assert_eq!(frame.draw_rect, Rect::new(0.0, 12.5, 100.0, 25.0));
        let canvas = frame.canvas.as_ref().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (100, 50));
        assert_eq!(canvas.get_pixel(50, 25), Some(Color::RED));
        assert_eq!(canvas.get_pixel(50, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_compose_uses_target_local_coordinates() {
        let frame = compose(
            &solid(10, 10),
            Rect::new(200.0, 300.0, 20.0, 20.0),
            ResizeMode::Stretch,
            CornerRadius::NONE,
            &sharp(),
        );

        let canvas = frame.canvas.as_ref().unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some(Color::RED));
        assert_eq!(canvas.get_pixel(19, 19), Some(Color::RED));
        assert_eq!(frame.visible, Some(frame.target));
    }

    #[test]
    fn test_compose_masks_corners() {
        let frame = compose(
            &solid(40, 40),
            Rect::new(0.0, 0.0, 40.0, 40.0),
            ResizeMode::Stretch,
            CornerRadius::new(12.0),
            &sharp(),
        );

        let canvas = frame.canvas.as_ref().unwrap();
        assert_eq!(frame.radius, 12.0);
        assert_eq!(canvas.get_pixel(0, 0).unwrap().a, 0);
        assert_eq!(canvas.get_pixel(39, 0).unwrap().a, 0);
        assert_eq!(canvas.get_pixel(20, 20), Some(Color::RED));
    }

    #[test]
    fn test_compose_radius_clamped() {
        let frame = compose(
            &solid(10, 10),
            Rect::new(0.0, 0.0, 60.0, 20.0),
            ResizeMode::Stretch,
            CornerRadius::new(100.0),
            &sharp(),
        );
        assert_eq!(frame.radius, 10.0);
    }

    #[test]
    fn test_compose_cover_crops_overflow() {
        let frame = compose(
            &solid(100, 50),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            ResizeMode::AspectFill,
            CornerRadius::NONE,
            &sharp(),
        );

        assert_eq!(frame.draw_rect, Rect::new(-50.0, 0.0, 200.0, 100.0));
        assert_eq!(frame.visible, Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let canvas = frame.canvas.as_ref().unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some(Color::RED));
        assert_eq!(canvas.get_pixel(99, 99), Some(Color::RED));
    }

    #[test]
    fn test_compose_oversized_target_allocates_nothing() {
        let frame = compose(
            &solid(10, 10),
            Rect::new(0.0, 0.0, 1.0e9, 1.0e9),
            ResizeMode::AspectFit,
            CornerRadius::NONE,
            &sharp(),
        );
        assert!(frame.canvas.is_none());
        assert!(frame.is_empty());
        assert!(!frame.draw_rect.is_empty());

        let config = RenderConfig {
            max_canvas_pixels: 100,
            ..sharp()
        };
        let target = Rect::new(0.0, 0.0, 10.0, 10.0);
        let at_limit = compose(&solid(10, 10), target, ResizeMode::Stretch, CornerRadius::NONE, &config);
        assert!(at_limit.canvas.is_some());

        let target = Rect::new(0.0, 0.0, 10.0, 10.5);
        let over = compose(&solid(10, 10), target, ResizeMode::Stretch, CornerRadius::NONE, &config);
        assert!(over.canvas.is_none());
    }

    #[test]
    fn test_compose_zero_area_target() {
        for mode in ResizeMode::ALL {
            let frame = compose(
                &solid(10, 10),
                Rect::new(5.0, 5.0, 0.0, 30.0),
                mode,
                CornerRadius::new(4.0),
                &RenderConfig::default(),
            );
            assert!(frame.is_empty());
            assert!(frame.canvas.is_none());
            assert!(frame.visible.is_none());
            assert_eq!(frame.radius, 0.0);
        }
    }
}
