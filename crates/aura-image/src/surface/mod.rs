//! Render surface
//!
//! Layout, corner masking and load-event delivery for a single image view.

mod compose;
mod events;
mod layout;
mod mask;
mod view;

pub use compose::{RenderedFrame, compose};
pub use events::{ErrorEvent, LoadEvent};
pub use layout::{ParseResizeModeError, ResizeMode, draw_rect};
pub use mask::{CornerRadius, rounded_mask, rounded_rect_path};
pub use view::{RenderSurface, SurfaceState};
