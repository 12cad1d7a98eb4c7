//! Render surface
//!
//! Holds the properties set by the UI boundary, requests images from the
//! shared [`ImageSource`], and turns completed loads into rendered frames
//! and owner callbacks.
//!
//! Loads run in the background. Their results are queued and only applied
//! when the owning thread drains them with
//! [`RenderSurface::process_completions`], [`RenderSurface::settle`] or
//! [`RenderSurface::wait_for_completion`], so callbacks and frame updates
//! always happen on that thread.

use std::sync::Arc;

use smol::channel::{self, Receiver, Sender};

use super::compose::{self, RenderedFrame};
use super::events::{ErrorEvent, LoadEvent};
use super::layout::ResizeMode;
use super::mask::CornerRadius;
use crate::config::RenderConfig;
use crate::geometry::Rect;
use crate::source::{DecodedImage, ImagePath, ImageSource, LoadResult};

type LoadCallback = Box<dyn FnMut(&LoadEvent)>;
type ErrorCallback = Box<dyn FnMut(&ErrorEvent)>;

/// A finished load on its way back to the surface
struct Completion {
    generation: u64,
    path: ImagePath,
    result: LoadResult,
}

/// Properties of a surface plus the image currently shown
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    pub path: Option<ImagePath>,
    pub resize_mode: ResizeMode,
    pub corner_radius: CornerRadius,
    pub target_rect: Rect,
    /// Last successfully decoded image; always belongs to `path`
    pub image: Option<Arc<DecodedImage>>,
}

/// Image presentation surface
pub struct RenderSurface {
    source: ImageSource,
    config: RenderConfig,
    state: SurfaceState,
    /// Id of the latest request; older completions are stale
    generation: u64,
    /// Set while the latest request has not completed
    pending: Option<u64>,
    frame: Option<RenderedFrame>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
}

impl RenderSurface {
    pub fn new(source: ImageSource, config: RenderConfig) -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            source,
            config,
            state: SurfaceState::default(),
            generation: 0,
            pending: None,
            frame: None,
            sender,
            receiver,
            on_load: None,
            on_error: None,
        }
    }

    /// Register the success callback, replacing any previous one
    pub fn on_load(&mut self, callback: impl FnMut(&LoadEvent) + 'static) {
        self.on_load = Some(Box::new(callback));
    }

    /// Register the failure callback, replacing any previous one
    pub fn on_error(&mut self, callback: impl FnMut(&ErrorEvent) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Show the image at `path`.
    ///
    /// Re-setting the current path is a no-op once its image is held;
    /// anything else supersedes the outstanding request and starts a load.
    pub fn set_path(&mut self, path: impl Into<ImagePath>) {
        let path = path.into();
        if self.state.path.as_ref() == Some(&path) && self.state.image.is_some() {
            return;
        }

        self.state.path = Some(path.clone());
        self.state.image = None;
        self.frame = None;
        self.request(path);
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        if self.state.resize_mode != mode {
            self.state.resize_mode = mode;
            self.render();
        }
    }

    pub fn set_corner_radius(&mut self, radius: f32) {
        let radius = CornerRadius::new(radius);
        if self.state.corner_radius != radius {
            self.state.corner_radius = radius;
            self.render();
        }
    }

    pub fn set_target_rect(&mut self, rect: Rect) {
        if self.state.target_rect != rect {
            self.state.target_rect = rect;
            self.render();
        }
    }

    /// Drop the cached image for the current path and load it again
    pub fn reload(&mut self) {
        let Some(path) = self.state.path.clone() else {
            return;
        };

        self.source.invalidate(&path);
        self.state.image = None;
        self.frame = None;
        self.request(path);
    }

    /// Apply every completion that has arrived, without blocking.
    ///
    /// Returns how many completions were applied (stale ones are dropped).
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            if self.complete(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until the latest request has completed and been applied.
    ///
    /// Returns whether an image is held afterwards.
    pub async fn settle(&mut self) -> bool {
        self.process_completions();
        while self.pending.is_some() {
            match self.receiver.recv().await {
                Ok(completion) => {
                    self.complete(completion);
                }
                Err(_) => break,
            }
        }
        self.state.image.is_some()
    }

    /// Blocking form of [`RenderSurface::settle`]
    pub fn wait_for_completion(&mut self) -> bool {
        smol::block_on(self.settle())
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn path(&self) -> Option<&ImagePath> {
        self.state.path.as_ref()
    }

    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        self.state.image.as_ref()
    }

    /// Last rendered frame, if an image is held
    pub fn frame(&self) -> Option<&RenderedFrame> {
        self.frame.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    fn request(&mut self, path: ImagePath) {
        self.generation += 1;
        let generation = self.generation;
        self.pending = Some(generation);

        tracing::debug!("Requesting {} (request {})", path, generation);

        let source = self.source.clone();
        let sender = self.sender.clone();
        smol::spawn(async move {
            let result = source.load(path.clone()).await;
            // Fails only once the surface is gone
            let _ = sender.send(Completion { generation, path, result }).await;
        })
        .detach();
    }

    /// Apply one completion; returns false when it was stale
    fn complete(&mut self, completion: Completion) -> bool {
        let Completion { generation, path, result } = completion;

        if generation != self.generation || self.state.path.as_ref() != Some(&path) {
            tracing::debug!("Discarding stale result for {} (request {})", path, generation);
            return false;
        }
        self.pending = None;

        match result {
            Ok(image) => {
                let event = LoadEvent {
                    path,
                    width: image.width(),
                    height: image.height(),
                };
                self.state.image = Some(image);
                self.render();

                if let Some(callback) = self.on_load.as_mut() {
                    callback(&event);
                }
            }
            Err(e) => {
                let event = ErrorEvent {
                    path,
                    reason: e.reason(),
                    message: e.to_string(),
                };
                self.frame = None;

                if let Some(callback) = self.on_error.as_mut() {
                    callback(&event);
                }
            }
        }
        true
    }

    /// Re-render from the held image; layout changes never fire callbacks
    fn render(&mut self) {
        let Some(image) = self.state.image.as_ref() else {
            return;
        };

        self.frame = Some(compose::compose(
            image,
            self.state.target_rect,
            self.state.resize_mode,
            self.state.corner_radius,
            &self.config,
        ));
    }
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .finish()
    }
}
