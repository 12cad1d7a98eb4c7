//! Shared image source
//!
//! Decode-and-cache front end used by every render surface. Lookups hit the
//! LRU cache; misses decode outside of any lock, and concurrent requests for
//! the same path join the decode already in flight instead of repeating it.
//!
//! Lock order is `in_flight` then `cache`. A finished decode publishes its
//! image and leaves the in-flight table under one `in_flight` guard, so
//! `invalidate` can detach a running decode and keep its image out of the
//! cache.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use super::{Decode, DecodedImage, ImageCache, ImageDecoder, ImagePath};
use crate::config::SourceConfig;
use crate::error::LoadError;

/// Outcome of a single load
pub type LoadResult = Result<Arc<DecodedImage>, LoadError>;

/// A decode other callers can wait on
struct InFlight {
    result: Mutex<Option<LoadResult>>,
    cv: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    fn set(&self, result: LoadResult) {
        *lock(&self.result) = Some(result);
        self.cv.notify_all();
    }

    fn wait(&self) -> LoadResult {
        let mut slot = lock(&self.result);
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self.cv.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

enum Claim {
    Cached(Arc<DecodedImage>),
    Join(Arc<InFlight>),
    Decode(Arc<InFlight>),
}

struct Inner {
    cache: Mutex<ImageCache>,
    in_flight: Mutex<HashMap<ImagePath, Arc<InFlight>>>,
    decoder: Box<dyn Decode>,
    decodes: AtomicU64,
    joins: AtomicU64,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub hits: u64,
    pub misses: u64,
    /// Decoder invocations
    pub decodes: u64,
    /// Requests that waited on another caller's decode
    pub joins: u64,
    pub evictions: u64,
    pub entries: usize,
    pub bytes: usize,
}

/// Decode-and-cache service shared across surfaces.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct ImageSource {
    inner: Arc<Inner>,
}

impl ImageSource {
    /// Create a source decoding from the file system
    pub fn new(config: &SourceConfig) -> Self {
        Self::with_decoder(config, ImageDecoder)
    }

    /// Create a source with a custom decoder
    pub fn with_decoder(config: &SourceConfig, decoder: impl Decode + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache: Mutex::new(ImageCache::from_config(config)),
                in_flight: Mutex::new(HashMap::new()),
                decoder: Box::new(decoder),
                decodes: AtomicU64::new(0),
                joins: AtomicU64::new(0),
            }),
        }
    }

    /// Load an image, decoding it on smol's blocking pool when not cached
    pub async fn load(&self, path: impl Into<ImagePath>) -> LoadResult {
        let path = path.into();
        let source = self.clone();
        smol::unblock(move || source.load_blocking(path)).await
    }

    /// Load an image on the calling thread
    pub fn load_blocking(&self, path: impl Into<ImagePath>) -> LoadResult {
        let path = path.into();
        if path.is_empty() {
            return Err(LoadError::NotFound("empty path".into()));
        }

        if let Some(image) = lock(&self.inner.cache).get(&path) {
            tracing::debug!("Image cache hit: {}", path);
            return Ok(image);
        }

        match self.claim(&path) {
            Claim::Cached(image) => Ok(image),
            Claim::Join(flight) => {
                tracing::debug!("Joining in-flight decode: {}", path);
                self.inner.joins.fetch_add(1, Ordering::Relaxed);
                flight.wait()
            }
            Claim::Decode(flight) => {
                let result = self.decode(&path);
                self.publish(&path, &flight, &result);
                flight.set(result.clone());
                result
            }
        }
    }

    /// Cached image for `path`, without decoding
    pub fn get(&self, path: &ImagePath) -> Option<Arc<DecodedImage>> {
        lock(&self.inner.cache).get(path)
    }

    /// Forget the cached image for `path`; the next load decodes again.
    ///
    /// A decode already running for `path` is detached: callers that joined
    /// it still get its result, but it is never cached. Returns whether a
    /// cached image or a running decode was dropped.
    pub fn invalidate(&self, path: &ImagePath) -> bool {
        let mut in_flight = lock(&self.inner.in_flight);
        let detached = in_flight.remove(path).is_some();
        let removed = lock(&self.inner.cache).remove(path);
        if removed || detached {
            tracing::debug!("Invalidated {} (cached: {}, in flight: {})", path, removed, detached);
        }
        removed || detached
    }

    /// Drop every cached image and detach every running decode
    pub fn clear(&self) {
        let mut in_flight = lock(&self.inner.in_flight);
        in_flight.clear();
        lock(&self.inner.cache).clear();
    }

    pub fn stats(&self) -> SourceStats {
        let cache = lock(&self.inner.cache);
        SourceStats {
            hits: cache.hits,
            misses: cache.misses,
            decodes: self.inner.decodes.load(Ordering::Relaxed),
            joins: self.inner.joins.load(Ordering::Relaxed),
            evictions: cache.evictions,
            entries: cache.len(),
            bytes: cache.memory_usage(),
        }
    }

    /// Become the decoder for `path`, or find someone who already is.
    ///
    /// The cache is re-checked under the in-flight lock: a decode that
    /// finished after our first lookup has inserted its image before
    /// leaving the in-flight table.
    fn claim(&self, path: &ImagePath) -> Claim {
        let mut in_flight = lock(&self.inner.in_flight);
        if let Some(existing) = in_flight.get(path) {
            return Claim::Join(Arc::clone(existing));
        }

        // The miss was already counted by the caller
        if let Some(image) = lock(&self.inner.cache).peek(path) {
            return Claim::Cached(image);
        }

        let flight = Arc::new(InFlight::new());
        in_flight.insert(path.clone(), Arc::clone(&flight));
        Claim::Decode(flight)
    }

    fn decode(&self, path: &ImagePath) -> LoadResult {
        self.inner.decodes.fetch_add(1, Ordering::Relaxed);

        let decoded = panic::catch_unwind(AssertUnwindSafe(|| self.inner.decoder.decode(path)))
            .unwrap_or_else(|_| Err(LoadError::DecodeFailed(format!("decoder panicked on {path}"))));

        match decoded {
            Ok(image) => {
                tracing::info!(
                    "Decoded {} ({}x{}, {:?})",
                    path,
                    image.width(),
                    image.height(),
                    image.format()
                );
                Ok(Arc::new(image))
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path, e);
                Err(e)
            }
        }
    }

    /// Cache a finished decode and leave the in-flight table.
    ///
    /// Skipped when `flight` is no longer the registered decode for `path`,
    /// which means the path was invalidated while decoding.
    fn publish(&self, path: &ImagePath, flight: &Arc<InFlight>, result: &LoadResult) {
        let mut in_flight = lock(&self.inner.in_flight);
        let current = in_flight.get(path).is_some_and(|f| Arc::ptr_eq(f, flight));
        if !current {
            tracing::debug!("Decode of {} was invalidated, not caching it", path);
            return;
        }

        if let Ok(image) = result {
            if !lock(&self.inner.cache).insert(path.clone(), Arc::clone(image)) {
                tracing::debug!("{} exceeds the cache budget, not cached", path);
            }
        }
        in_flight.remove(path);
    }
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::new(&SourceConfig::default())
    }
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("stats", &self.stats())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
