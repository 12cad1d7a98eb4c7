//! Image cache with LRU eviction
//!
//! Caches decoded images by path with an entry limit and a memory limit.

use std::collections::HashMap;
use std::sync::Arc;

use super::{DecodedImage, ImagePath};
use crate::config::SourceConfig;

/// LRU image cache
pub struct ImageCache {
    /// Cached images
    entries: HashMap<ImagePath, CacheEntry>,
    /// Maximum number of entries
    max_entries: usize,
    /// Maximum memory in bytes
    max_memory: usize,
    /// Current memory usage
    current_memory: usize,
    /// Access counter for LRU
    access_counter: u64,
    /// Statistics
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CacheEntry {
    image: Arc<DecodedImage>,
    last_access: u64,
}

impl ImageCache {
    /// Create a new cache with an entry limit and memory limit (in bytes)
    pub fn new(max_entries: usize, max_memory: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            max_memory,
            current_memory: 0,
            access_counter: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.max_entries, config.max_bytes)
    }

    /// Get an image from cache
    pub fn get(&mut self, key: &ImagePath) -> Option<Arc<DecodedImage>> {
        self.access_counter += 1;

        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_access = self.access_counter;
            self.hits += 1;
            Some(Arc::clone(&entry.image))
        } else {
            self.misses += 1;
            None
        }
    }

    /// Fetch an entry without touching LRU order or statistics
    pub fn peek(&self, key: &ImagePath) -> Option<Arc<DecodedImage>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.image))
    }

    /// Check for an entry without touching LRU order or statistics
    pub fn contains(&self, key: &ImagePath) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an image into cache.
    ///
    /// Returns false when the image is too large to ever fit.
    pub fn insert(&mut self, key: ImagePath, image: Arc<DecodedImage>) -> bool {
        let size = image.memory_size();

        // Don't cache if image is larger than entire cache
        if size > self.max_memory || self.max_entries == 0 {
            return false;
        }

        // Replacing an entry frees its memory first
        self.remove(&key);

        // Evict until we have space
        while (self.current_memory + size > self.max_memory || self.entries.len() >= self.max_entries)
            && !self.entries.is_empty()
        {
            self.evict_lru();
        }

        self.access_counter += 1;
        self.current_memory += size;

        self.entries.insert(key, CacheEntry {
            image,
            last_access: self.access_counter,
        });
        true
    }

    /// Drop a single entry, returning whether it was present
    pub fn remove(&mut self, key: &ImagePath) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_memory -= entry.image.memory_size();
                true
            }
            None => false,
        }
    }

    /// Evict least recently used entry
    fn evict_lru(&mut self) {
        let lru_key = self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(k, _)| k.clone());

        if let Some(key) = lru_key {
            tracing::debug!("Evicting {} from image cache", key);
            if self.remove(&key) {
                self.evictions += 1;
            }
        }
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_memory = 0;
    }

    /// Number of cached images
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}
