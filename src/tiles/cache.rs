use lru::LruCache;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(n) => n,
    None => unreachable!(),
};

/// Lifecycle of one tile URL
#[derive(Debug, Clone, PartialEq)]
pub enum TileEntry<T> {
    Pending,
    Ready(T),
    /// Not retried while the entry stays cached
    Failed,
}

/// LRU cache of decoded tiles keyed by request URL.
///
/// Keying by URL means a WMS layer whose filter changed asks for different
/// entries, while the previous filter's tiles stay around until evicted.
#[derive(Debug)]
pub struct TileCache<T> {
    cache: LruCache<String, TileEntry<T>>,
}

impl<T> TileCache<T> {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Looks up a tile, marking it recently used
    pub fn get(&mut self, url: &str) -> Option<&TileEntry<T>> {
        self.cache.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.cache.put(url, TileEntry::Pending);
    }

    pub fn insert_ready(&mut self, url: String, tile: T) {
        self.cache.put(url, TileEntry::Ready(tile));
    }

    pub fn mark_failed(&mut self, url: String) {
        self.cache.put(url, TileEntry::Failed);
    }

    /// Clear all tiles from the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

impl<T> Default for TileCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}
