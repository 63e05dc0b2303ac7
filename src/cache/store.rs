//! Shared Cache Module
//!
//! Thread-safe adapter wrapping the LRU engine with lazy initialization.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache};

// == Shared Cache ==
/// Concurrent byte-view cache backing a single group.
///
/// The LRU engine is constructed on first `add`, so a group that is never
/// written costs nothing beyond this wrapper. All access goes through one
/// mutex; no lock is ever held across an await point.
pub struct SharedCache {
    /// Byte budget handed to the LRU on first use
    max_bytes: u64,
    /// Lazily-constructed engine
    lru: Mutex<Option<LruCache<ByteView>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    /// Bumped from the engine's eviction callback
    evictions: Arc<AtomicU64>,
}

impl SharedCache {
    // == Constructor ==
    /// Creates a shared cache bounded to `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            lru: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    // == Get ==
    /// Retrieves a view by key.
    ///
    /// Returns `None` without constructing the engine if nothing has been
    /// added yet.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock();
        let view = guard.as_mut().and_then(|lru| lru.get(key).cloned());
        drop(guard);

        match view {
            Some(view) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(view)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // == Add ==
    /// Stores a view, constructing the LRU engine on first use.
    pub fn add(&self, key: &str, view: ByteView) {
        let mut guard = self.lru.lock();
        let lru = guard.get_or_insert_with(|| {
            let evictions = Arc::clone(&self.evictions);
            LruCache::with_on_evicted(self.max_bytes, move |_key, _view: &ByteView| {
                evictions.fetch_add(1, Ordering::Relaxed);
            })
        });
        lru.add(key, view);
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let guard = self.lru.lock();
        let (total_entries, used_bytes) = guard
            .as_ref()
            .map(|lru| (lru.len(), lru.used_bytes()))
            .unwrap_or((0, 0));

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            total_entries,
            used_bytes,
        }
    }
}

impl std::fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCache")
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
