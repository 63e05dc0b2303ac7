//! LRU Engine Module
//!
//! Implements a byte-bounded least-recently-used cache with an optional
//! eviction callback.

use std::collections::{HashMap, VecDeque};
use std::fmt;

// == Byte Sized ==
/// Capability for measuring the byte footprint of a cached value.
///
/// The engine charges `key.len() + value.byte_len()` bytes per entry.
pub trait ByteSized {
    /// Returns the size of the value in bytes.
    fn byte_len(&self) -> usize;
}

type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

// == LRU Cache ==
/// Byte-bounded LRU cache.
///
/// Keys are kept in a recency list where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// A `max_bytes` of 0 means the cache is unbounded.
pub struct LruCache<V> {
    /// Maximum aggregate entry size in bytes (0 = unbounded)
    max_bytes: u64,
    /// Current aggregate entry size in bytes
    nbytes: u64,
    /// Key-value storage
    entries: HashMap<String, V>,
    /// Order of keys by access time
    order: VecDeque<String>,
    /// Invoked synchronously after an entry is evicted.
    /// Runs inside the mutating call and must not re-enter the cache.
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: ByteSized> LruCache<V> {
    // == Constructor ==
    /// Creates a new LRU cache bounded to `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            entries: HashMap::new(),
            order: VecDeque::new(),
            on_evicted: None,
        }
    }

    /// Creates a new LRU cache with an eviction callback.
    pub fn with_on_evicted(
        max_bytes: u64,
        on_evicted: impl FnMut(&str, &V) + Send + 'static,
    ) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            entries: HashMap::new(),
            order: VecDeque::new(),
            on_evicted: Some(Box::new(on_evicted)),
        }
    }

    // == Get ==
    /// Retrieves a value by key, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    // == Add ==
    /// Stores a key-value pair.
    ///
    /// An existing key is updated in place and moved to the front; a new key
    /// is inserted at the front. The cache then evicts from the back until
    /// the byte budget is respected again.
    pub fn add(&mut self, key: &str, value: V) {
        let new_len = value.byte_len() as u64;

        if let Some(old) = self.entries.get_mut(key) {
            let old_len = old.byte_len() as u64;
            *old = value;
            self.nbytes = self.nbytes + new_len - old_len;
            self.touch(key);
        } else {
            self.nbytes += key.len() as u64 + new_len;
            self.entries.insert(key.to_string(), value);
            self.order.push_front(key.to_string());
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, firing the eviction callback.
    ///
    /// Does nothing if the cache is empty.
    pub fn remove_oldest(&mut self) {
        if let Some(key) = self.order.pop_back() {
            if let Some(value) = self.entries.remove(&key) {
                self.nbytes -= key.len() as u64 + value.byte_len() as u64;
                if let Some(callback) = self.on_evicted.as_mut() {
                    callback(&key, &value);
                }
            }
        }
    }

    // == Length ==
    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Used Bytes ==
    /// Returns the aggregate byte size of all live entries.
    pub fn used_bytes(&self) -> u64 {
        self.nbytes
    }

    // == Clear ==
    /// Evicts every entry, firing the eviction callback once per entry.
    pub fn clear(&mut self) {
        while !self.order.is_empty() {
            self.remove_oldest();
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("entries", &self.order.len())
            .finish()
    }
}
