//! Cache Module
//!
//! Provides the immutable byte view, the byte-bounded LRU engine, and the
//! thread-safe shared cache that backs each group.

mod byte_view;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byte_view::ByteView;
pub use lru::{ByteSized, LruCache};
pub use stats::CacheStats;
pub use store::SharedCache;
