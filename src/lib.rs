//! kCache - A distributed in-memory key/value cache
//!
//! Organizes cached data into named groups, each with its own byte-bounded
//! LRU cache, origin loader and request coalescer. Nodes cooperate through a
//! consistent-hash ring so every key has a single authoritative owner.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::CacheError;
pub use group::{Group, GroupRegistry, Loader, LoaderFn};
pub use peers::{HttpPeerPool, PeerGetter, PeerPicker, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
