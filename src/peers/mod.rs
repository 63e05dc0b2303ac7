//! Peers Module
//!
//! Capabilities for locating the owner of a key and fetching from it, plus
//! the HTTP-backed implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

mod http;

pub use http::{HttpPeerClient, HttpPeerPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

// == Peer Getter ==
/// Fetches the raw value of a key in a group from one specific peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Returns the value bytes for `key` in `group` on this peer.
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

// == Peer Picker ==
/// Locates the peer owning a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owner's fetcher, or `None` when the owner is the local
    /// node or no peers are registered.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
