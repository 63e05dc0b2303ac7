//! HTTP Peer Pool
//!
//! Ring-backed peer selection and the HTTP client used to fetch from the
//! selected owner.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::ring::HashRing;

// == Defaults ==
/// Path prefix under which nodes serve each other's cache requests.
pub const DEFAULT_BASE_PATH: &str = "/_kcache/";

/// Virtual replicas per node on the consistent-hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

// == HTTP Peer Client ==
/// Fetches values from one remote peer over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    /// `{peer}{base_path}`, ready for the group/key segments
    base_url: String,
    client: reqwest::Client,
}

impl HttpPeerClient {
    fn new(peer: &str, base_path: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: format!("{}{}", peer, base_path),
            client,
        }
    }
}

#[async_trait]
impl PeerGetter for HttpPeerClient {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CacheError::PeerFetch(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CacheError::PeerFetch(format!(
                "server returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| CacheError::PeerFetch(format!("reading response body: {}", err)))?;

        Ok(bytes.to_vec())
    }
}

// == HTTP Peer Pool ==
/// Maps ring-selected owners to concrete HTTP fetchers.
///
/// `set_peers` atomically replaces the ring and the per-peer clients under
/// one mutex; `pick_peer` only resolves the owner under that mutex, so the
/// network round-trip on the returned client happens outside the lock.
pub struct HttpPeerPool {
    /// This node's base URL, as it appears in the peer list
    self_addr: String,
    base_path: String,
    state: Mutex<PoolState>,
}

struct PoolState {
    ring: HashRing,
    clients: HashMap<String, Arc<HttpPeerClient>>,
}

impl HttpPeerPool {
    // == Constructor ==
    /// Creates an empty pool for the node reachable at `self_addr`.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self::with_base_path(self_addr, DEFAULT_BASE_PATH)
    }

    /// Creates an empty pool serving under a custom base path.
    ///
    /// The base path must start and end with `/`.
    pub fn with_base_path(self_addr: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: base_path.into(),
            state: Mutex::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS),
                clients: HashMap::new(),
            }),
        }
    }

    // == Set Peers ==
    /// Replaces the peer list, rebuilding the ring and the fetchers.
    ///
    /// The list should include this node's own address so that local
    /// ownership is represented on the ring.
    pub fn set_peers<S: AsRef<str>>(&self, peers: &[S]) {
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(peers);

        let client = reqwest::Client::new();
        let clients = peers
            .iter()
            .map(|peer| {
                let peer = peer.as_ref();
                (
                    peer.to_string(),
                    Arc::new(HttpPeerClient::new(peer, &self.base_path, client.clone())),
                )
            })
            .collect();

        *self.state.lock() = PoolState { ring, clients };
    }

    /// Returns the path prefix this pool's peers serve under.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl PeerPicker for HttpPeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let owner = state.ring.get(key)?;
        if owner == self.self_addr {
            return None;
        }

        debug!(peer = owner, key, "picked peer");
        state
            .clients
            .get(owner)
            .map(|client| Arc::clone(client) as Arc<dyn PeerGetter>)
    }
}

impl std::fmt::Debug for HttpPeerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPeerPool")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.base_path)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const SELF_ADDR: &str = "http://127.0.0.1:9001";
    const OTHER_ADDR: &str = "http://127.0.0.1:9002";

    #[test]
    fn test_pool_empty_picks_nobody() {
        let pool = HttpPeerPool::new(SELF_ADDR);
        assert!(pool.pick_peer("any-key").is_none());
    }

    #[test]
    fn test_pool_single_node_is_always_self() {
        let pool = HttpPeerPool::new(SELF_ADDR);
        pool.set_peers(&[SELF_ADDR]);

        for i in 0..50 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_pool_avoids_self_exactly_when_ring_says_so() {
        let pool = HttpPeerPool::new(SELF_ADDR);
        pool.set_peers(&[SELF_ADDR, OTHER_ADDR]);

        // Mirror the pool's ring to predict ownership per key.
        let mut expected = HashRing::new(DEFAULT_REPLICAS);
        expected.add(&[SELF_ADDR, OTHER_ADDR]);

        let mut remote_picks = 0;
        for i in 0..200 {
            let key = format!("key{}", i);
            let picked = pool.pick_peer(&key);
            match expected.get(&key) {
                Some(owner) if owner == SELF_ADDR => assert!(picked.is_none(), "key {}", key),
                Some(_) => {
                    assert!(picked.is_some(), "key {}", key);
                    remote_picks += 1;
                }
                None => unreachable!("ring is non-empty"),
            }
        }

        // With 50 replicas each, both nodes own a share of the keyspace.
        assert!(remote_picks > 0);
        assert!(remote_picks < 200);
    }

    #[test]
    fn test_pool_set_peers_replaces_the_ring() {
        let pool = HttpPeerPool::new(SELF_ADDR);
        pool.set_peers(&[SELF_ADDR, OTHER_ADDR]);

        // Shrinking back to a single node makes every key local again.
        pool.set_peers(&[SELF_ADDR]);
        for i in 0..50 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_client_url_shape() {
        let client = HttpPeerClient::new(OTHER_ADDR, DEFAULT_BASE_PATH, reqwest::Client::new());
        assert_eq!(client.base_url, format!("{}/_kcache/", OTHER_ADDR));
    }
}
