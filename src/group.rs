//! Group Module
//!
//! A group is a named cache namespace tying together the local LRU cache,
//! the request coalescer, the peer picker, and the origin loader. The miss
//! pipeline runs: local hit -> owner peer fetch -> origin load.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, SharedCache};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::FlightGroup;

// == Loader ==
/// Loads a key's value from the origin when the cluster has no copy.
///
/// Implementations must be safe to call concurrently for distinct keys; for
/// one key, the group guarantees at most one concurrent invocation per node.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Returns the origin value bytes for `key`.
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts an async closure into a [`Loader`].
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>>> + Send,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key.to_string()).await
    }
}

// == Group ==
/// A named cache namespace.
///
/// Groups are normally created through a [`GroupRegistry`], which enforces
/// name uniqueness within the process.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: SharedCache,
    /// Bound at most once via `register_peers`
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: FlightGroup<Result<ByteView>>,
}

impl Group {
    // == Constructor ==
    /// Creates a group with a local cache bounded to `cache_bytes`.
    pub fn new(name: impl Into<String>, cache_bytes: u64, loader: Arc<dyn Loader>) -> Self {
        Self {
            name: name.into(),
            loader,
            main_cache: SharedCache::new(cache_bytes),
            peers: OnceLock::new(),
            flight: FlightGroup::new(),
        }
    }

    /// Returns the group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Binds the peer picker used to locate key owners.
    ///
    /// # Panics
    /// Panics when called more than once on the same group; re-binding is a
    /// programming error.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        if self.peers.set(picker).is_err() {
            panic!("register_peers called more than once on group '{}'", self.name);
        }
    }

    // == Get ==
    /// Retrieves the value for `key`, loading it on a local miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(view) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        self.load(key).await
    }

    // == Stats ==
    /// Returns a snapshot of the group's cache counters.
    pub fn stats(&self) -> CacheStats {
        self.main_cache.stats()
    }

    // == Load ==
    /// Runs the miss pipeline, coalescing concurrent loads of one key.
    async fn load(&self, key: &str) -> Result<ByteView> {
        let outcome = self.flight.run(key, || self.load_uncoalesced(key)).await;
        outcome.unwrap_or_else(|abandoned| Err(CacheError::Internal(abandoned.to_string())))
    }

    /// The pipeline body executed by the winning caller.
    async fn load_uncoalesced(&self, key: &str) -> Result<ByteView> {
        if let Some(picker) = self.peers.get() {
            if let Some(peer) = picker.pick_peer(key) {
                match self.get_from_peer(peer.as_ref(), key).await {
                    Ok(view) => return Ok(view),
                    Err(err) => {
                        warn!(group = %self.name, key, error = %err, "peer fetch failed, falling back to local load");
                    }
                }
            }
        }

        self.get_locally(key).await
    }

    /// Loads from the origin and populates the local cache.
    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await?;
        let view = ByteView::from(bytes);
        self.populate_cache(key, view.clone());
        Ok(view)
    }

    /// Fetches from the owner peer.
    ///
    /// The owner caches the value authoritatively; remote answers are not
    /// added to the local cache.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    fn populate_cache(&self, key: &str, view: ByteView) {
        self.main_cache.add(key, view);
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group").field("name", &self.name).finish()
    }
}

// == Group Registry ==
/// Owns the process's groups under a reader/writer lock.
///
/// Lookups run concurrently; registration is exclusive. The transport layer
/// receives a registry handle instead of reaching into process globals.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group.
    ///
    /// Returns [`CacheError::GroupExists`] when the name is already taken.
    pub async fn new_group(
        &self,
        name: &str,
        cache_bytes: u64,
        loader: Arc<dyn Loader>,
    ) -> Result<Arc<Group>> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(name) {
            return Err(CacheError::GroupExists(name.to_string()));
        }

        let group = Arc::new(Group::new(name, cache_bytes, loader));
        groups.insert(name.to_string(), Arc::clone(&group));
        Ok(group)
    }

    // == Get Group ==
    /// Looks up a group by name.
    pub async fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().await.get(name).cloned()
    }
}
