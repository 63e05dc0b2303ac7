//! kCache - A distributed in-memory key/value cache node
//!
//! Serves a filesystem-backed cache group over HTTP and cooperates with
//! peer nodes through a consistent-hash ring.

mod api;
mod cache;
mod config;
mod error;
mod group;
mod models;
mod peers;
mod ring;
mod singleflight;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use error::{CacheError, Result};
use group::{GroupRegistry, Loader};
use peers::HttpPeerPool;

/// Name of the group the node binary serves.
const GROUP_NAME: &str = "default";

// == Filesystem Loader ==
/// Origin loader serving `DATA_DIR/<key>` file contents.
struct FsLoader {
    root: PathBuf,
}

#[async_trait]
impl Loader for FsLoader {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        // Keys are plain file names; anything that could walk out of the
        // data directory is rejected.
        if key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(CacheError::LoadFailed {
                key: key.to_string(),
                reason: "invalid key".to_string(),
            });
        }

        tokio::fs::read(self.root.join(key))
            .await
            .map_err(|err| CacheError::LoadFailed {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Main entry point for the kCache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the filesystem-backed group
/// 4. Wire the consistent-hash peer pool from the configured peer list
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kCache node");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_bytes={}, port={}, self_addr={}, peers={}, data_dir={}",
        config.cache_bytes,
        config.server_port,
        config.self_addr,
        config.peers.len(),
        config.data_dir
    );

    // Register the node's cache group over the filesystem origin
    let registry = Arc::new(GroupRegistry::new());
    let loader = Arc::new(FsLoader {
        root: PathBuf::from(&config.data_dir),
    });
    let group = registry
        .new_group(GROUP_NAME, config.cache_bytes, loader)
        .await
        .expect("fresh registry has no duplicate groups");
    info!("Group '{}' registered", GROUP_NAME);

    // Wire the peer pool when running as part of a cluster
    if !config.peers.is_empty() {
        let pool = Arc::new(HttpPeerPool::new(config.self_addr.clone()));
        pool.set_peers(&config.peers);
        group.register_peers(pool);
        info!("Peer pool configured with {} nodes", config.peers.len());
    }

    // Create router with all endpoints
    let app = create_router(AppState::new(Arc::clone(&registry)));

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Node listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Node shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
