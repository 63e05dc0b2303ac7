//! Configuration Module
//!
//! Handles loading and managing node configuration from environment
//! variables.

use std::env;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget for each group's local cache (0 = unbounded)
    pub cache_bytes: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL under which peers reach this node
    pub self_addr: String,
    /// Base URLs of every node in the cluster, including this one
    pub peers: Vec<String>,
    /// Directory the origin loader serves keys from
    pub data_dir: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Per-group cache budget in bytes (default: 67108864)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SELF_ADDR` - This node's base URL (default: http://127.0.0.1:8080)
    /// - `PEERS` - Comma-separated peer base URLs (default: empty, meaning
    ///   single-node mode)
    /// - `DATA_DIR` - Origin data directory (default: ./data)
    pub fn from_env() -> Self {
        Self {
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024 * 1024),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            self_addr: env::var("SELF_ADDR")
                .ok()
                .unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            peers: env::var("PEERS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            data_dir: env::var("DATA_DIR")
                .ok()
                .unwrap_or_else(|| "./data".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: 64 * 1024 * 1024,
            server_port: 8080,
            self_addr: "http://127.0.0.1:8080".to_string(),
            peers: Vec::new(),
            data_dir: "./data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_bytes, 64 * 1024 * 1024);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.self_addr, "http://127.0.0.1:8080");
        assert!(config.peers.is_empty());
        assert_eq!(config.data_dir, "./data");
    }

    #[test]
    fn test_config_peer_list_parsing() {
        env::set_var(
            "PEERS",
            "http://10.0.0.1:8080, http://10.0.0.2:8080 ,,http://10.0.0.3:8080",
        );

        let config = Config::from_env();
        assert_eq!(
            config.peers,
            vec![
                "http://10.0.0.1:8080".to_string(),
                "http://10.0.0.2:8080".to_string(),
                "http://10.0.0.3:8080".to_string(),
            ]
        );

        env::remove_var("PEERS");
    }
}
