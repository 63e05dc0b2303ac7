//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies. Cache values
//! themselves are served as raw bytes, not JSON; these types cover the
//! operational endpoints.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// The group these counters belong to
    pub group: String,
    /// Number of local cache hits
    pub hits: u64,
    /// Number of local cache misses
    pub misses: u64,
    /// Number of entries evicted under the byte budget
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Aggregate byte size of all live entries
    pub used_bytes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a group's counters
    pub fn new(group: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            group: group.into(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
