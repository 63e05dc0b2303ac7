//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache node.
///
/// The enum is `Clone` so a single load result can be delivered to every
/// caller coalesced onto the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Get was called with an empty key
    #[error("key is required")]
    EmptyKey,

    /// No group registered under the given name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// A group with the given name already exists
    #[error("group already registered: {0}")]
    GroupExists(String),

    /// The origin loader failed for a key
    #[error("loading key '{key}' failed: {reason}")]
    LoadFailed { key: String, reason: String },

    /// A peer fetch failed
    #[error("peer request failed: {0}")]
    PeerFetch(String),

    /// Internal node error
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        // Peer failures are recovered inside the load path (log and fall
        // back to the local loader), so `PeerFetch` normally never reaches
        // the transport; it is grouped with the internal errors.
        let status = match &self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::GroupExists(_) => StatusCode::CONFLICT,
            CacheError::LoadFailed { .. } | CacheError::PeerFetch(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
