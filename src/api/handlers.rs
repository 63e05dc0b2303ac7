//! API Handlers
//!
//! HTTP request handlers for the cache node endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{ErrorResponse, HealthResponse, StatsResponse};

// == App State ==
/// Application state shared across all handlers.
///
/// Holds the group registry; the transport queries it per request instead of
/// keeping back-references to individual groups.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide name -> group mapping
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }
}

/// Handler for GET `/_kcache/{group}/{key}`
///
/// Serves the raw value bytes for a key, loading it through the group's miss
/// pipeline when necessary. This is both the client-facing read path and the
/// endpoint peers fetch from.
pub async fn cache_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response> {
    let group = state
        .registry
        .get_group(&group_name)
        .await
        .ok_or_else(|| CacheError::GroupNotFound(group_name.clone()))?;

    let view = group.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.to_bytes(),
    )
        .into_response())
}

/// Fallback for requests under the cache base path that do not match
/// `/{group}/{key}`.
pub async fn malformed_path_handler() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("bad request")),
    )
        .into_response()
}

/// Handler for GET `/stats/{group}`
///
/// Returns the group's cache counters.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state
        .registry
        .get_group(&group_name)
        .await
        .ok_or_else(|| CacheError::GroupNotFound(group_name.clone()))?;

    Ok(Json(StatsResponse::new(group.name(), group.stats())))
}

/// Handler for GET `/health`
///
/// Returns health status of the node.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
