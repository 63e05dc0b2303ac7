//! API Routes
//!
//! Configures the Axum router with the cache node endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::peers::DEFAULT_BASE_PATH;

use super::handlers::{
    cache_handler, health_handler, malformed_path_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /_kcache/:group/:key` - Retrieve a value (peers fetch here too)
/// - `GET /stats/:group` - Get a group's cache statistics
/// - `GET /health` - Health check endpoint
///
/// Requests under the cache base path that do not match `/:group/:key` get
/// a 400 response.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cache_routes = Router::new()
        .route("/:group/:key", get(cache_handler))
        .fallback(malformed_path_handler);

    // Build router with all endpoints
    Router::new()
        .nest(DEFAULT_BASE_PATH.trim_end_matches('/'), cache_routes)
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
