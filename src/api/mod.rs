//! API Module
//!
//! HTTP handlers and routing for the cache node.
//!
//! # Endpoints
//! - `GET /_kcache/:group/:key` - Retrieve a value by group and key
//! - `GET /stats/:group` - Get a group's cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
