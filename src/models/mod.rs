//! Models Module
//!
//! Response DTOs for the operational HTTP endpoints.

pub mod responses;

pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
