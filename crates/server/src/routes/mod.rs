//! API route handlers
//!
//! - `health`: liveness, readiness, and Prometheus metrics
//! - `analyze`: full document analysis
//! - `similarity`: direct two-document comparison
//! - `index`: reference index management

pub mod analyze;
pub mod health;
pub mod index;
pub mod similarity;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /, unauthenticated).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Veridoc Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/analyze",
            "/api/v1/compare",
            "/api/v1/index/insert",
            "/api/v1/index/search",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
