use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use once_cell::sync::OnceCell;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Prometheus render handle, installed once during startup.
static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Record the installed Prometheus handle for the /metrics route.
pub fn set_metrics_handle(handle: PrometheusHandle) {
    let _ = METRICS_HANDLE.set(handle);
}

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "veridoc-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let indexed = state
        .index
        .read()
        .map(|index| index.len())
        .unwrap_or_default();

    Ok(Json(json!({
        "status": "ready",
        "service": "veridoc-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "analyzer": "ready",
            "index_entries": indexed,
            "search_providers": state.searchers.len(),
        }
    })))
}

/// Prometheus metrics endpoint
pub async fn metrics() -> impl IntoResponse {
    match METRICS_HANDLE.get() {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}
