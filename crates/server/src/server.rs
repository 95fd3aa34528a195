//! Server initialization and routing
//!
//! Axum router setup, middleware stack, Prometheus recorder installation,
//! and graceful shutdown handling.

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{analyze, health, index, similarity};
use crate::routes::{api_info, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready, /metrics (no auth required)
/// - Protected routes: all /api/v1/* endpoints (API key required)
fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics));

    let protected_routes = Router::new()
        .route("/api/v1/analyze", post(analyze::analyze_document))
        .route("/api/v1/compare", post(similarity::compare_documents))
        .route("/api/v1/index/insert", post(index::insert_reference))
        .route("/api/v1/index/search", get(index::search_references))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the veridoc HTTP server
///
/// Blocks until shutdown via SIGTERM or Ctrl+C. Initialization order:
/// structured JSON logging, Prometheus recorder (when metrics are enabled),
/// shared state (analyzer, index, rate limiter), router, TCP bind.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    if config.metrics_enabled {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => health::set_metrics_handle(handle),
            Err(err) => tracing::warn!(error = %err, "metrics recorder unavailable"),
        }
    }

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting veridoc server on {} with {} API keys",
        addr,
        config.api_keys.len()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Rate limit: {} req/min",
        config.timeout_secs,
        config.max_body_size_mb,
        config.rate_limit_per_minute
    );
    tracing::info!(
        "Embedder: {}, Classifier: {}, CORS: {}",
        config.embedder.mode,
        config.classifier.mode,
        config.enable_cors
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
