//! Veridoc Server - HTTP REST API for plagiarism and AI-content analysis
//!
//! This crate exposes the veridoc pipeline over HTTP:
//!
//! - **Analysis**: full document analysis (plagiarism scoring + section-wise
//!   AI detection) from inline text or a fetched document URL, against
//!   inline references or scholarly-search candidates
//! - **Comparison**: direct two-document similarity breakdown
//! - **Reference Index**: insert and query the shared embedding index
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! # Features
//!
//! - API key authentication with per-key rate limiting
//! - Request ID tracking and structured request logging
//! - Environment and file based configuration
//! - Graceful shutdown on SIGTERM / Ctrl+C
//!
//! # API Endpoints
//!
//! ## Public (no authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected (API key required)
//!
//! - `POST /api/v1/analyze` - Analyze a document
//! - `POST /api/v1/compare` - Compare two documents
//! - `POST /api/v1/index/insert` - Insert a reference document
//! - `GET /api/v1/index/search` - Query the reference index

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::start_server;
pub use state::ServerState;
