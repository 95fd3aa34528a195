use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] veridoc::PipelineError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] veridoc::ExtractError),

    #[error("Provider error: {0}")]
    Provider(#[from] veridoc::ProviderError),

    #[error("Index error: {0}")]
    Index(#[from] veridoc::IndexError),

    #[error("Search error: {0}")]
    Search(#[from] veridoc::SearchError),

    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] veridoc::InvalidThresholds),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) | ServerError::InvalidOptions(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            // A query against an empty index is a caller sequencing error.
            ServerError::Index(veridoc::IndexError::EmptyIndex) => StatusCode::CONFLICT,
            ServerError::Pipeline(_)
            | ServerError::Extraction(_)
            | ServerError::Provider(_)
            | ServerError::Index(_)
            | ServerError::Search(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Pipeline(_) => "PIPELINE_ERROR",
            ServerError::Extraction(_) => "EXTRACTION_ERROR",
            ServerError::Provider(_) => "PROVIDER_ERROR",
            ServerError::Index(veridoc::IndexError::EmptyIndex) => "EMPTY_INDEX",
            ServerError::Index(_) => "INDEX_ERROR",
            ServerError::Search(_) => "SEARCH_ERROR",
            ServerError::InvalidOptions(_) => "INVALID_OPTIONS",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_maps_to_conflict() {
        let err = ServerError::Index(veridoc::IndexError::EmptyIndex);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "EMPTY_INDEX");
    }

    #[test]
    fn extraction_failures_are_unprocessable() {
        let err = ServerError::Extraction(veridoc::ExtractError::EmptyDocument);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
