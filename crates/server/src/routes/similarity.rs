use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use veridoc::Thresholds;

/// Compare two documents directly
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub doc1: DocumentInput,
    pub doc2: DocumentInput,
    /// Optional verdict threshold overrides.
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentInput {
    pub text: String,
}

/// Compare response: the three raw signals, the fused score, the verdict.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub overall_score: f64,
    pub semantic_similarity: f64,
    pub ngram_similarity: f64,
    pub fuzzy_similarity: f64,
    pub is_plagiarized: bool,
}

/// Compare two documents for similarity across all three metrics.
pub async fn compare_documents(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CompareRequest>,
) -> ServerResult<impl IntoResponse> {
    let thresholds = request.thresholds.unwrap_or_default();
    thresholds.validate()?;
    metrics::counter!("veridoc_compare_requests_total").increment(1);

    let breakdown = tokio::task::spawn_blocking(move || {
        state
            .analyzer
            .engine()
            .compare(&request.doc1.text, &request.doc2.text)
    })
    .await
    .map_err(|err| ServerError::Internal(err.to_string()))??;

    Ok(Json(CompareResponse {
        overall_score: breakdown.overall(),
        semantic_similarity: breakdown.semantic,
        ngram_similarity: breakdown.ngram,
        fuzzy_similarity: breakdown.fuzzy,
        is_plagiarized: breakdown.is_plagiarized(&thresholds),
    }))
}
