use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use veridoc::IndexHit;

/// Insert request for the shared reference index
#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub doc_id: String,
    pub text: String,
}

/// Insert a reference document into the shared embedding index.
pub async fn insert_reference(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<InsertRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.doc_id.trim().is_empty() {
        return Err(ServerError::BadRequest("doc_id must not be empty".into()));
    }
    if request.text.trim().is_empty() {
        return Err(ServerError::BadRequest("text must not be empty".into()));
    }

    let entries = tokio::task::spawn_blocking(move || -> Result<usize, ServerError> {
        let mut index = state
            .index
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        index.insert(request.doc_id, &request.text)?;
        Ok(index.len())
    })
    .await
    .map_err(|err| ServerError::Internal(err.to_string()))??;

    Ok(Json(json!({ "inserted": true, "entries": entries })))
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub hits: Vec<IndexHit>,
}

/// Query the shared reference index by embedding similarity.
pub async fn search_references(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> ServerResult<impl IntoResponse> {
    let hits = tokio::task::spawn_blocking(move || -> Result<Vec<IndexHit>, ServerError> {
        let index = state
            .index
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(index.query(&params.query, params.top_n)?)
    })
    .await
    .map_err(|err| ServerError::Internal(err.to_string()))??;

    Ok(Json(SearchResponse {
        total: hits.len(),
        hits,
    }))
}
