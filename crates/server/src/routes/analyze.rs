use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use veridoc::{AnalysisOptions, AnalysisReport};

/// Analysis request.
///
/// Exactly one of `text` and `document_url` must be provided. References
/// come inline, or from scholarly search when `check_online_sources` is
/// set (requires configured search credentials).
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub document_url: Option<String>,

    /// Local reference documents to score against.
    #[serde(default)]
    pub references: Vec<String>,

    /// Discover candidates through scholarly search instead.
    #[serde(default)]
    pub check_online_sources: bool,

    /// Papers to retrieve per search provider.
    #[serde(default = "default_num_papers")]
    pub num_papers: usize,

    /// Thresholds, AI verdict threshold, index mode, concurrency.
    #[serde(default)]
    pub options: AnalysisOptions,
}

fn default_num_papers() -> usize {
    3
}

impl AnalyzeRequest {
    fn validate(&self) -> Result<(), ServerError> {
        match (&self.text, &self.document_url) {
            (None, None) => {
                return Err(ServerError::BadRequest(
                    "provide either `text` or `document_url`".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ServerError::BadRequest(
                    "`text` and `document_url` are mutually exclusive".into(),
                ))
            }
            _ => {}
        }
        self.options.validate()?;
        Ok(())
    }
}

/// Analyze a document for plagiarism and AI-generated content.
///
/// The pipeline is CPU- and network-bound (provider calls, optional
/// document fetch), so it runs on the blocking pool.
pub async fn analyze_document(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<AnalyzeRequest>,
) -> ServerResult<impl IntoResponse> {
    request.validate()?;
    metrics::counter!("veridoc_analyze_requests_total").increment(1);

    let report = tokio::task::spawn_blocking(move || run_analysis(state, request))
        .await
        .map_err(|err| ServerError::Internal(err.to_string()))??;

    metrics::counter!("veridoc_analyze_completed_total").increment(1);
    Ok(Json(report))
}

fn run_analysis(
    state: Arc<ServerState>,
    request: AnalyzeRequest,
) -> Result<AnalysisReport, ServerError> {
    let text = match (request.text, request.document_url) {
        (Some(text), _) => text,
        (None, Some(url)) => {
            let bytes = state.fetcher.fetch(&url)?;
            state.extractor.extract(&bytes)?
        }
        (None, None) => unreachable!("validated above"),
    };

    let report = if request.check_online_sources {
        state.analyzer.search_and_analyze(
            &state.searchers,
            state.fetcher.as_ref(),
            state.extractor.as_ref(),
            &text,
            request.num_papers,
            &request.options,
        )
    } else {
        state
            .analyzer
            .analyze_text(&text, &request.references, &request.options)
    };
    Ok(report)
}
