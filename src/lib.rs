//! # veridoc
//!
//! Multi-signal plagiarism and AI-content scoring for academic documents.
//!
//! This umbrella crate stitches the pipeline together so callers can go
//! from a raw document to a full analysis with a single API entry point:
//!
//! 1. acquisition and cleanup (`vdoc_ingest`),
//! 2. section segmentation (`vdoc_segment`),
//! 3. multi-signal similarity scoring over reference candidates
//!    (`vdoc_similarity`, `vdoc_index`, `vdoc_score`),
//! 4. section-weighted AI aggregation (`vdoc_detect`),
//! 5. optional candidate discovery through scholarly search
//!    (`vdoc_search`).
//!
//! Model inference never happens here: embeddings and classifications come
//! from the capability providers injected into [`Analyzer`], so the whole
//! pipeline runs offline against the deterministic stubs in
//! `vdoc_providers`.

pub use vdoc_detect::{
    analyze_sections, DocumentAiReport, SectionAiResult, SectionFailure, DEFAULT_AI_THRESHOLD,
    MIN_SECTION_WORDS,
};
pub use vdoc_index::{EmbedIndex, IndexEntry, IndexError, IndexHit};
pub use vdoc_ingest::{
    clean_text, DocumentFetcher, ExtractError, HttpDocumentFetcher, TextExtractor,
    Utf8TextExtractor,
};
pub use vdoc_providers::{
    CachedEmbedder, Classification, ClassifierProvider, EmbeddingProvider, HttpClassifier,
    HttpClassifierConfig, HttpEmbedder, HttpEmbedderConfig, ProviderError, StubClassifier,
    StubEmbedder, MIN_CLASSIFIABLE_CHARS,
};
pub use vdoc_score::{
    attach_paper_info, best_match, overall_plagiarism_score, score, PaperInfo, ReferenceId,
    ScoreFailure, ScoreOptions, ScoreReport, SimilarityResult, TOP_RESULT_WINDOW,
};
pub use vdoc_search::{
    extract_keywords, gather_candidates, BibliographicSearch, CandidateDocument, CandidatePaper,
    CoreSearch, ScholarSearch, SearchError,
};
pub use vdoc_segment::{segment, section_texts, Section, SectionSpan};
pub use vdoc_similarity::{
    clamp_unit, cosine_similarity, fuzzy_similarity, ngram_similarity, preprocess,
    InvalidThresholds, SimilarityBreakdown, SimilarityEngine, Thresholds,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can abort a whole analysis request.
///
/// Only acquisition failures are request-fatal in practice: provider and
/// search failures inside the pipeline isolate per reference or per section
/// and surface as smaller result sets instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document acquisition failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("provider failure: {0}")]
    Provider(#[from] ProviderError),
    #[error("index failure: {0}")]
    Index(#[from] IndexError),
    #[error("search failure: {0}")]
    Search(#[from] SearchError),
}

/// Per-request analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Similarity verdict thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Document-level AI verdict threshold.
    #[serde(default = "AnalysisOptions::default_ai_threshold")]
    pub ai_threshold: f64,
    /// Route reference comparison through the embedding index.
    #[serde(default)]
    pub use_index: bool,
    /// Nearest-neighbor count for the index mode.
    #[serde(default = "AnalysisOptions::default_index_top_n")]
    pub index_top_n: usize,
    /// Bound on worker threads for the per-reference fan-out.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl AnalysisOptions {
    fn default_ai_threshold() -> f64 {
        DEFAULT_AI_THRESHOLD
    }

    fn default_index_top_n() -> usize {
        5
    }

    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        self.score_options().validate()?;
        if !(0.0..=1.0).contains(&self.ai_threshold) {
            return Err(InvalidThresholds(format!(
                "ai_threshold must be between 0.0 and 1.0 (got {})",
                self.ai_threshold
            )));
        }
        Ok(())
    }

    fn score_options(&self) -> ScoreOptions {
        ScoreOptions {
            thresholds: self.thresholds,
            use_index: self.use_index,
            index_top_n: self.index_top_n,
            max_concurrency: self.max_concurrency,
        }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            ai_threshold: Self::default_ai_threshold(),
            use_index: false,
            index_top_n: Self::default_index_top_n(),
            max_concurrency: None,
        }
    }
}

/// Combined outcome of one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub message: String,
    pub sections: BTreeMap<Section, String>,
    pub plagiarism_results: Vec<SimilarityResult>,
    pub ai_detection: DocumentAiReport,
    pub total_word_count: usize,
    pub plagiarism_overall_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_match: Option<SimilarityResult>,
    pub timestamp: DateTime<Utc>,
}

/// End-to-end analysis pipeline over injected capability providers.
#[derive(Clone)]
pub struct Analyzer {
    engine: SimilarityEngine,
    classifier: Arc<dyn ClassifierProvider>,
}

impl Analyzer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        classifier: Arc<dyn ClassifierProvider>,
    ) -> Self {
        Self {
            engine: SimilarityEngine::new(embedder),
            classifier,
        }
    }

    /// The pairwise similarity engine, for direct document comparison.
    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Analyze text against a fixed local reference set.
    ///
    /// Zero references is a valid request: the plagiarism result set is
    /// empty, the document score 0.0, the best match absent, and the
    /// request still succeeds.
    pub fn analyze_text(
        &self,
        text: &str,
        references: &[String],
        opts: &AnalysisOptions,
    ) -> AnalysisReport {
        self.analyze_inner(text, references, None, opts)
    }

    /// Analyze against externally discovered candidates, attaching their
    /// provenance to each result by positional correspondence.
    pub fn analyze_with_candidates(
        &self,
        text: &str,
        candidates: &[CandidateDocument],
        opts: &AnalysisOptions,
    ) -> AnalysisReport {
        let references: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let sources: Vec<PaperInfo> = candidates
            .iter()
            .map(|c| paper_info_from_candidate(&c.paper))
            .collect();
        self.analyze_inner(text, &references, Some(&sources), opts)
    }

    /// Fetch a document by locator, extract its text, and analyze it.
    ///
    /// Acquisition failures are fatal to the request and surface as a
    /// single [`PipelineError::Extraction`].
    pub fn analyze_document(
        &self,
        fetcher: &dyn DocumentFetcher,
        extractor: &dyn TextExtractor,
        locator: &str,
        references: &[String],
        opts: &AnalysisOptions,
    ) -> Result<AnalysisReport, PipelineError> {
        let bytes = fetcher.fetch(locator)?;
        let text = extractor.extract(&bytes)?;
        Ok(self.analyze_text(&text, references, opts))
    }

    /// Discover candidates through scholarly search, then analyze against
    /// them. An empty search outcome yields an empty plagiarism result set
    /// with `success` still true.
    pub fn search_and_analyze(
        &self,
        searchers: &[Box<dyn BibliographicSearch>],
        fetcher: &dyn DocumentFetcher,
        extractor: &dyn TextExtractor,
        text: &str,
        per_source: usize,
        opts: &AnalysisOptions,
    ) -> AnalysisReport {
        let candidates = gather_candidates(searchers, fetcher, extractor, text, per_source);
        self.analyze_with_candidates(text, &candidates, opts)
    }

    fn analyze_inner(
        &self,
        text: &str,
        references: &[String],
        sources: Option<&[PaperInfo]>,
        opts: &AnalysisOptions,
    ) -> AnalysisReport {
        let cleaned = clean_text(text);
        let spans = segment(&cleaned);
        let sections = section_texts(&cleaned, &spans);
        tracing::debug!(
            sections = sections.len(),
            references = references.len(),
            use_index = opts.use_index,
            "analysis started"
        );

        // The scorer sees the concatenated section texts; the aggregator
        // sees the per-section map.
        let full_text = sections
            .values()
            .filter(|section_text| !section_text.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let total_word_count = full_text.split_whitespace().count();

        let mut score_report = score(&self.engine, &full_text, references, &opts.score_options());
        if let Some(sources) = sources {
            attach_paper_info(&mut score_report.results, sources);
        }

        let ai_detection = analyze_sections(self.classifier.as_ref(), &sections, opts.ai_threshold);
        let plagiarism_overall_score = overall_plagiarism_score(&score_report.results);
        let highest_match = best_match(&score_report.results).cloned();
        let message = build_message(&score_report, &ai_detection);

        AnalysisReport {
            success: true,
            message,
            sections,
            plagiarism_results: score_report.results,
            ai_detection,
            total_word_count,
            plagiarism_overall_score,
            highest_match,
            timestamp: Utc::now(),
        }
    }
}

/// Convert a search hit's provenance to the result-level metadata shape.
pub fn paper_info_from_candidate(paper: &CandidatePaper) -> PaperInfo {
    PaperInfo {
        title: paper.title.clone(),
        link: paper.link.clone(),
        source: paper.source.clone(),
        author: paper.author.clone().unwrap_or_default(),
    }
}

fn build_message(score_report: &ScoreReport, ai_detection: &DocumentAiReport) -> String {
    let mut message = String::from("Plagiarism and AI detection completed");
    if !score_report.failures.is_empty() {
        message.push_str(&format!(
            "; skipped {} reference comparison(s)",
            score_report.failures.len()
        ));
    }
    if !ai_detection.failures.is_empty() {
        message.push_str(&format!(
            "; skipped {} section classification(s)",
            ai_detection.failures.len()
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(StubEmbedder::default()), Arc::new(StubClassifier))
    }

    const PAPER: &str = "A Survey of Borrowed Ideas\n\
        Abstract\n\
        This paper surveys how borrowed ideas circulate through academic writing and when reuse becomes misconduct.\n\
        Introduction\n\
        Attribution norms differ across fields but the underlying expectation of honesty does not change much.\n\
        Conclusion\n\
        Careful citation practice remains the strongest safeguard against accidental plagiarism in any field.";

    #[test]
    fn full_analysis_produces_a_consistent_report() {
        let references = vec![
            "This paper surveys how borrowed ideas circulate through academic writing and when \
             reuse becomes misconduct."
                .to_string(),
            "An unrelated treatise on database transaction isolation levels and snapshot \
             semantics."
                .to_string(),
        ];
        let report = analyzer().analyze_text(PAPER, &references, &AnalysisOptions::default());

        assert!(report.success);
        assert!(report.sections.contains_key(&Section::Title));
        assert!(report.sections.contains_key(&Section::Abstract));
        assert!(report.sections.contains_key(&Section::Introduction));
        assert!(report.sections.contains_key(&Section::Conclusion));

        assert_eq!(report.plagiarism_results.len(), 2);
        let top = report.highest_match.as_ref().unwrap();
        assert_eq!(top.overall_score, report.plagiarism_results[0].overall_score);
        assert!(report.total_word_count > 0);
        assert!(report.plagiarism_overall_score > 0.0);
    }

    #[test]
    fn zero_references_still_succeeds() {
        let report = analyzer().analyze_text(PAPER, &[], &AnalysisOptions::default());
        assert!(report.success);
        assert!(report.plagiarism_results.is_empty());
        assert_eq!(report.plagiarism_overall_score, 0.0);
        assert!(report.highest_match.is_none());
    }

    #[test]
    fn candidate_mode_attaches_provenance_positionally() {
        let candidates = vec![CandidateDocument {
            text: "This paper surveys how borrowed ideas circulate through academic writing and \
                   when reuse becomes misconduct."
                .to_string(),
            paper: CandidatePaper {
                title: "Borrowed Ideas".into(),
                link: "https://example.org/borrowed".into(),
                source: "Test".into(),
                author: Some("B. Author".into()),
                abstract_text: None,
            },
        }];
        let report =
            analyzer().analyze_with_candidates(PAPER, &candidates, &AnalysisOptions::default());
        let info = report.plagiarism_results[0].paper_info.as_ref().unwrap();
        assert_eq!(info.title, "Borrowed Ideas");
        assert_eq!(info.author, "B. Author");
    }

    #[test]
    fn failed_fetch_is_request_fatal() {
        struct DeadFetcher;
        impl DocumentFetcher for DeadFetcher {
            fn fetch(&self, _locator: &str) -> Result<Vec<u8>, ExtractError> {
                Err(ExtractError::Fetch("connection refused".into()))
            }
        }

        let err = analyzer()
            .analyze_document(
                &DeadFetcher,
                &Utf8TextExtractor,
                "https://dead.example/doc",
                &[],
                &AnalysisOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }

    #[test]
    fn options_validation_covers_the_ai_threshold() {
        let mut opts = AnalysisOptions::default();
        assert!(opts.validate().is_ok());
        opts.ai_threshold = 1.5;
        assert!(opts.validate().is_err());
    }
}
