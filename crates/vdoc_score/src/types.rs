use serde::{Deserialize, Serialize};
use vdoc_similarity::{InvalidThresholds, SimilarityBreakdown, Thresholds};

/// Identifies the reference a result was scored against: its position in
/// the caller's input list, or its identifier when sourced from an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceId {
    Position(usize),
    Document(String),
}

/// Provenance metadata for an externally discovered reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub title: String,
    pub link: String,
    pub source: String,
    pub author: String,
}

impl PaperInfo {
    /// Graceful-degradation value when provenance cannot be established.
    pub fn unknown() -> Self {
        Self {
            title: "Unknown".into(),
            link: String::new(),
            source: "Unknown".into(),
            author: String::new(),
        }
    }
}

/// One ranked comparison outcome. Immutable once produced: the fused
/// `overall_score` is always exactly the fixed linear combination of the
/// three component scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub reference_id: ReferenceId,
    pub is_plagiarized: bool,
    pub overall_score: f64,
    pub semantic_similarity: f64,
    pub ngram_similarity: f64,
    pub fuzzy_similarity: f64,
    pub reference_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_info: Option<PaperInfo>,
}

impl SimilarityResult {
    pub(crate) fn from_breakdown(
        reference_id: ReferenceId,
        breakdown: SimilarityBreakdown,
        thresholds: &Thresholds,
        reference_text: String,
    ) -> Self {
        Self {
            reference_id,
            is_plagiarized: breakdown.is_plagiarized(thresholds),
            overall_score: breakdown.overall(),
            semantic_similarity: breakdown.semantic,
            ngram_similarity: breakdown.ngram,
            fuzzy_similarity: breakdown.fuzzy,
            reference_text,
            paper_info: None,
        }
    }
}

/// A reference that could not be scored, and why. The batch keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFailure {
    pub reference_id: ReferenceId,
    pub error: String,
}

/// Scoring outcome: ranked results plus the references that were skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreReport {
    pub results: Vec<SimilarityResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ScoreFailure>,
}

/// Per-request scoring configuration.
///
/// Cheap to clone and serde-friendly so it can ride inside higher-level
/// request types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// Verdict thresholds, independently overridable.
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Route comparisons through the embedding index instead of comparing
    /// against every reference directly.
    #[serde(default)]
    pub use_index: bool,
    /// How many nearest neighbors the index mode considers.
    #[serde(default = "ScoreOptions::default_index_top_n")]
    pub index_top_n: usize,
    /// Upper bound on worker threads for the per-reference fan-out.
    /// `None` runs sequentially. Result ordering is identical either way.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl ScoreOptions {
    pub(crate) fn default_index_top_n() -> usize {
        5
    }

    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        self.thresholds.validate()?;
        if self.use_index && self.index_top_n == 0 {
            return Err(InvalidThresholds(
                "index_top_n must be greater than zero when use_index is set".into(),
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(InvalidThresholds(
                "max_concurrency must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            use_index: false,
            index_top_n: Self::default_index_top_n(),
            max_concurrency: None,
        }
    }
}
