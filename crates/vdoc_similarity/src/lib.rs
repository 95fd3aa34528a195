//! # Similarity Engine
//!
//! Computes three independent similarity signals between two text spans and
//! fuses them into one score plus a boolean verdict:
//!
//! - **Semantic** — cosine similarity between embedding vectors from the
//!   injected [`EmbeddingProvider`], clipped to [0, 1]. Catches
//!   paraphrase and rewording.
//! - **N-gram fingerprint** — Jaccard index over hashed 5-word shingles.
//!   Catches near-verbatim copying.
//! - **Fuzzy token** — token-sort ratio. Catches reordered sentences.
//!
//! Fusion is a fixed linear combination (`0.5·semantic + 0.3·ngram +
//! 0.2·fuzzy`), defined once in [`SimilarityBreakdown::overall`] and never
//! recomputed elsewhere. The verdict uses OR semantics: any single metric
//! crossing its threshold flags the pair.
//!
//! The engine never fails on malformed-but-non-empty text; only embedding
//! provider failures propagate, and those fail exactly one comparison.

mod metrics;

pub use metrics::{
    clamp_unit, cosine_similarity, fuzzy_similarity, ngram_similarity, preprocess, SHINGLE_SIZE,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vdoc_providers::{EmbeddingProvider, ProviderError};

/// Weight of the semantic signal in the fused score.
pub const SEMANTIC_WEIGHT: f64 = 0.5;
/// Weight of the n-gram fingerprint signal in the fused score.
pub const NGRAM_WEIGHT: f64 = 0.3;
/// Weight of the fuzzy token signal in the fused score.
pub const FUZZY_WEIGHT: f64 = 0.2;

/// The three raw similarity signals for one comparison, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    pub semantic: f64,
    pub ngram: f64,
    pub fuzzy: f64,
}

impl SimilarityBreakdown {
    /// The fused score. This is the single definition of the weighting;
    /// every produced score is exactly this combination.
    pub fn overall(&self) -> f64 {
        SEMANTIC_WEIGHT * self.semantic + NGRAM_WEIGHT * self.ngram + FUZZY_WEIGHT * self.fuzzy
    }

    /// Verdict with OR semantics: one metric over its threshold suffices.
    pub fn is_plagiarized(&self, thresholds: &Thresholds) -> bool {
        self.semantic >= thresholds.semantic
            || self.ngram >= thresholds.ngram
            || self.fuzzy >= thresholds.fuzzy
    }
}

/// Per-metric verdict thresholds, independently overridable by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "Thresholds::default_semantic")]
    pub semantic: f64,
    #[serde(default = "Thresholds::default_ngram")]
    pub ngram: f64,
    #[serde(default = "Thresholds::default_fuzzy")]
    pub fuzzy: f64,
}

impl Thresholds {
    pub(crate) fn default_semantic() -> f64 {
        0.85
    }

    pub(crate) fn default_ngram() -> f64 {
        0.40
    }

    pub(crate) fn default_fuzzy() -> f64 {
        0.70
    }

    /// Every threshold must lie in [0, 1].
    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        for (name, value) in [
            ("semantic", self.semantic),
            ("ngram", self.ngram),
            ("fuzzy", self.fuzzy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidThresholds(format!(
                    "{name} threshold must be between 0.0 and 1.0 (got {value})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            semantic: Self::default_semantic(),
            ngram: Self::default_ngram(),
            fuzzy: Self::default_fuzzy(),
        }
    }
}

/// A threshold fell outside [0, 1].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid thresholds: {0}")]
pub struct InvalidThresholds(pub String);

/// Pairwise comparison engine over an injected embedding provider.
#[derive(Clone)]
pub struct SimilarityEngine {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SimilarityEngine {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Shared handle to the underlying embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Compare two texts across all three metrics.
    ///
    /// Preprocessing (lowercase, collapse whitespace, trim) applies before
    /// every metric. One embedding call per side; an embedding failure fails
    /// only this comparison.
    pub fn compare(&self, a: &str, b: &str) -> Result<SimilarityBreakdown, ProviderError> {
        let a = preprocess(a);
        let b = preprocess(b);
        let embedding_a = self.embedder.embed(&a)?;
        let embedding_b = self.embedder.embed(&b)?;
        let semantic = clamp_unit(cosine_similarity(&embedding_a, &embedding_b));
        Ok(SimilarityBreakdown {
            semantic,
            ngram: ngram_similarity(&a, &b),
            fuzzy: fuzzy_similarity(&a, &b),
        })
    }

    /// Compare using an already-computed semantic score (clipped here), as
    /// when the semantic signal comes out of an index query. Computes only
    /// the lexical metrics; cannot fail.
    pub fn compare_with_semantic(&self, semantic: f64, a: &str, b: &str) -> SimilarityBreakdown {
        let a = preprocess(a);
        let b = preprocess(b);
        SimilarityBreakdown {
            semantic: clamp_unit(semantic),
            ngram: ngram_similarity(&a, &b),
            fuzzy: fuzzy_similarity(&a, &b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdoc_providers::StubEmbedder;

    fn engine() -> SimilarityEngine {
        SimilarityEngine::new(Arc::new(StubEmbedder::default()))
    }

    const PROSE: &str =
        "The borrow checker enforces aliasing rules so data races are compile time errors";

    #[test]
    fn identical_texts_score_one_everywhere() {
        let breakdown = engine().compare(PROSE, PROSE).unwrap();
        assert!((breakdown.semantic - 1.0).abs() < 1e-6);
        assert_eq!(breakdown.ngram, 1.0);
        assert_eq!(breakdown.fuzzy, 1.0);
        assert!((breakdown.overall() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overall_is_the_fixed_linear_combination() {
        let breakdown = SimilarityBreakdown {
            semantic: 0.9,
            ngram: 0.5,
            fuzzy: 0.1,
        };
        let expected = 0.5 * 0.9 + 0.3 * 0.5 + 0.2 * 0.1;
        assert!((breakdown.overall() - expected).abs() < 1e-9);
    }

    #[test]
    fn verdict_uses_or_semantics() {
        let thresholds = Thresholds::default();
        // Only the ngram metric crosses; that alone must flag the pair.
        let breakdown = SimilarityBreakdown {
            semantic: 0.1,
            ngram: 0.45,
            fuzzy: 0.2,
        };
        assert!(breakdown.is_plagiarized(&thresholds));

        let below = SimilarityBreakdown {
            semantic: 0.84,
            ngram: 0.39,
            fuzzy: 0.69,
        };
        assert!(!below.is_plagiarized(&thresholds));
    }

    #[test]
    fn thresholds_are_overridable_and_validated() {
        let thresholds = Thresholds {
            semantic: 0.5,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_ok());
        let breakdown = SimilarityBreakdown {
            semantic: 0.6,
            ngram: 0.0,
            fuzzy: 0.0,
        };
        assert!(breakdown.is_plagiarized(&thresholds));

        let bad = Thresholds {
            ngram: 1.5,
            ..Thresholds::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn preprocessing_makes_case_and_spacing_irrelevant() {
        let noisy = "The  BORROW checker\nenforces aliasing rules so data races are compile time errors";
        let breakdown = engine().compare(PROSE, noisy).unwrap();
        assert_eq!(breakdown.ngram, 1.0);
        assert_eq!(breakdown.fuzzy, 1.0);
    }

    #[test]
    fn precomputed_semantic_path_clips_and_matches_lexical_metrics() {
        let engine = engine();
        let direct = engine.compare(PROSE, PROSE).unwrap();
        let precomputed = engine.compare_with_semantic(1.3, PROSE, PROSE);
        assert_eq!(precomputed.semantic, 1.0);
        assert_eq!(precomputed.ngram, direct.ngram);
        assert_eq!(precomputed.fuzzy, direct.fuzzy);
    }

    #[test]
    fn malformed_text_degrades_instead_of_failing() {
        let breakdown = engine().compare("@@@@ ???? !!!!", PROSE).unwrap();
        // Too few tokens for a shingle: the fingerprint signal is zero, and
        // everything stays inside the unit interval.
        assert_eq!(breakdown.ngram, 0.0);
        for value in [breakdown.semantic, breakdown.fuzzy, breakdown.overall()] {
            assert!((0.0..=1.0).contains(&value), "got {value}");
        }
    }
}
