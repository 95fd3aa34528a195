//! # Capability Providers
//!
//! The scoring core never runs a model itself. Embedding generation and
//! AI-vs-human classification are injected behind the two traits in this
//! crate, so the core stays free of any model runtime and tests can
//! substitute deterministic stubs.
//!
//! Implementations provided here:
//!
//! - [`StubEmbedder`] / [`StubClassifier`] — deterministic, hash-derived,
//!   zero-dependency outputs for offline operation and tests.
//! - [`HttpEmbedder`] / [`HttpClassifier`] — thin `ureq` clients for remote
//!   inference endpoints (HuggingFace-, OpenAI-, or custom-shaped payloads).
//! - [`CachedEmbedder`] — LRU memoization wrapper keyed by a digest of the
//!   input text, for callers that embed the same text repeatedly.

mod cache;
mod http;
mod stub;

pub use cache::CachedEmbedder;
pub use http::{HttpClassifier, HttpClassifierConfig, HttpEmbedder, HttpEmbedderConfig};
pub use stub::{EmbedTier, StubClassifier, StubEmbedder};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inputs shorter than this many characters are classified as human
/// without invoking the underlying model. A defined floor case, not an
/// error fallback.
pub const MIN_CLASSIFIABLE_CHARS: usize = 10;

/// Errors surfaced by provider calls.
///
/// One failed call fails exactly one comparison or one section; callers
/// isolate it and continue with the rest of the batch.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration is inconsistent (missing URL, bad mode, ...).
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
    /// Transport-level failure talking to a remote provider.
    #[error("provider request failed: {0}")]
    Http(String),
    /// The provider answered with something we cannot interpret.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Produces a fixed-length embedding vector for a text.
///
/// Implementations must be deterministic for identical input and must not
/// modify the input. Truncation to the model's maximum input length is the
/// provider's business; callers do not need to know the limit.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Classifies a text as human- or AI-written.
///
/// Implementations must return probabilities summing to 1.0 and must apply
/// the [`MIN_CLASSIFIABLE_CHARS`] floor: short inputs yield
/// `(human=1.0, ai=0.0)` without touching the model.
pub trait ClassifierProvider: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ProviderError>;
}

/// Probability pair produced by a classifier. `human_probability +
/// ai_probability == 1.0` within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub human_probability: f64,
    pub ai_probability: f64,
}

impl Classification {
    /// The floor value returned for inputs below the classifiable length.
    pub fn human_floor() -> Self {
        Self {
            human_probability: 1.0,
            ai_probability: 0.0,
        }
    }

    /// The classifier's confidence: the larger of the two probabilities.
    pub fn confidence(&self) -> f64 {
        self.human_probability.max(self.ai_probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_classification_sums_to_one() {
        let floor = Classification::human_floor();
        assert_eq!(floor.human_probability + floor.ai_probability, 1.0);
        assert_eq!(floor.confidence(), 1.0);
    }
}
