use fxhash::hash64;
use serde::{Deserialize, Serialize};

use crate::{
    Classification, ClassifierProvider, EmbeddingProvider, ProviderError, MIN_CLASSIFIABLE_CHARS,
};

/// Embedding dimension tier for the stub provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedTier {
    /// 384 dimensions.
    #[default]
    Fast,
    /// 768 dimensions.
    Balanced,
    /// 1024 dimensions.
    Accurate,
}

impl EmbedTier {
    fn dimension(self) -> usize {
        match self {
            EmbedTier::Fast => 384,
            EmbedTier::Balanced => 768,
            EmbedTier::Accurate => 1024,
        }
    }
}

/// Deterministic embedding stub.
///
/// Generates sinusoid values derived from a hash of the input text, then
/// L2-normalizes, so identical texts always map to identical unit vectors
/// with minimal CPU cost. Used for offline operation and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubEmbedder {
    pub tier: EmbedTier,
}

impl StubEmbedder {
    pub fn new(tier: EmbedTier) -> Self {
        Self { tier }
    }
}

impl EmbeddingProvider for StubEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let dim = self.tier.dimension();
        let mut v = vec![0f32; dim];
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
        l2_normalize_in_place(&mut v);
        Ok(v)
    }
}

/// Deterministic classifier stub.
///
/// Derives an AI probability from a hash of the input text, so a given text
/// always classifies the same way. Applies the short-input floor like any
/// conforming implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubClassifier;

impl ClassifierProvider for StubClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ProviderError> {
        if text.len() < MIN_CLASSIFIABLE_CHARS {
            return Ok(Classification::human_floor());
        }
        let ai = (hash64(text.as_bytes()) % 10_000) as f64 / 10_000.0;
        Ok(Classification {
            human_probability: 1.0 - ai,
            ai_probability: ai,
        })
    }
}

/// In-place L2 normalization helper to keep allocations down.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm = v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm > 0.0 {
        let inv = 1.0 / norm as f32;
        for x in v.iter_mut() {
            *x *= inv;
        }
    }
}
