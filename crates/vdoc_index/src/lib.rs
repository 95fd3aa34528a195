//! # Similarity Index
//!
//! An in-memory store of `(document, embedding)` pairs supporting
//! nearest-neighbor lookup by cosine similarity. Queries are a linear scan:
//! realistic corpus sizes here are tens to low hundreds of reference
//! documents, so no approximate structure earns its complexity.
//!
//! The index is scoped to a single comparison session and is not designed
//! for concurrent mutation. Callers that need concurrent sessions use
//! independent instances.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vdoc_providers::{EmbeddingProvider, ProviderError};
use vdoc_similarity::{cosine_similarity, preprocess};

/// One stored document with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub doc_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A ranked query hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexHit {
    pub doc_id: String,
    pub text: String,
    /// Raw cosine similarity against the query embedding.
    pub score: f64,
}

/// Errors produced by the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Querying before any insertion is a caller programming error.
    #[error("query issued against an empty index")]
    EmptyIndex,
    /// The embedding provider failed for an insert or query text.
    #[error("embedding provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// In-memory embedding index over an injected provider.
pub struct EmbedIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: Vec<IndexEntry>,
}

impl EmbedIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed `text` via the provider and store it under `doc_id`.
    ///
    /// The embedding is computed over the preprocessed text; the stored text
    /// keeps its original form for downstream lexical comparison.
    pub fn insert(&mut self, doc_id: impl Into<String>, text: &str) -> Result<(), IndexError> {
        let embedding = self.embedder.embed(&preprocess(text))?;
        self.entries.push(IndexEntry {
            doc_id: doc_id.into(),
            text: text.to_string(),
            embedding,
        });
        Ok(())
    }

    /// Return the `top_n` stored entries most similar to `text`.
    ///
    /// The query embedding is computed once and scored against every entry.
    /// Results sort by similarity descending; ties keep insertion order.
    pub fn query(&self, text: &str, top_n: usize) -> Result<Vec<IndexHit>, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(&preprocess(text))?;
        let mut hits: Vec<IndexHit> = self
            .entries
            .iter()
            .map(|entry| IndexHit {
                doc_id: entry.doc_id.clone(),
                text: entry.text.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(top_n);
        Ok(hits)
    }
}
