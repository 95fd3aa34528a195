use std::num::NonZeroUsize;
use std::sync::Mutex;

use xxhash_rust::xxh3::xxh3_64;

use crate::{EmbeddingProvider, ProviderError};

/// LRU memoization wrapper around an [`EmbeddingProvider`].
///
/// Keys entries by an xxh3 digest of the input text. Providers are
/// deterministic for identical input, so serving a cached vector is
/// indistinguishable from re-embedding. Useful when the same suspect text is
/// compared against many references.
pub struct CachedEmbedder<P> {
    inner: P,
    cache: Mutex<lru::LruCache<u64, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(lru::LruCache::new(capacity)),
        }
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let key = xxh3_64(text.as_bytes());
        {
            let mut cache = self
                .cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(vector) = cache.get(&key) {
                return Ok(vector.clone());
            }
        }
        let vector = self.inner.embed(text)?;
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.put(key, vector.clone());
        Ok(vector)
    }
}
