use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use dashmap::DashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use veridoc::{
    Analyzer, BibliographicSearch, CachedEmbedder, ClassifierProvider, CoreSearch,
    DocumentFetcher, EmbedIndex, EmbeddingProvider, HttpClassifier, HttpClassifierConfig,
    HttpDocumentFetcher, HttpEmbedder, HttpEmbedderConfig, ScholarSearch, StubClassifier,
    StubEmbedder, TextExtractor, Utf8TextExtractor,
};

/// Shared application state
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: DashMap<String, (u32, std::time::Instant)>,

    /// Analysis pipeline over the configured providers
    pub analyzer: Analyzer,

    /// Shared reference index. Session-scoped by design: one index, guarded
    /// for the server's lifetime; not meant for concurrent mutation beyond
    /// this lock.
    pub index: RwLock<EmbedIndex>,

    /// Configured scholarly search providers (may be empty)
    pub searchers: Vec<Box<dyn BibliographicSearch>>,

    /// Document acquisition seams
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl ServerState {
    /// Create new server state, wiring providers from configuration.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let embedder = build_embedder(&config)?;
        let classifier = build_classifier(&config)?;
        let analyzer = Analyzer::new(embedder.clone(), classifier);
        let index = RwLock::new(EmbedIndex::new(embedder));
        let searchers = build_searchers(&config);

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: DashMap::new(),
            analyzer,
            index,
            searchers,
            fetcher: Arc::new(HttpDocumentFetcher::new()),
            extractor: Arc::new(Utf8TextExtractor),
        })
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

fn build_embedder(config: &ServerConfig) -> ServerResult<Arc<dyn EmbeddingProvider>> {
    let settings = &config.embedder;
    let cache_size = NonZeroUsize::new(settings.cache_size.max(1)).expect("nonzero cache size");
    match settings.mode.as_str() {
        "stub" => Ok(Arc::new(CachedEmbedder::new(
            StubEmbedder::default(),
            cache_size,
        ))),
        "api" => {
            let api_url = settings.api_url.clone().ok_or_else(|| {
                ServerError::Config("embedder.api_url is required in api mode".into())
            })?;
            let embedder = HttpEmbedder::new(HttpEmbedderConfig {
                api_url,
                auth_header: settings.auth_header.clone(),
                provider: settings.provider.clone(),
                timeout_secs: settings.timeout_secs,
                ..Default::default()
            });
            Ok(Arc::new(CachedEmbedder::new(embedder, cache_size)))
        }
        other => Err(ServerError::Config(format!(
            "unknown embedder mode {other:?} (expected \"stub\" or \"api\")"
        ))),
    }
}

fn build_classifier(config: &ServerConfig) -> ServerResult<Arc<dyn ClassifierProvider>> {
    let settings = &config.classifier;
    match settings.mode.as_str() {
        "stub" => Ok(Arc::new(StubClassifier)),
        "api" => {
            let api_url = settings.api_url.clone().ok_or_else(|| {
                ServerError::Config("classifier.api_url is required in api mode".into())
            })?;
            Ok(Arc::new(HttpClassifier::new(HttpClassifierConfig {
                api_url,
                auth_header: settings.auth_header.clone(),
                timeout_secs: settings.timeout_secs,
            })))
        }
        other => Err(ServerError::Config(format!(
            "unknown classifier mode {other:?} (expected \"stub\" or \"api\")"
        ))),
    }
}

fn build_searchers(config: &ServerConfig) -> Vec<Box<dyn BibliographicSearch>> {
    let mut searchers: Vec<Box<dyn BibliographicSearch>> = Vec::new();
    if let Some(key) = config.search.serpapi_key.as_deref().filter(|k| !k.is_empty()) {
        searchers.push(Box::new(ScholarSearch::new(key)));
    }
    if let Some(key) = config.search.core_api_key.as_deref().filter(|k| !k.is_empty()) {
        searchers.push(Box::new(CoreSearch::new(key)));
    }
    searchers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_wiring_builds_without_credentials() {
        let state = ServerState::new(ServerConfig::default()).unwrap();
        assert!(state.searchers.is_empty());
        assert!(state.index.read().unwrap().is_empty());
    }

    #[test]
    fn api_mode_without_url_is_a_config_error() {
        let mut config = ServerConfig::default();
        config.embedder.mode = "api".into();
        assert!(matches!(
            ServerState::new(config),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn rate_limit_counts_within_the_window() {
        let mut config = ServerConfig::default();
        config.rate_limit_per_minute = 2;
        config.api_keys.insert("key".into());
        let state = ServerState::new(config).unwrap();

        assert!(state.check_rate_limit("key"));
        assert!(state.check_rate_limit("key"));
        assert!(!state.check_rate_limit("key"));
    }
}
