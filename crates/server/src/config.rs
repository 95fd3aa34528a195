use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// API keys for authentication (in production, use a database)
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Embedding provider wiring
    #[serde(default)]
    pub embedder: EmbedderSettings,

    /// AI classifier wiring
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Scholarly search credentials
    #[serde(default)]
    pub search: SearchSettings,
}

/// Which embedding provider the analyzer runs on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbedderSettings {
    /// `"stub"` (deterministic, offline) or `"api"` (remote endpoint).
    #[serde(default = "default_provider_mode")]
    pub mode: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub auth_header: Option<String>,
    /// Remote payload shape hint: `"hf"`, `"openai"`, or `"custom"`.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
    /// Embedding cache capacity (entries).
    #[serde(default = "default_embed_cache_size")]
    pub cache_size: usize,
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            mode: default_provider_mode(),
            api_url: None,
            auth_header: None,
            provider: None,
            timeout_secs: default_provider_timeout_secs(),
            cache_size: default_embed_cache_size(),
        }
    }
}

/// Which AI classifier the analyzer runs on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierSettings {
    /// `"stub"` or `"api"`.
    #[serde(default = "default_provider_mode")]
    pub mode: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub auth_header: Option<String>,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            mode: default_provider_mode(),
            api_url: None,
            auth_header: None,
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Credentials for scholarly search providers. A provider without a key is
/// simply not wired in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub serpapi_key: Option<String>,
    #[serde(default)]
    pub core_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            embedder: EmbedderSettings::default(),
            classifier: ClassifierSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("VERIDOC_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        // Add demo API key if none configured (for development)
        let mut config = config;
        if config.api_keys.is_empty() {
            tracing::warn!("No API keys configured, using demo key 'demo-key-12345'");
            config.api_keys.insert("demo-key-12345".to_string());
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider_mode() -> String {
    "stub".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_embed_cache_size() -> usize {
    512
}
