//! Service configuration resolved from compiled defaults, `.env`, and the
//! process environment.
//!
//! Resolution order (later wins):
//!
//! 1. Compiled defaults
//! 2. `.env` file in the working directory (via dotenvy)
//! 3. Environment variables
//!
//! The server starts even when upstream credentials are missing — the query
//! endpoints degrade and `/status` reports what is absent. The ingest binary
//! refuses to run unconfigured instead, since it cannot do anything useful.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while resolving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {key}")]
    MissingVar { key: &'static str },

    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse { key: &'static str, message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Resolved settings for both binaries.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API key for the hosted embedding/completion provider.
    pub cohere_api_key: String,
    /// Base URL of the provider; overridable so tests can point at a mock.
    pub cohere_base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    /// Dimensionality of the embedding space; also used when creating the
    /// vector collection and for the zero-vector degradation path.
    pub embedding_dimensions: usize,

    /// Base URL of the hosted vector database.
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    /// Collection holding this corpus's chunk vectors.
    pub collection: String,

    /// Root page of the corpus to crawl at ingest time.
    pub target_url: Option<String>,
    pub crawl_depth: usize,
    pub crawl_limit: Option<usize>,
    pub chunk_window: usize,
    pub chunk_overlap: usize,
    pub cache_dir: Option<PathBuf>,
    pub state_file: Option<PathBuf>,

    pub bind_port: u16,
    pub allowed_origins: Vec<String>,
    /// Default retrieval depth for `/query`.
    pub top_k: usize,
    /// Retrieval depth for `/ask`.
    pub ask_top_k: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cohere_api_key: String::new(),
            cohere_base_url: "https://api.cohere.ai".to_string(),
            embed_model: "embed-multilingual-v3.0".to_string(),
            chat_model: "command".to_string(),
            embedding_dimensions: 1024,
            qdrant_url: String::new(),
            qdrant_api_key: None,
            collection: "book_knowledge_base".to_string(),
            target_url: None,
            crawl_depth: 1,
            crawl_limit: None,
            chunk_window: 1000,
            chunk_overlap: 100,
            cache_dir: None,
            state_file: None,
            bind_port: 8000,
            allowed_origins: Vec::new(),
            top_k: 5,
            ask_top_k: 3,
        }
    }
}

impl ServiceConfig {
    /// Returns `true` once every upstream credential is present.
    pub fn is_fully_configured(&self) -> bool {
        self.has_embedding_key() && self.has_vector_store_url() && self.has_vector_store_key()
    }

    pub fn has_embedding_key(&self) -> bool {
        !self.cohere_api_key.is_empty()
    }

    pub fn has_vector_store_url(&self) -> bool {
        !self.qdrant_url.is_empty()
    }

    pub fn has_vector_store_key(&self) -> bool {
        self.qdrant_api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Checks the variables the ingest binary cannot run without.
    pub fn ensure_ingest_ready(&self) -> Result<(), ConfigError> {
        if !self.has_embedding_key() {
            return Err(ConfigError::MissingVar {
                key: "COHERE_API_KEY",
            });
        }
        if !self.has_vector_store_url() {
            return Err(ConfigError::MissingVar { key: "QDRANT_URL" });
        }
        if !self.has_vector_store_key() {
            return Err(ConfigError::MissingVar {
                key: "QDRANT_API_KEY",
            });
        }
        if self.target_url.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingVar { key: "TARGET_URL" });
        }
        Ok(())
    }

    /// Validates internal consistency of the numeric knobs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_window == 0 {
            return Err(ConfigError::Invalid {
                message: "chunk window must be at least 1".to_string(),
            });
        }
        if self.chunk_overlap >= self.chunk_window {
            return Err(ConfigError::Invalid {
                message: format!(
                    "chunk overlap ({}) must be smaller than the window ({})",
                    self.chunk_overlap, self.chunk_window
                ),
            });
        }
        if self.embedding_dimensions == 0 {
            return Err(ConfigError::Invalid {
                message: "embedding dimensions must be at least 1".to_string(),
            });
        }
        if self.top_k == 0 || self.ask_top_k == 0 {
            return Err(ConfigError::Invalid {
                message: "retrieval top_k must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder resolving a [`ServiceConfig`] from the environment.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base: ServiceConfig,
    use_env: bool,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: ServiceConfig::default(),
            use_env: false,
        }
    }

    /// Enable `.env` loading plus environment variable overrides.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    pub fn build(mut self) -> Result<ServiceConfig, ConfigError> {
        if self.use_env {
            dotenvy::dotenv().ok();
            self.apply_env()?;
        }
        self.base.validate()?;
        Ok(self.base)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(key) = env_string("COHERE_API_KEY") {
            self.base.cohere_api_key = key;
        }
        if let Some(base_url) = env_string("COHERE_BASE_URL") {
            self.base.cohere_base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = env_string("COHERE_EMBED_MODEL") {
            self.base.embed_model = model;
        }
        if let Some(model) = env_string("COHERE_CHAT_MODEL") {
            self.base.chat_model = model;
        }
        if let Some(dims) = env_parse::<usize>("EMBEDDING_DIM")? {
            self.base.embedding_dimensions = dims;
        }

        if let Some(url) = env_string("QDRANT_URL") {
            self.base.qdrant_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = env_string("QDRANT_API_KEY") {
            self.base.qdrant_api_key = Some(key);
        }
        if let Some(name) = env_string("QDRANT_COLLECTION_NAME") {
            self.base.collection = name;
        }

        if let Some(target) = env_string("TARGET_URL") {
            self.base.target_url = Some(target);
        }
        if let Some(depth) = env_parse::<usize>("CRAWL_DEPTH")? {
            self.base.crawl_depth = depth;
        }
        if let Some(limit) = env_parse::<usize>("CRAWL_LIMIT")? {
            self.base.crawl_limit = Some(limit);
        }
        if let Some(window) = env_parse::<usize>("CHUNK_SIZE")? {
            self.base.chunk_window = window;
        }
        if let Some(overlap) = env_parse::<usize>("CHUNK_OVERLAP")? {
            self.base.chunk_overlap = overlap;
        }
        if let Some(dir) = env_string("CACHE_DIR") {
            self.base.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = env_string("INGEST_STATE") {
            self.base.state_file = Some(PathBuf::from(path));
        }

        if let Some(port) = env_parse::<u16>("PORT")? {
            self.base.bind_port = port;
        }
        if let Some(origins) = env_string("ALLOWED_ORIGINS") {
            self.base.allowed_origins = parse_origins(&origins);
        } else if let Some(origin) = env_string("FRONTEND_ORIGIN") {
            self.base.allowed_origins = vec![origin];
        }
        if let Some(top_k) = env_parse::<usize>("TOP_K")? {
            self.base.top_k = top_k;
        }

        Ok(())
    }
}

fn env_string(key: &'static str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| ConfigError::EnvParse {
                key,
                message: err.to_string(),
            }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
