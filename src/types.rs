//! Shared error type for the ingestion and retrieval pipeline.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the crawl → chunk → embed → store → answer pipeline.
///
/// Upstream services are reached over HTTP only; every variant that carries a
/// `String` wraps a provider-side failure whose exact shape we do not own.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("chunking failed: {0}")]
    Chunking(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("storage failed: {0}")]
    Storage(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}
