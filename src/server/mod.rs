//! HTTP layer: shared state, router, handlers, and the API error type.

pub mod error;
pub mod handlers;
pub mod router;

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::embedding::EmbeddingProvider;
use crate::responder::Responder;
use crate::store::VectorStore;

pub use error::ApiError;
pub use router::router;

/// Everything a request handler needs, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub responder: Responder,
}
