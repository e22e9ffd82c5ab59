//! Vector storage behind a hosted service.
//!
//! The [`VectorStore`] trait is the seam between the pipeline and whichever
//! managed vector database holds the corpus. All indexing and similarity
//! search happen on the service side; this crate only moves records across
//! the wire.
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │ VectorStore trait│
//!                  │  (async upsert / │
//!                  │   search / list) │
//!                  └────────┬─────────┘
//!                           │
//!                           ▼
//!                  ┌──────────────────┐
//!                  │   QdrantStore    │
//!                  │   (REST client)  │
//!                  └──────────────────┘
//! ```

pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::RagError;

pub use qdrant::QdrantStore;

/// One chunk of corpus text, with its position and (optionally) its vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Point id in the vector database.
    pub id: String,
    /// Page the chunk was extracted from.
    pub source_url: String,
    /// Zero-based index of this chunk within its page.
    pub chunk_index: usize,
    /// How many chunks the page produced in total.
    pub total_chunks: usize,
    /// The chunk text itself.
    pub content: String,
    /// Payload metadata stored alongside the vector.
    pub metadata: serde_json::Value,
    /// The embedding, when it has been computed.
    pub embedding: Option<Vec<f32>>,
}

impl ChunkRecord {
    pub fn new(
        id: impl Into<String>,
        source_url: impl Into<String>,
        chunk_index: usize,
        total_chunks: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            chunk_index,
            total_chunks,
            content: content.into(),
            metadata: serde_json::Value::Object(Default::default()),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A retrieval hit: the stored record plus its similarity to the query.
#[derive(Clone, Debug)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    pub score: f32,
}

/// Outcome of an upsert batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Records written to the collection.
    pub written: usize,
    /// Records dropped because they carried no embedding.
    pub skipped_without_embedding: usize,
}

/// Interface to the hosted vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the configured collection (cosine distance) if it is absent.
    async fn ensure_collection(&self) -> Result<(), RagError>;

    /// Names of all collections on the service.
    async fn list_collections(&self) -> Result<Vec<String>, RagError>;

    /// Writes chunk records; records without embeddings are counted and
    /// skipped rather than rejected.
    async fn upsert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<UpsertSummary, RagError>;

    /// Top-k similarity search, most similar first. `collection` overrides
    /// the configured collection when given.
    async fn search(
        &self,
        collection: Option<&str>,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError>;

    /// Number of points in the configured collection.
    async fn count(&self) -> Result<usize, RagError>;
}
