//! Shared fixtures for integration tests: an in-memory cosine store and
//! canned providers.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use corpusmith::embedding::{EmbeddingProvider, MockEmbeddingProvider};
use corpusmith::responder::CompletionProvider;
use corpusmith::store::{ChunkRecord, ScoredChunk, UpsertSummary, VectorStore};
use corpusmith::types::RagError;

/// Ranks stored chunks by cosine similarity in process, standing in for the
/// hosted vector service.
pub struct MemoryStore {
    name: String,
    records: Mutex<Vec<(ChunkRecord, Vec<f32>)>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub async fn seed(&self, records: Vec<ChunkRecord>) {
        self.upsert_chunks(records).await.expect("seeding cannot fail");
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<(), RagError> {
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, RagError> {
        Ok(vec![self.name.clone()])
    }

    async fn upsert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<UpsertSummary, RagError> {
        let mut summary = UpsertSummary::default();
        let mut guard = self.records.lock().await;
        for record in chunks {
            match record.embedding.clone() {
                Some(embedding) => {
                    guard.push((record, embedding));
                    summary.written += 1;
                }
                None => summary.skipped_without_embedding += 1,
            }
        }
        Ok(summary)
    }

    async fn search(
        &self,
        _collection: Option<&str>,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let guard = self.records.lock().await;
        let mut scored: Vec<ScoredChunk> = guard
            .iter()
            .map(|(record, embedding)| ScoredChunk {
                record: record.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();
        scored.sort_by(|left, right| {
            right
                .score
                .partial_cmp(&left.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, RagError> {
        Ok(self.records.lock().await.len())
    }
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|v| v * v).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|v| v * v).sum::<f32>().sqrt();
    let denom = left_norm * right_norm;
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

/// A vector store whose every call fails, for degradation tests.
pub struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    async fn ensure_collection(&self) -> Result<(), RagError> {
        Err(RagError::Storage("vector service unreachable".to_string()))
    }

    async fn list_collections(&self) -> Result<Vec<String>, RagError> {
        Err(RagError::Storage("vector service unreachable".to_string()))
    }

    async fn upsert_chunks(&self, _chunks: Vec<ChunkRecord>) -> Result<UpsertSummary, RagError> {
        Err(RagError::Storage("vector service unreachable".to_string()))
    }

    async fn search(
        &self,
        _collection: Option<&str>,
        _query_embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        Err(RagError::Storage("vector service unreachable".to_string()))
    }

    async fn count(&self) -> Result<usize, RagError> {
        Err(RagError::Storage("vector service unreachable".to_string()))
    }
}

/// Completion provider that always returns the same reply.
pub struct StaticCompletion(pub &'static str);

#[async_trait]
impl CompletionProvider for StaticCompletion {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, RagError> {
        Ok(self.0.to_string())
    }
}

/// Completion provider that always fails.
pub struct OfflineCompletion;

#[async_trait]
impl CompletionProvider for OfflineCompletion {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, RagError> {
        Err(RagError::Completion("connection refused".to_string()))
    }
}

/// Builds records whose embeddings come from the given mock provider, so a
/// query using the same text retrieves its chunk with similarity 1.
pub async fn seeded_records(provider: &MockEmbeddingProvider, texts: &[&str]) -> Vec<ChunkRecord> {
    let owned: Vec<String> = texts.iter().map(|text| text.to_string()).collect();
    let embeddings = provider
        .embed_documents(&owned)
        .await
        .expect("mock embeddings cannot fail");

    owned
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(index, (content, embedding))| {
            ChunkRecord::new(
                format!("seed-{index}"),
                "https://book.example/seed",
                index,
                texts.len(),
                content,
            )
            .with_metadata(json!({ "source_url": "https://book.example/seed" }))
            .with_embedding(embedding)
        })
        .collect()
}
