//! REST client for a hosted Qdrant-style vector database.
//!
//! Only the four operations the pipeline needs are mapped: collection
//! bootstrap, point upsert, similarity search, and the two read endpoints
//! the HTTP layer exposes. Payloads follow the `{text, metadata}` shape the
//! retrieval side decodes.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ChunkRecord, ScoredChunk, UpsertSummary, VectorStore};
use crate::types::RagError;

#[derive(Clone, Debug)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    dimensions: usize,
}

impl QdrantStore {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            collection: collection.into(),
            dimensions: 1024,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }

    /// Vector size used when the collection has to be created.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn create_collection(&self, name: &str) -> Result<(), RagError> {
        let body = json!({
            "vectors": {
                "size": self.dimensions,
                "distance": "Cosine",
            }
        });
        self.request(Method::PUT, &format!("/collections/{name}"))
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .map_err(|err| RagError::Storage(format!("creating collection '{name}': {err}")))?;
        tracing::info!(collection = name, dimensions = self.dimensions, "created collection");
        Ok(())
    }
}

#[derive(Deserialize)]
struct CollectionsResponse {
    result: CollectionsResult,
}

#[derive(Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct CountResponse {
    result: CountResult,
}

#[derive(Deserialize)]
struct CountResult {
    count: usize,
}

/// Rebuilds a [`ChunkRecord`] from a point's `{text, metadata}` payload.
fn record_from_payload(id: &Value, payload: &Value) -> ChunkRecord {
    let id = match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let content = payload
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let metadata = payload
        .get("metadata")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));
    let source_url = metadata
        .get("source_url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let chunk_index = metadata
        .get("chunk_index")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;
    let total_chunks = metadata
        .get("total_chunks")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    ChunkRecord {
        id,
        source_url,
        chunk_index,
        total_chunks,
        content,
        metadata,
        embedding: None,
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) -> Result<(), RagError> {
        let response = self
            .request(Method::GET, &format!("/collections/{}", self.collection))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => self.create_collection(&self.collection).await,
            status if status.is_success() => Ok(()),
            status => Err(RagError::Storage(format!(
                "probing collection '{}' returned {status}",
                self.collection
            ))),
        }
    }

    async fn list_collections(&self) -> Result<Vec<String>, RagError> {
        let response: CollectionsResponse = self
            .request(Method::GET, "/collections")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        Ok(response
            .result
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    async fn upsert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<UpsertSummary, RagError> {
        let mut summary = UpsertSummary::default();
        if chunks.is_empty() {
            return Ok(summary);
        }

        let mut points = Vec::with_capacity(chunks.len());
        for record in chunks {
            let Some(embedding) = record.embedding.as_ref() else {
                summary.skipped_without_embedding += 1;
                continue;
            };
            points.push(json!({
                "id": record.id,
                "vector": embedding,
                "payload": {
                    "text": record.content,
                    "metadata": record.metadata,
                }
            }));
        }

        if points.is_empty() {
            return Ok(summary);
        }
        summary.written = points.len();

        self.request(
            Method::PUT,
            &format!("/collections/{}/points", self.collection),
        )
        .query(&[("wait", "true")])
        .json(&json!({ "points": points }))
        .send()
        .await?
        .error_for_status()
        .map_err(|err| RagError::Storage(format!("upserting points: {err}")))?;

        Ok(summary)
    }

    async fn search(
        &self,
        collection: Option<&str>,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let collection = collection.unwrap_or(&self.collection);
        let body = json!({
            "vector": query_embedding,
            "limit": top_k,
            "with_payload": true,
        });

        let response: SearchResponse = self
            .request(
                Method::POST,
                &format!("/collections/{collection}/points/search"),
            )
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .map_err(|err| RagError::Storage(format!("searching '{collection}': {err}")))?
            .json()
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        Ok(response
            .result
            .iter()
            .map(|hit| ScoredChunk {
                record: record_from_payload(&hit.id, &hit.payload),
                score: hit.score,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, RagError> {
        let response: CountResponse = self
            .request(
                Method::POST,
                &format!("/collections/{}/points/count", self.collection),
            )
            .json(&json!({ "exact": true }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        Ok(response.result.count)
    }
}
