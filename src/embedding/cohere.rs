//! Wrapper around the hosted embedding endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::types::RagError;

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "embed-multilingual-v3.0";
const DEFAULT_DIMENSIONS: usize = 1024;

/// Marks whether a text is corpus content or a user question; v3 embedding
/// models produce different vectors for each role.
const INPUT_TYPE_DOCUMENT: &str = "search_document";
const INPUT_TYPE_QUERY: &str = "search_query";

/// Client for the provider's `POST /v1/embed` endpoint.
#[derive(Clone, Debug)]
pub struct CohereEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl CohereEmbedder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Points the client at a different host (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Selects a model and the dimensionality it produces.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    async fn embed(&self, texts: &[String], input_type: &str) -> Result<Vec<Vec<f32>>, RagError> {
        let request = EmbedRequest {
            texts,
            model: &self.model,
            input_type,
        };

        let response: EmbedResponse = self
            .client
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} embeddings for {} texts",
                response.embeddings.len(),
                texts.len()
            )));
        }
        Ok(response.embeddings)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for CohereEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(count = texts.len(), model = %self.model, "embedding documents");
        self.embed(texts, INPUT_TYPE_DOCUMENT).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let texts = [text.to_string()];
        let mut embeddings = self.embed(&texts, INPUT_TYPE_QUERY).await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::Embedding("provider returned no embedding".to_string()))
    }
}
