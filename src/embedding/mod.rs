//! Embedding providers: the hosted API wrapper and a deterministic mock.

pub mod cohere;

use async_trait::async_trait;

use crate::types::RagError;

pub use cohere::CohereEmbedder;

/// Seam between the pipeline and whichever hosted model produces vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Dimensionality of the vectors this provider returns.
    fn dimensions(&self) -> usize;

    /// Embeds corpus chunks for storage.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a user question for similarity search.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

/// A vector of zeros matching the provider's dimensionality.
pub fn zero_vector(dimensions: usize) -> Vec<f32> {
    vec![0.0; dimensions]
}

/// Query-path degradation: any provider failure becomes a zero vector so the
/// request can still travel the rest of the pipeline.
pub async fn query_embedding_or_zero(provider: &dyn EmbeddingProvider, text: &str) -> Vec<f32> {
    match provider.embed_query(text).await {
        Ok(vector) => vector,
        Err(err) => {
            tracing::warn!(
                provider = provider.name(),
                "query embedding failed, falling back to zero vector: {err}"
            );
            zero_vector(provider.dimensions())
        }
    }
}

/// Deterministic hash-derived embeddings for tests and offline runs.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts
            .iter()
            .map(|text| pseudo_embedding(text, self.dimensions))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(pseudo_embedding(text, self.dimensions))
    }
}

fn pseudo_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..dimensions)
        .map(|i| {
            let bits = seed.rotate_left((i as u32 * 8) % 64) ^ ((i as u64) << 24);
            (bits as f64 / u32::MAX as f64) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Err(RagError::Embedding("provider offline".to_string()))
        }

        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, RagError> {
            Err(RagError::Embedding("provider offline".to_string()))
        }
    }

    #[tokio::test]
    async fn mock_embeddings_are_deterministic_and_distinct() {
        let provider = MockEmbeddingProvider::new(8);
        let texts = vec![
            "hello world".to_string(),
            "goodbye world".to_string(),
            "hello world".to_string(),
        ];

        let first = provider.embed_documents(&texts).await.unwrap();
        let second = provider.embed_documents(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
        assert_eq!(first[0].len(), 8);
    }

    #[tokio::test]
    async fn query_failure_degrades_to_zero_vector() {
        let provider = FailingProvider;
        let vector = query_embedding_or_zero(&provider, "anything").await;
        assert_eq!(vector, vec![0.0; 4]);
    }

    #[test]
    fn zero_vector_has_requested_length() {
        assert_eq!(zero_vector(1024).len(), 1024);
        assert!(zero_vector(3).iter().all(|v| *v == 0.0));
    }
}
