//! Fixed-size sliding-window chunking.
//!
//! The window and overlap are measured in grapheme clusters so a chunk
//! boundary never splits a user-perceived character, while staying faithful
//! to plain character counting for ASCII prose.

use chrono::Utc;
use serde_json::json;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;
use uuid::Uuid;

use crate::store::ChunkRecord;
use crate::types::RagError;

/// Splits text into windows of `window` graphemes, each overlapping the
/// previous one by `overlap` graphemes.
#[derive(Clone, Copy, Debug)]
pub struct SlidingWindowChunker {
    window: usize,
    overlap: usize,
}

impl SlidingWindowChunker {
    /// Creates a chunker; `overlap` must be strictly smaller than `window`.
    pub fn new(window: usize, overlap: usize) -> Result<Self, RagError> {
        if window == 0 {
            return Err(RagError::Chunking(
                "window must be at least 1 grapheme".to_string(),
            ));
        }
        if overlap >= window {
            return Err(RagError::Chunking(format!(
                "overlap ({overlap}) must be smaller than window ({window})"
            )));
        }
        Ok(Self { window, overlap })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunks `text` into overlapping windows.
    ///
    /// Text no longer than one window comes back as a single chunk; the
    /// final partial window is emitted once; an empty input yields nothing.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let graphemes: Vec<(usize, &str)> = text.grapheme_indices(true).collect();
        let total = graphemes.len();
        if total <= self.window {
            return vec![text.to_string()];
        }

        let stride = self.window - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.window).min(total);
            let byte_start = graphemes[start].0;
            let byte_end = if end == total {
                text.len()
            } else {
                graphemes[end].0
            };
            chunks.push(text[byte_start..byte_end].to_string());
            if end == total {
                break;
            }
            start += stride;
        }
        chunks
    }
}

/// Pairs chunk texts with their embeddings and wraps them into store-ready
/// records carrying the payload metadata the retrieval side exposes.
pub fn build_records(url: &Url, chunks: Vec<String>, embeddings: Vec<Vec<f32>>) -> Vec<ChunkRecord> {
    let total_chunks = chunks.len();
    let ingested_at = Utc::now().to_rfc3339();

    chunks
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(index, (content, embedding))| {
            ChunkRecord::new(
                Uuid::new_v4().to_string(),
                url.as_str(),
                index,
                total_chunks,
                content,
            )
            .with_metadata(json!({
                "source_url": url.as_str(),
                "chunk_index": index,
                "total_chunks": total_chunks,
                "ingested_at": ingested_at,
            }))
            .with_embedding(embedding)
        })
        .collect()
}
