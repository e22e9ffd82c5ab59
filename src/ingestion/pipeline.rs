//! Orchestration of the write path: crawl → fetch → extract → chunk →
//! embed → upsert.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use url::Url;

use super::cache::{PageCache, fetch_page};
use super::chunk::{SlidingWindowChunker, build_records};
use super::crawler::discover_urls;
use super::extract::extract_text;
use super::resume::ResumeTracker;
use crate::embedding::EmbeddingProvider;
use crate::store::VectorStore;
use crate::types::RagError;

/// Counters describing one ingest run.
#[derive(Clone, Copy, Debug, Default)]
pub struct IngestReport {
    /// Pages fetched, chunked, and written.
    pub pages_processed: usize,
    /// Pages skipped because the resume tracker already recorded them.
    pub pages_skipped: usize,
    /// Pages whose extracted text was empty.
    pub pages_empty: usize,
    /// Pages dropped after a fetch, embedding, or storage failure.
    pub pages_failed: usize,
    /// Chunks upserted into the collection.
    pub chunks_written: usize,
    /// Chunks dropped for lack of an embedding.
    pub chunks_skipped: usize,
    /// Bytes downloaded (cache hits included at their stored size).
    pub bytes_downloaded: usize,
    pub duration: Duration,
}

/// Drives a whole corpus through the write path.
pub struct IngestPipeline {
    client: Client,
    chunker: SlidingWindowChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    cache: Option<PageCache>,
    resume: Option<ResumeTracker>,
}

impl IngestPipeline {
    pub fn new(
        client: Client,
        chunker: SlidingWindowChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            client,
            chunker,
            embedder,
            store,
            cache: None,
            resume: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: PageCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_resume(mut self, tracker: ResumeTracker) -> Self {
        self.resume = Some(tracker);
        self
    }

    /// Ingests every same-domain page reachable from `base` within `depth`
    /// link levels, honoring `limit` when set.
    ///
    /// Per-page failures degrade to counters; only collection bootstrap
    /// errors abort the run, since nothing could be written afterwards.
    pub async fn run(
        &self,
        base: &Url,
        depth: usize,
        limit: Option<usize>,
    ) -> Result<IngestReport, RagError> {
        let started = Instant::now();

        self.store.ensure_collection().await?;

        let mut urls = discover_urls(&self.client, base, depth).await;
        if let Some(limit) = limit {
            urls.truncate(limit);
        }

        let mut report = IngestReport::default();
        let total = urls.len();
        for (position, url) in urls.iter().enumerate() {
            if let Some(tracker) = &self.resume
                && tracker.contains(url).await
            {
                tracing::debug!(%url, "already ingested, skipping");
                report.pages_skipped += 1;
                continue;
            }

            tracing::info!(%url, page = position + 1, total, "ingesting page");

            let fetch = match fetch_page(&self.client, url, self.cache.as_ref()).await {
                Ok(fetch) => fetch,
                Err(err) => {
                    tracing::warn!(%url, "fetch failed: {err}");
                    report.pages_failed += 1;
                    continue;
                }
            };
            report.bytes_downloaded += fetch.bytes;

            let text = extract_text(&fetch.body);
            if text.is_empty() {
                tracing::warn!(%url, "no text content");
                report.pages_empty += 1;
                continue;
            }

            let chunks = self.chunker.chunk(&text);
            let embeddings = match self.embedder.embed_documents(&chunks).await {
                Ok(embeddings) => embeddings,
                Err(err) => {
                    tracing::error!(%url, "embedding failed: {err}");
                    Vec::new()
                }
            };
            if embeddings.len() != chunks.len() {
                tracing::error!(
                    %url,
                    chunks = chunks.len(),
                    embeddings = embeddings.len(),
                    "chunk/embedding count mismatch, skipping page"
                );
                report.pages_failed += 1;
                continue;
            }

            let records = build_records(url, chunks, embeddings);
            let summary = match self.store.upsert_chunks(records).await {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::error!(%url, "upsert failed: {err}");
                    report.pages_failed += 1;
                    continue;
                }
            };

            report.pages_processed += 1;
            report.chunks_written += summary.written;
            report.chunks_skipped += summary.skipped_without_embedding;

            if let Some(tracker) = &self.resume {
                tracker.record(url, summary.written).await?;
            }
        }

        report.duration = started.elapsed();
        tracing::info!(
            pages = report.pages_processed,
            chunks = report.chunks_written,
            "ingest finished"
        );
        Ok(report)
    }
}
