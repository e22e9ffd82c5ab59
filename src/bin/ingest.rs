//! One-shot corpus ingestion: crawl the configured book site and load its
//! chunks into the vector collection.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::fs;
use url::Url;

use corpusmith::config::{ConfigBuilder, ConfigError};
use corpusmith::embedding::{CohereEmbedder, EmbeddingProvider};
use corpusmith::ingestion::{IngestPipeline, PageCache, ResumeTracker, SlidingWindowChunker};
use corpusmith::store::{QdrantStore, VectorStore};
use corpusmith::telemetry;
use corpusmith::types::RagError;

#[tokio::main]
async fn main() -> Result<(), RagError> {
    telemetry::init();

    let config = ConfigBuilder::new().with_env().build()?;
    config.ensure_ingest_ready()?;
    let target = config
        .target_url
        .as_deref()
        .ok_or(ConfigError::MissingVar { key: "TARGET_URL" })?;
    let target =
        Url::parse(target).map_err(|err| RagError::InvalidDocument(err.to_string()))?;

    let client = Client::builder()
        .user_agent(concat!("corpusmith-ingest/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        CohereEmbedder::new(client.clone(), config.cohere_api_key.clone())
            .with_base_url(config.cohere_base_url.clone())
            .with_model(config.embed_model.clone(), config.embedding_dimensions),
    );
    let store: Arc<dyn VectorStore> = Arc::new(
        QdrantStore::new(client.clone(), config.qdrant_url.clone(), config.collection.clone())
            .with_api_key(config.qdrant_api_key.clone())
            .with_dimensions(config.embedding_dimensions),
    );
    let chunker = SlidingWindowChunker::new(config.chunk_window, config.chunk_overlap)?;

    let mut pipeline = IngestPipeline::new(client, chunker, embedder, store);

    let cache = match &config.cache_dir {
        Some(dir) => {
            fs::create_dir_all(dir).await?;
            Some(PageCache::new(dir.clone()))
        }
        None => None,
    };
    if let Some(cache) = &cache {
        pipeline = pipeline.with_cache(cache.clone());
    }

    let state_path = config
        .state_file
        .clone()
        .or_else(|| cache.as_ref().map(|cache| cache.state_file()));
    if let Some(path) = state_path {
        let tracker = ResumeTracker::new(path);
        tracker.load().await?;
        pipeline = pipeline.with_resume(tracker);
    }

    println!("Ingesting {} into '{}'", target, config.collection);
    let report = pipeline
        .run(&target, config.crawl_depth, config.crawl_limit)
        .await?;

    println!("\nIngestion complete");
    println!("  pages processed : {}", report.pages_processed);
    println!("  pages skipped   : {}", report.pages_skipped);
    println!("  pages empty     : {}", report.pages_empty);
    println!("  pages failed    : {}", report.pages_failed);
    println!("  chunks written  : {}", report.chunks_written);
    println!("  chunks skipped  : {}", report.chunks_skipped);
    println!(
        "  bytes downloaded: {:.2} KB",
        report.bytes_downloaded as f64 / 1024.0
    );
    println!("  duration        : {}", format_duration(report.duration));

    Ok(())
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}.{:03}s", secs / 60, secs % 60, duration.subsec_millis())
}
