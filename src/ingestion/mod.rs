//! Ingestion: turning a published book site into stored chunk vectors.
//!
//! The submodules cover the five steps of the write path:
//!
//! * [`crawler`] — same-domain, depth-limited page discovery.
//! * [`cache`] — disk-backed caching of downloaded pages.
//! * [`extract`] — HTML to plain text (script/style stripped, whitespace
//!   collapsed).
//! * [`chunk`] — fixed-size sliding-window chunking with overlap.
//! * [`resume`] — persisted progress so interrupted runs can pick up.
//! * [`pipeline`] — the orchestration that ties them to the embedding
//!   provider and vector store.

pub mod cache;
pub mod chunk;
pub mod crawler;
pub mod extract;
pub mod pipeline;
pub mod resume;

pub use cache::{PageCache, PageFetch, fetch_page};
pub use chunk::{SlidingWindowChunker, build_records};
pub use crawler::{discover_urls, extract_same_domain_links};
pub use extract::extract_text;
pub use pipeline::{IngestPipeline, IngestReport};
pub use resume::ResumeTracker;
