//! ```text
//! Crawl ──► ingestion::crawler ──► page URLs (same domain, depth-limited)
//!                 │
//! Page URLs ──► ingestion::cache::fetch_page ──► cached HTML
//!                 │
//! Cached HTML ──► ingestion::extract ──► plain text
//!                 │
//! Plain text ──► ingestion::chunk (sliding window) ──► ChunkRecords
//!                 │
//! ChunkRecords ──► embedding (hosted embed API) ──► vectors
//!                 │
//! Vectors ──► store::VectorStore (hosted vector DB) ──► collection
//!
//! Question ──► embedding ──► store::search ──► responder (hosted chat API)
//!          └──────────────────── server (axum) ───────────────────┘
//! ```

pub mod config;
pub mod embedding;
pub mod ingestion;
pub mod responder;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod types;

pub use types::RagError;
