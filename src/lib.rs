//! linkread: remote-document ingestion for LLM prompts
//!
//! Pipeline: resolve a share link to a direct-download URL, fetch with a
//! bounded timeout, follow the Google Drive large-file confirmation
//! interstitial, extract plain text by content type, truncate oversized
//! output. Every failure degrades to a structured warning.

pub mod confirm;
pub mod docx;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod output;
pub mod resolve;

pub use ingest::{ingest_url, IngestConfig, Ingested};
pub use resolve::resolve_share_link;
