//! OCR output handling: shard parsing, per-page text extraction and shard collection.

pub mod collector;
pub mod extractor;
pub mod shard;

pub use collector::ShardCollector;
pub use extractor::extract_page_text;
pub use shard::DocumentShard;
