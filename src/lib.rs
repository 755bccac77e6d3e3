// Library exports for the CLI binaries

pub mod clean;
pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod reflow;

// Re-export commonly used types
pub use clean::{CleanedDocument, CleanedPage, PageCleaner, PageKind};
pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, Result};
pub use ocr::ShardCollector;
pub use pipeline::{BookProcessor, BookReport, UploadContext};
pub use reflow::{Chunk, SpeechChunker, SummaryChunker};
