//! Whole-document orchestration and the collaborator seams it runs against.

pub mod backend;
pub mod context;
pub mod processor;
pub mod splitter;
pub mod storage;

pub use backend::OcrBackend;
pub use context::UploadContext;
pub use processor::{BookProcessor, BookReport};
pub use splitter::{plan_parts, DocumentSplitter};
#[cfg(feature = "pdf-split")]
pub use splitter::PdfSplitter;
pub use storage::{LocalStore, MemoryStore, ObjectStore};
