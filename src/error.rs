use thiserror::Error;

/// Closed failure taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    FailedPrecondition,
    Internal,
    DeadlineExceeded,
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed shard JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl PipelineError {
    /// Map onto the taxonomy kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            PipelineError::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
            PipelineError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            PipelineError::Internal(_)
            | PipelineError::Io(_)
            | PipelineError::Json(_)
            | PipelineError::Pdf(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
