use async_trait::async_trait;

use crate::error::Result;

/// Batch OCR service seam.
///
/// `submit_batch_job` resolves once the job has finished writing its JSON
/// shards under `output_prefix`. Failures are reported as `Internal`.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    async fn submit_batch_job(&self, input_path: &str, output_prefix: &str) -> Result<()>;
}
