use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::backend::OcrBackend;
use super::context::{temp_part_path, UploadContext};
use super::splitter::{plan_parts, DocumentSplitter};
use super::storage::{ObjectStore, PDF_CONTENT_TYPE, TEXT_CONTENT_TYPE};
use crate::clean::{CleanedDocument, PageCleaner, PageKind};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::ocr::ShardCollector;

/// Summary of one successful run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookReport {
    pub context: UploadContext,
    pub run_id: String,
    pub source_pages: usize,
    pub parts: usize,
    pub logical_pages: usize,
    pub content_pages: usize,
    pub combined_chars: usize,
    pub combined_path: String,
    pub kinds: BTreeMap<PageKind, usize>,
}

struct PreparedParts {
    inputs: Vec<String>,
    source_pages: usize,
    temp_prefix: Option<String>,
}

/// Turns one uploaded book into `book.txt` plus per-page text files
pub struct BookProcessor {
    store: Arc<dyn ObjectStore>,
    backend: Arc<dyn OcrBackend>,
    splitter: Arc<dyn DocumentSplitter>,
    config: PipelineConfig,
}

impl BookProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        backend: Arc<dyn OcrBackend>,
        splitter: Arc<dyn DocumentSplitter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            backend,
            splitter,
            config,
        }
    }

    /// Split, OCR every part under bounded concurrency, clean the whole
    /// document and persist it. Nothing is published unless every part
    /// succeeds; temporary parts are removed only after persistence.
    pub async fn process(&self, object_path: &str) -> Result<BookReport> {
        let ctx = UploadContext::from_object_path(object_path).ok_or_else(|| {
            PipelineError::FailedPrecondition(format!("not an admin or user book path: {}", object_path))
        })?;
        let run_id = Uuid::new_v4().to_string();
        info!("Processing {} ({}) run {}", object_path, ctx.log_id(), run_id);

        let prepared = self.prepare_parts(object_path, &run_id).await?;
        info!(
            "Prepared {} parts for {} ({} source pages, {} per part)",
            prepared.inputs.len(),
            ctx.log_id(),
            prepared.source_pages,
            self.config.splitter.max_pages_per_part
        );

        let part_pages = self.run_parts(&ctx, &run_id, &prepared.inputs).await?;
        let raw_pages: Vec<String> = part_pages.into_iter().flatten().collect();

        let cleaner = PageCleaner::new(self.config.cleaner.clone());
        let document = cleaner.clean_document(&raw_pages);
        if document.content_count() == 0 {
            error!("No text pages left after cleaning for {}", ctx.log_id());
            return Err(PipelineError::FailedPrecondition(format!(
                "no content pages left for {} ({} raw pages)",
                ctx.log_id(),
                raw_pages.len()
            )));
        }

        let combined_chars = self.persist_document(&ctx, &document).await?;

        if let Some(prefix) = &prepared.temp_prefix {
            self.delete_prefix(prefix).await?;
        }

        let report = BookReport {
            combined_path: ctx.combined_text_path(),
            context: ctx,
            run_id,
            source_pages: prepared.source_pages,
            parts: prepared.inputs.len(),
            logical_pages: document.len(),
            content_pages: document.content_count(),
            combined_chars,
            kinds: document.kind_counts(),
        };
        info!(
            "book.txt created for {}: {} logical pages, {} content, {} chars",
            report.context.log_id(),
            report.logical_pages,
            report.content_pages,
            report.combined_chars
        );
        Ok(report)
    }

    /// Use the source as-is when it fits in one part, otherwise write
    /// page-bounded parts under the run's temporary prefix.
    async fn prepare_parts(&self, object_path: &str, run_id: &str) -> Result<PreparedParts> {
        let bytes = self.store.download(object_path).await?;
        let source_pages = self.splitter.page_count(&bytes)?;
        let cap = self.config.splitter.max_pages_per_part;
        info!("Source page count for {}: {}", object_path, source_pages);

        if source_pages <= cap {
            return Ok(PreparedParts {
                inputs: vec![object_path.to_string()],
                source_pages,
                temp_prefix: None,
            });
        }

        let temp_prefix = format!("{}/{}", self.config.splitter.temp_prefix.trim_end_matches('/'), run_id);
        let mut inputs = Vec::new();
        for (part, range) in plan_parts(source_pages, cap).into_iter().enumerate() {
            let part_bytes = self.splitter.extract(&bytes, range.clone())?;
            let path = temp_part_path(&self.config.splitter.temp_prefix, run_id, part);
            self.store.upload(&path, part_bytes, PDF_CONTENT_TYPE).await?;
            info!("Created split part {} ({:?}) at {}", part + 1, range, path);
            inputs.push(path);
        }

        Ok(PreparedParts {
            inputs,
            source_pages,
            temp_prefix: Some(temp_prefix),
        })
    }

    /// Fixed pool of workers pulling part indexes from a shared cursor;
    /// results come back ordered by part index, not completion time.
    async fn run_parts(&self, ctx: &UploadContext, run_id: &str, inputs: &[String]) -> Result<Vec<Vec<String>>> {
        let next = AtomicUsize::new(0);
        let workers = self.config.splitter.max_concurrency.clamp(1, inputs.len().max(1));

        let next = &next;
        let pool = (0..workers).map(|_| async move {
            let mut done = Vec::new();
            loop {
                let idx = next.fetch_add(1, Ordering::SeqCst);
                let Some(input) = inputs.get(idx) else {
                    break;
                };
                let pages = self.ocr_part(ctx, run_id, idx, input).await?;
                done.push((idx, pages));
            }
            Ok::<_, PipelineError>(done)
        });

        let mut slots: Vec<Option<Vec<String>>> = vec![None; inputs.len()];
        for (idx, pages) in try_join_all(pool).await?.into_iter().flatten() {
            slots[idx] = Some(pages);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| slot.ok_or_else(|| PipelineError::Internal(format!("part {} produced no result", idx + 1))))
            .collect()
    }

    async fn ocr_part(&self, ctx: &UploadContext, run_id: &str, idx: usize, input: &str) -> Result<Vec<String>> {
        let part = idx + 1;
        let out_prefix = ctx.ocr_output_prefix(run_id, part);
        info!("Starting OCR for part {} of {}: {} -> {}", part, ctx.log_id(), input, out_prefix);

        let timeout = self.config.splitter.ocr_timeout();
        match tokio::time::timeout(timeout, self.backend.submit_batch_job(input, &out_prefix)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(PipelineError::DeadlineExceeded(format!(
                    "OCR for part {} did not finish within {:?}",
                    part, timeout
                )))
            }
        }

        let collector = ShardCollector::new(self.store.clone(), self.config.collector.clone());
        let pages = collector.collect(&out_prefix).await?;
        info!("Collected {} raw pages for part {}", pages.len(), part);
        Ok(pages)
    }

    /// Write one file per page slot, then `book.txt`; returns the combined length
    pub async fn persist_document(&self, ctx: &UploadContext, document: &CleanedDocument) -> Result<usize> {
        for page in &document.pages {
            self.store
                .upload(&ctx.page_path(page.index), page.artifact_text().into_bytes(), TEXT_CONTENT_TYPE)
                .await?;
        }

        // book.txt only exists once every page file does
        let combined = document.combined_text();
        let combined_chars = combined.chars().count();
        self.store
            .upload(&ctx.combined_text_path(), combined.into_bytes(), TEXT_CONTENT_TYPE)
            .await?;

        info!(
            "Persisted {} and {} page files under {}",
            ctx.combined_text_path(),
            document.len(),
            ctx.pages_prefix()
        );
        Ok(combined_chars)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let names = self.store.list(prefix).await?;
        if names.is_empty() {
            info!("No temp-split files to delete under {}", prefix);
            return Ok(());
        }
        for name in &names {
            self.store.delete(name).await?;
        }
        info!("Deleted {} temp-split files under {}", names.len(), prefix);
        Ok(())
    }
}
