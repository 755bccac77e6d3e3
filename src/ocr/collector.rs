use std::sync::Arc;
use tracing::{info, warn};

use super::extractor::extract_page_text;
use super::shard::DocumentShard;
use crate::config::CollectorConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::storage::ObjectStore;

/// Gathers raw page text from every OCR shard written under a prefix
pub struct ShardCollector {
    store: Arc<dyn ObjectStore>,
    config: CollectorConfig,
}

impl ShardCollector {
    pub fn new(store: Arc<dyn ObjectStore>, config: CollectorConfig) -> Self {
        Self { store, config }
    }

    /// Collect raw pages in shard order, then page order within each shard.
    ///
    /// Fails with `NotFound` when no shard appears within the polling budget
    /// and with `DeadlineExceeded` when the whole run outlives its timeout.
    pub async fn collect(&self, prefix: &str) -> Result<Vec<String>> {
        match tokio::time::timeout(self.config.timeout(), self.collect_inner(prefix)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::DeadlineExceeded(format!(
                "collecting OCR shards under {} took longer than {:?}",
                prefix,
                self.config.timeout()
            ))),
        }
    }

    async fn collect_inner(&self, prefix: &str) -> Result<Vec<String>> {
        let shard_names = self.wait_for_shards(prefix).await?;

        let mut pages = Vec::new();
        let mut first_full_text: Option<String> = None;
        let mut with_doc = 0;
        let mut skipped = 0;

        for name in &shard_names {
            let bytes = self.store.download(name).await?;
            let Some(shard) = DocumentShard::from_slice(&bytes)? else {
                skipped += 1;
                warn!("JSON without document object: {}", name);
                continue;
            };
            with_doc += 1;

            info!(
                "Shard {}: full text {} chars, {} pages",
                name,
                shard.text.chars().count(),
                shard.pages.len()
            );

            let full = shard.text.trim();
            if first_full_text.is_none() && !full.is_empty() {
                first_full_text = Some(full.to_string());
            }

            if shard.pages.is_empty() {
                if full.is_empty() {
                    warn!("No pages and no document text in {}", name);
                } else {
                    pages.push(full.to_string());
                }
                continue;
            }

            for page in &shard.pages {
                pages.push(extract_page_text(page, &shard.text));
            }
        }

        info!(
            "Read {} shards under {} ({} with document, {} skipped)",
            shard_names.len(),
            prefix,
            with_doc,
            skipped
        );

        if pages.iter().all(|p| p.is_empty()) {
            if let Some(full) = first_full_text {
                warn!("No page text extracted under {}, falling back to full document text", prefix);
                return Ok(vec![full]);
            }
        }

        info!("Pages collected (raw): {}", pages.len());
        Ok(pages)
    }

    /// Poll until at least one shard exists, sorted by name
    async fn wait_for_shards(&self, prefix: &str) -> Result<Vec<String>> {
        for attempt in 1..=self.config.max_attempts {
            let mut names: Vec<String> = self
                .store
                .list(prefix)
                .await?
                .into_iter()
                .filter(|n| n.ends_with(&self.config.shard_suffix))
                .collect();

            info!(
                "OCR JSON scan under {} (attempt {}/{}): {} found",
                prefix,
                attempt,
                self.config.max_attempts,
                names.len()
            );

            if !names.is_empty() {
                names.sort();
                return Ok(names);
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.poll_delay()).await;
            }
        }

        Err(PipelineError::NotFound(format!("no OCR JSON files found under {}", prefix)))
    }
}
