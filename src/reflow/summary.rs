use serde::{Deserialize, Serialize};
use tracing::info;

use super::{normalize, Chunk};
use crate::config::SummaryChunkConfig;
use crate::error::{PipelineError, Result};

/// Half-open char range `[start, end)` into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// Word range requested from the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWords {
    pub min: usize,
    pub max: usize,
}

impl TargetWords {
    pub fn for_text_len(len: usize) -> Self {
        let (min, max) = if len < 1200 {
            (80, 140)
        } else if len < 3000 {
            (120, 180)
        } else if len < 12_000 {
            (200, 320)
        } else if len < 40_000 {
            (300, 450)
        } else {
            (450, 600)
        };
        Self {
            min: min.clamp(80, 600),
            max: max.clamp(120, 600),
        }
    }
}

/// Everything the summarizer needs for one text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPlan {
    pub window: usize,
    pub overlap: usize,
    pub target_words: TargetWords,
    pub windows: Vec<Window>,
    pub chunks: Vec<Chunk>,
}

/// Fixed-size sliding windows whose size grows with the text length
#[derive(Debug, Clone, Default)]
pub struct SummaryChunker {
    config: SummaryChunkConfig,
}

impl SummaryChunker {
    pub fn new(config: SummaryChunkConfig) -> Self {
        Self { config }
    }

    /// Slide `size`-char windows advancing by `size - overlap`; the last
    /// window always ends at `len`.
    pub fn windows(len: usize, size: usize, overlap: usize) -> Vec<Window> {
        if len <= size {
            return vec![Window { start: 0, end: len }];
        }
        let step = size.saturating_sub(overlap).max(1);
        let mut out = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + size).min(len);
            out.push(Window { start, end });
            if end == len {
                break;
            }
            start += step;
        }
        out
    }

    /// Plan over the normalized text; window offsets index into it.
    pub fn plan(&self, text: &str) -> Result<SummaryPlan> {
        let normalized = normalize(text);
        let text = normalized.as_str();
        let len = text.chars().count();
        if len < self.config.min_text_len {
            return Err(PipelineError::FailedPrecondition(format!(
                "text too short to summarize: {} chars (minimum {})",
                len, self.config.min_text_len
            )));
        }

        let target_words = TargetWords::for_text_len(len);

        if len <= self.config.single_chunk_max {
            let windows = vec![Window { start: 0, end: len }];
            return Ok(SummaryPlan {
                window: len,
                overlap: 0,
                target_words,
                chunks: slice_windows(text, &windows),
                windows,
            });
        }

        let tier = self.config.tier_for(len);
        let mut window = tier.window;
        let mut windows = Self::windows(len, window, tier.overlap);
        if windows.len() > self.config.max_chunks {
            window = (window + self.config.rechunk_growth).min(self.config.rechunk_ceiling);
            info!(
                "{} summary chunks exceed {}, re-windowing at {} chars",
                windows.len(),
                self.config.max_chunks,
                window
            );
            windows = Self::windows(len, window, tier.overlap);
        }

        info!(
            "Summary plan: {} chars, window {}, overlap {}, {} chunks",
            len,
            window,
            tier.overlap,
            windows.len()
        );

        Ok(SummaryPlan {
            window,
            overlap: tier.overlap,
            target_words,
            chunks: slice_windows(text, &windows),
            windows,
        })
    }
}

fn slice_windows(text: &str, windows: &[Window]) -> Vec<Chunk> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    Chunk::sequence(
        windows
            .iter()
            .map(|w| text[bounds[w.start]..bounds[w.end]].to_string())
            .collect(),
    )
}
