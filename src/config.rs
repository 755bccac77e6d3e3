use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub max_attempts: usize,
    pub poll_delay_ms: u64,
    pub shard_suffix: String,
    /// Upper bound for one whole collection run, polling included
    pub timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            poll_delay_ms: 5000,
            shard_suffix: ".json".to_string(),
            timeout_secs: 300,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) {
        assert!(self.max_attempts > 0, "max_attempts must be > 0");
        assert!(!self.shard_suffix.is_empty(), "shard_suffix must not be empty");
        assert!(self.timeout_secs > 0, "timeout_secs must be > 0");
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Display for CollectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Classifier thresholds. These are empirically tuned, not derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    // 页眉/页脚
    pub header_top_lines: usize,
    pub header_bottom_lines: usize,
    pub header_max_len: usize,
    pub header_min_occurrences: usize,

    // 版权页 / 编目页
    pub front_matter_early_pages: usize,
    pub front_matter_scan_lines: usize,
    pub front_matter_meta_strong: usize,
    pub front_matter_pair_min: usize,
    pub front_matter_contact_strong: usize,
    pub front_matter_late_min_combined: usize,
    pub cip_coverage: f32,
    pub cip_min_lines: usize,
    pub cip_max_punctuation: usize,
    pub cip_max_arabic_letters: usize,

    // 目录
    pub toc_max_page_index: usize,
    pub toc_min_candidates: usize,
    pub toc_coverage: f32,
    pub short_title_max_len: usize,

    // 参考文献尾注
    pub footer_min_lines: usize,
    pub footer_divider_window: usize,
    pub footer_lookback: usize,
    pub footer_start_window: usize,
    pub see_also_window: usize,
    pub footer_latin_min: usize,

    // 语言过滤
    pub references_scan_lines: usize,
    pub references_min_hits: usize,
    pub foreign_latin_min: usize,
    pub foreign_latin_ratio: usize,
    pub foreign_arabic_max: usize,
    pub noise_core_min: usize,
    pub sparse_core_min: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            header_top_lines: 3,
            header_bottom_lines: 2,
            header_max_len: 80,
            header_min_occurrences: 2,
            front_matter_early_pages: 13,
            front_matter_scan_lines: 80,
            front_matter_meta_strong: 4,
            front_matter_pair_min: 2,
            front_matter_contact_strong: 5,
            front_matter_late_min_combined: 8,
            cip_coverage: 0.35,
            cip_min_lines: 6,
            cip_max_punctuation: 6,
            cip_max_arabic_letters: 1800,
            toc_max_page_index: 14,
            toc_min_candidates: 5,
            toc_coverage: 0.6,
            short_title_max_len: 40,
            footer_min_lines: 4,
            footer_divider_window: 6,
            footer_lookback: 10,
            footer_start_window: 6,
            see_also_window: 4,
            footer_latin_min: 8,
            references_scan_lines: 60,
            references_min_hits: 3,
            foreign_latin_min: 60,
            foreign_latin_ratio: 3,
            foreign_arabic_max: 120,
            noise_core_min: 20,
            sparse_core_min: 40,
        }
    }
}

impl CleanerConfig {
    pub fn validate(&self) {
        assert!(self.header_min_occurrences >= 2, "header_min_occurrences must be >= 2");
        assert!(self.header_max_len > 0, "header_max_len must be > 0");
        assert!((0.0..=1.0).contains(&self.cip_coverage), "cip_coverage must be within [0,1]");
        assert!((0.0..=1.0).contains(&self.toc_coverage), "toc_coverage must be within [0,1]");
        assert!(self.toc_min_candidates > 0, "toc_min_candidates must be > 0");
        assert!(self.footer_lookback >= self.footer_start_window, "footer_lookback must be >= footer_start_window");
        assert!(self.references_min_hits > 0, "references_min_hits must be > 0");
        assert!(self.foreign_latin_ratio > 0, "foreign_latin_ratio must be > 0");
    }
}

impl fmt::Display for CleanerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechChunkConfig {
    pub max_chars: usize,
    pub min_chars: usize,
}

impl Default for SpeechChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 3500,
            min_chars: 1200,
        }
    }
}

impl SpeechChunkConfig {
    pub fn validate(&self) {
        assert!(self.max_chars > 0, "max_chars must be > 0");
        assert!(self.min_chars <= self.max_chars, "min_chars must be <= max_chars");
    }
}

/// One row of the length-adaptive window table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTier {
    /// Inclusive upper bound on text length; `None` matches everything
    pub max_text_len: Option<usize>,
    pub window: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryChunkConfig {
    pub min_text_len: usize,
    pub single_chunk_max: usize,
    pub tiers: Vec<WindowTier>,
    pub max_chunks: usize,
    pub rechunk_growth: usize,
    pub rechunk_ceiling: usize,
}

impl Default for SummaryChunkConfig {
    fn default() -> Self {
        Self {
            min_text_len: 200,
            single_chunk_max: 12_000,
            tiers: vec![
                WindowTier { max_text_len: Some(12_000), window: 12_000, overlap: 600 },
                WindowTier { max_text_len: Some(60_000), window: 14_000, overlap: 700 },
                WindowTier { max_text_len: Some(140_000), window: 17_000, overlap: 800 },
                WindowTier { max_text_len: None, window: 20_000, overlap: 900 },
            ],
            max_chunks: 28,
            rechunk_growth: 6000,
            rechunk_ceiling: 26_000,
        }
    }
}

impl SummaryChunkConfig {
    pub fn validate(&self) {
        assert!(!self.tiers.is_empty(), "tiers must not be empty");
        for tier in &self.tiers {
            assert!(tier.window > 0, "tier window must be > 0");
            assert!(tier.overlap < tier.window, "tier overlap must be < window");
        }
        assert!(
            self.tiers.last().map(|t| t.max_text_len.is_none()).unwrap_or(false),
            "last tier must be unbounded"
        );
        assert!(self.max_chunks > 0, "max_chunks must be > 0");
    }

    /// Window size and overlap for a text of `len` characters
    pub fn tier_for(&self, len: usize) -> WindowTier {
        self.tiers
            .iter()
            .copied()
            .find(|t| t.max_text_len.map_or(true, |max| len <= max))
            .unwrap_or(WindowTier { max_text_len: None, window: len.max(1), overlap: 0 })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub max_pages_per_part: usize,
    pub max_concurrency: usize,
    pub temp_prefix: String,
    pub ocr_timeout_secs: u64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            max_pages_per_part: 100,
            max_concurrency: 2,
            temp_prefix: "temp-split".to_string(),
            ocr_timeout_secs: 540,
        }
    }
}

impl SplitterConfig {
    pub fn validate(&self) {
        assert!(self.max_pages_per_part > 0, "max_pages_per_part must be > 0");
        assert!(self.max_concurrency > 0, "max_concurrency must be > 0");
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub collector: CollectorConfig,
    pub cleaner: CleanerConfig,
    pub speech: SpeechChunkConfig,
    pub summary: SummaryChunkConfig,
    pub splitter: SplitterConfig,
}

impl PipelineConfig {
    pub fn validate(&self) {
        self.collector.validate();
        self.cleaner.validate();
        self.speech.validate();
        self.summary.validate();
        self.splitter.validate();
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
