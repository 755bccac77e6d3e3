//! Text reflow: normalization plus the two chunkers that size cleaned text
//! for speech synthesis and for summarization.

pub mod speech;
pub mod summary;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::clean::patterns::compile;

pub use speech::SpeechChunker;
pub use summary::{SummaryChunker, SummaryPlan, TargetWords, Window};

static TRAILING_SPACE: Lazy<Regex> = Lazy::new(|| compile(r"[ \t]+\n"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| compile(r"\n{3,}"));

/// Drop carriage returns and trailing spaces, collapse runs of blank lines
/// to a single blank line, trim.
pub fn normalize(text: &str) -> String {
    let text = text.replace('\r', "");
    let text = TRAILING_SPACE.replace_all(&text, "\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// A bounded piece of text with its position in the sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position
    pub index: usize,
    pub total: usize,
    pub text: String,
}

impl Chunk {
    /// Build numbered chunks from texts in order
    pub fn sequence(texts: Vec<String>) -> Vec<Chunk> {
        let total = texts.len();
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk { index, total, text })
            .collect()
    }

    /// `part-001.ext` for the first chunk
    pub fn file_name(&self, ext: &str) -> String {
        format!("part-{:03}.{}", self.index + 1, ext)
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let text = "  سطر أول   \r\nسطر ثان\n\n\n\n\nفقرة ثانية  \n";
        assert_eq!(normalize(text), "سطر أول\nسطر ثان\n\nفقرة ثانية");
    }

    #[test]
    fn test_chunk_numbering() {
        let chunks = Chunk::sequence(vec!["أ".to_string(), "ب".to_string()]);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].total, 2);
        assert_eq!(chunks[0].file_name("mp3"), "part-001.mp3");
    }
}
