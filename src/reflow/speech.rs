use once_cell::sync::Lazy;
use regex::Regex;

use super::{normalize, Chunk};
use crate::clean::patterns::compile;
use crate::config::SpeechChunkConfig;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| compile(r"\n\s*\n"));

const SENTENCE_END: &[char] = &['.', '!', '؟', '؛', '…'];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Sizes text for speech synthesis: paragraph-aware, never above `max_chars`
#[derive(Debug, Clone, Default)]
pub struct SpeechChunker {
    config: SpeechChunkConfig,
}

impl SpeechChunker {
    pub fn new(config: SpeechChunkConfig) -> Self {
        Self { config }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let segments = self.segments(&normalize(text));
        let packed = pack(segments, "\n\n", self.config.max_chars);
        Chunk::sequence(merge_short_tail(packed, &self.config))
    }

    /// Paragraphs that fit, plus sentence-packed pieces of those that don't
    fn segments(&self, text: &str) -> Vec<String> {
        let max = self.config.max_chars;
        let mut out = Vec::new();

        for para in PARAGRAPH_BREAK.split(text).map(str::trim).filter(|p| !p.is_empty()) {
            if char_len(para) <= max {
                out.push(para.to_string());
                continue;
            }

            let sentences = split_sentences(para);
            if sentences.is_empty() {
                out.extend(hard_split(para, max));
                continue;
            }

            let mut current = String::new();
            for sentence in sentences {
                if char_len(sentence) > max {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                    out.extend(hard_split(sentence, max));
                    continue;
                }
                if current.is_empty() {
                    current = sentence.to_string();
                } else if char_len(&current) + 1 + char_len(sentence) <= max {
                    current.push(' ');
                    current.push_str(sentence);
                } else {
                    out.push(std::mem::replace(&mut current, sentence.to_string()));
                }
            }
            if !current.is_empty() {
                out.push(current);
            }
        }

        out
    }
}

/// Split after sentence-ending punctuation that is followed by whitespace
fn split_sentences(para: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = para.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !SENTENCE_END.contains(&c) {
            continue;
        }
        if let Some(&(next_i, next_c)) = chars.peek() {
            if next_c.is_whitespace() {
                sentences.push(para[start..next_i].trim());
                start = next_i;
            }
        } else {
            sentences.push(para[start..i + c.len_utf8()].trim());
            start = para.len();
        }
    }
    if start < para.len() {
        sentences.push(para[start..].trim());
    }

    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

fn hard_split(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max.max(1)).map(|c| c.iter().collect()).collect()
}

/// Greedily join pieces with `sep` while the result stays within `max` chars
fn pack(pieces: Vec<String>, sep: &str, max: usize) -> Vec<String> {
    let sep_len = char_len(sep);
    let mut out = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if current.is_empty() {
            current = piece;
        } else if char_len(&current) + sep_len + char_len(&piece) <= max {
            current.push_str(sep);
            current.push_str(&piece);
        } else {
            out.push(std::mem::replace(&mut current, piece));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Fold a short final chunk into its predecessor when the result still fits
pub fn merge_short_tail(mut chunks: Vec<String>, config: &SpeechChunkConfig) -> Vec<String> {
    if chunks.len() < 2 {
        return chunks;
    }
    let last_len = char_len(&chunks[chunks.len() - 1]);
    let prev_len = char_len(&chunks[chunks.len() - 2]);

    if last_len < config.min_chars && prev_len + 2 + last_len <= config.max_chars {
        if let Some(last) = chunks.pop() {
            if let Some(prev) = chunks.last_mut() {
                prev.push_str("\n\n");
                prev.push_str(&last);
            }
        }
    }
    chunks
}
