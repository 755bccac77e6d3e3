use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::{compile, count_latin, is_divider_line};
use crate::config::CleanerConfig;

static REFERENCE_WORD: Lazy<Regex> = Lazy::new(|| compile(r"المرجع|المراجع|المصادر|انظر"));
static SEE_ALSO: Lazy<Regex> = Lazy::new(|| compile(r"انظر\s+أيضًا|انظر\s+ايضاً|انظر\s+ايضا|انظر\s+أيضا"));
static SERIES_META: Lazy<Regex> = Lazy::new(|| {
    compile(r"الكتاب|سلسلة|المؤلف|تأليف|ترجمة|دار النشر|من سلسلة|الطبعة")
});
static YEAR: Lazy<Regex> = Lazy::new(|| compile(r"(?:19|20)[0-9]{2}|[\x{0660}-\x{0669}]{4}"));

/// Truncate a trailing citation block, if one is found.
///
/// Tried in order: a divider line near the bottom; a tail with at least two
/// reference-keyword or Latin-heavy lines (one must carry a keyword); a
/// "see also" line near the end followed by series/publisher/date metadata.
pub fn strip_reference_footer<'a>(lines: &[&'a str], config: &CleanerConfig) -> Vec<&'a str> {
    let n = lines.len();
    if n < config.footer_min_lines {
        return lines.to_vec();
    }

    if let Some(cut) = divider_cut(lines, config) {
        return lines[..cut].to_vec();
    }
    if let Some(cut) = reference_tail_cut(lines, config) {
        return lines[..cut].to_vec();
    }
    if let Some(cut) = see_also_cut(lines, config) {
        return lines[..cut].to_vec();
    }

    lines.to_vec()
}

fn divider_cut(lines: &[&str], config: &CleanerConfig) -> Option<usize> {
    let n = lines.len();
    (n.saturating_sub(config.footer_divider_window)..n).find(|&i| is_divider_line(lines[i]))
}

fn reference_tail_cut(lines: &[&str], config: &CleanerConfig) -> Option<usize> {
    let n = lines.len();
    let mut candidates = Vec::new();
    let mut has_keyword = false;

    for i in n.saturating_sub(config.footer_lookback)..n {
        let line = lines[i].trim();
        if line.is_empty() {
            continue;
        }
        if REFERENCE_WORD.is_match(line) {
            has_keyword = true;
            candidates.push(i);
        } else if count_latin(line) >= config.footer_latin_min {
            candidates.push(i);
        }
    }

    if !has_keyword || candidates.len() < 2 {
        return None;
    }
    let start = candidates[0];
    (start >= n.saturating_sub(config.footer_start_window)).then_some(start)
}

fn see_also_cut(lines: &[&str], config: &CleanerConfig) -> Option<usize> {
    let n = lines.len();
    for i in n.saturating_sub(config.see_also_window)..n {
        if !SEE_ALSO.is_match(lines[i]) {
            continue;
        }
        let has_meta = lines[i..]
            .iter()
            .any(|l| SERIES_META.is_match(l) || YEAR.is_match(l));
        if has_meta {
            return Some(i);
        }
    }
    None
}
