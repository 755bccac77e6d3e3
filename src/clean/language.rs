use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::{compile, count_arabic, count_latin, has_arabic_word, page_lines, DIGITS};
use crate::config::CleanerConfig;

static URLS: Lazy<Regex> = Lazy::new(|| compile(r"(?i)https?://\S+|www\.\S+|doi\.org/\S+"));
static DOMAINS: Lazy<Regex> = Lazy::new(|| compile(r"(?i)[A-Za-z0-9-]+\.(?:com|net|org|io|sa|me|app|edu|gov)\S*"));
static EMAILS: Lazy<Regex> = Lazy::new(|| compile(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"));
static HANDLES: Lazy<Regex> = Lazy::new(|| compile(r"@[A-Za-z0-9_.]{2,}"));
static LATIN_WORDS: Lazy<Regex> = Lazy::new(|| compile(r"(?-u:\b)[A-Za-z][A-Za-z'\-]*(?-u:\b)"));
static INTL_PHONES: Lazy<Regex> = Lazy::new(|| compile(r"(?:\+|00)[0-9]{6,}"));
static DIGIT_RUNS: Lazy<Regex> = Lazy::new(|| compile(&format!(r"[{DIGITS}]{{9,}}")));
static SPACES: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

static REFERENCES_HEADING: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:المراجع\s*والمصادر|المراجع|المصادر|references)\b")
});
static PAREN_YEAR: Lazy<Regex> = Lazy::new(|| compile(r"\(\s*[0-9]{4}\s*\)\.?$"));
static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| compile(&format!(r"[{DIGITS}]{{4}}\s*[.)]?$")));
static LINK: Lazy<Regex> = Lazy::new(|| compile(r"(?i)doi\.org|https?|www\."));
static AUTHOR_LIST: Lazy<Regex> = Lazy::new(|| compile(r"[A-Z][A-Za-z]{2,}.*,"));

static NON_CORE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r#"[{DIGITS}\s.,\-_:;()\[\]{{}}/\\|~`'"!?…•٫٬؛،]+"#))
});

/// Remove URLs, domains, DOIs, emails, handles, phone-like runs and Latin
/// words; collapse whitespace and drop lines left empty.
pub fn strip_inline_foreign(text: &str) -> String {
    let mut t = URLS.replace_all(text, " ").into_owned();
    t = DOMAINS.replace_all(&t, " ").into_owned();
    t = EMAILS.replace_all(&t, " ").into_owned();
    t = HANDLES.replace_all(&t, " ").into_owned();
    t = LATIN_WORDS.replace_all(&t, " ").into_owned();
    t = INTL_PHONES.replace_all(&t, " ").into_owned();
    t = DIGIT_RUNS.replace_all(&t, " ").into_owned();

    t.lines()
        .map(|l| SPACES.replace_all(l, " ").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bibliography pages: a references heading up front, or enough
/// citation-shaped lines near the top.
pub fn looks_like_references_page(text: &str, config: &CleanerConfig) -> bool {
    let t = text.trim();
    if REFERENCES_HEADING.is_match(t) {
        return true;
    }

    let hits = page_lines(t)
        .into_iter()
        .take(config.references_scan_lines)
        .filter(|l| {
            PAREN_YEAR.is_match(l) || TRAILING_YEAR.is_match(l) || LINK.is_match(l) || AUTHOR_LIST.is_match(l)
        })
        .count();
    hits >= config.references_min_hits
}

/// Pages that are mostly Latin script, or reduce to noise once foreign
/// tokens, digits and punctuation are gone.
pub fn is_mostly_foreign(text: &str, config: &CleanerConfig) -> bool {
    let latin = count_latin(text);
    let arabic = count_arabic(text);

    if latin >= config.foreign_latin_min.max(config.foreign_latin_ratio * arabic)
        && arabic < config.foreign_arabic_max
    {
        return true;
    }

    let stripped = strip_inline_foreign(text);
    if stripped.is_empty() {
        return true;
    }

    let core_len = NON_CORE.replace_all(&stripped, "").chars().count();
    if core_len < config.noise_core_min {
        return true;
    }

    let arabic_lines = page_lines(&stripped).into_iter().filter(|l| has_arabic_word(l)).count();
    arabic_lines <= 1 && core_len < config.sparse_core_min
}
