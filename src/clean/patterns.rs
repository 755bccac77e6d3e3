//! Line-level predicates shared by the page classifier.
//!
//! Digits are matched in ASCII, Arabic-Indic (U+0660..U+0669) and extended
//! Arabic-Indic (U+06F0..U+06F9) forms everywhere.

use once_cell::sync::Lazy;
use regex::Regex;

/// Character class body for every supported digit script
pub const DIGITS: &str = r"0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}";

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {:?}: {}", pattern, e))
}

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| compile(&format!(r"^[{DIGITS}]+$")));
static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| compile(r"^[ivxlcdm]+$"));
static PAGE_LABEL: Lazy<Regex> = Lazy::new(|| compile(&format!(r"(?i)^(?:page|صفحة)\s*[{DIGITS}]+$")));

static TOC_DOTTED: Lazy<Regex> = Lazy::new(|| compile(&format!(r"\.{{3,}}\s*[{DIGITS}]{{1,4}}\s*$")));
static TOC_LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| compile(&format!(r"^[{DIGITS}]{{1,4}}\s+.+$")));
static TOC_TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| compile(&format!(r"^.+\s[{DIGITS}]{{1,4}}\s*$")));

static ARABIC_WORD: Lazy<Regex> = Lazy::new(|| compile(r"[\x{0600}-\x{06FF}]{3,}"));
static SENTENCE_PUNCT: Lazy<Regex> = Lazy::new(|| compile(r"[.؟!؛،]"));
static CATALOG_PUNCT: Lazy<Regex> = Lazy::new(|| compile(r"[.؟!؛،:]"));

static CONTENTS_HEADING: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:فهرس المحتويات|الفهرس|المحتويات|table of contents|contents)\b")
});

static HANDLE: Lazy<Regex> = Lazy::new(|| compile(r"@[A-Za-z0-9_.]{2,}"));
static EMAIL: Lazy<Regex> = Lazy::new(|| compile(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"));
static URL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)https?://|www\."));
static BARE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)[A-Za-z0-9-]+\.(?:com|net|org|io|sa|me|app|edu|gov)(?:[^A-Za-z0-9_]|$)")
});
static CONTACT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    compile(r"للتواصل|الموقع\s*الإلكتروني|الموقع الالكتروني|موقع\s*الكتروني|حساب|حسابات|تويتر|سناب|انستقرام")
});
static MESSENGER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)واتس|واتساب|whats\s*app"));
static INTL_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"^(?:\+|00)[0-9]{6,}"));

static BIBLIO_META: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)فهرسة\s+مكتبة|مكتبة\s+الملك\s+فهد|أثناء\s+النشر|ردمك|isbn|رقم\s+الإيداع|التصنيف|ديوي",
        r"|رقم\s+التسجيل|الترقيم\s+الدولي|حقوق\s+النشر|جميع\s+الحقوق|الناشر|دار\s+النشر|الطبعة",
        r"|التجهيز\s+الفني|تصميم|مصمم|الغلاف|لجنة\s+النشر|النشر\s+و\s*التوزيع|مركز\s+خدمة\s+المؤلفين",
        r"|خدمة\s+المؤلفين|طباعة|تسويق|توزيع",
    ))
});
static PHYSICAL_SIZE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"[{DIGITS}]+\s*×\s*[{DIGITS}]+\s*سم")));
static PAGE_COUNT_ENTRY: Lazy<Regex> = Lazy::new(|| compile(r"(?:^|\s)ص\s*[؛;]"));

static CHAPTER_MARKER: Lazy<Regex> = Lazy::new(|| compile(r"^(?:الفصل|الباب)\s+"));

static DOTTED_LEADER: Lazy<Regex> = Lazy::new(|| compile(r"\.{5,}"));
static BULLETS_ONLY: Lazy<Regex> = Lazy::new(|| compile(r"^[\x{2022}\x{00B7}]+$"));
static DIVIDER: Lazy<Regex> = Lazy::new(|| compile(r"^[.\-_]{3,}$"));
static LONG_DIVIDER: Lazy<Regex> = Lazy::new(|| compile(r"^[.\-_]{5,}$"));

static NUMBER_AFTER_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"([.!؟])[ \t]*[{DIGITS}]{{1,3}}[ \t]+([A-Za-zء-ي])"))
});
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"^([^{DIGITS}]*?)[ \t][{DIGITS}]{{1,3}}[ \t]*$"))
});

/// Trimmed, non-empty lines of a page
pub fn page_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

pub fn is_digit_char(c: char) -> bool {
    c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c) || ('\u{06F0}'..='\u{06F9}').contains(&c)
}

pub fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

pub fn count_arabic(text: &str) -> usize {
    text.chars().filter(|&c| is_arabic_char(c)).count()
}

pub fn count_latin(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_alphabetic()).count()
}

pub fn count_catalog_punctuation(text: &str) -> usize {
    CATALOG_PUNCT.find_iter(text).count()
}

/// Three or more consecutive Arabic letters
pub fn has_arabic_word(line: &str) -> bool {
    ARABIC_WORD.is_match(line)
}

/// Bare page numbers in any digit script, lowercase roman numerals, "page 3" / "صفحة ٣"
pub fn is_page_number_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    DIGITS_ONLY.is_match(&compact) || ROMAN_NUMERAL.is_match(&compact) || PAGE_LABEL.is_match(trimmed)
}

pub fn is_toc_like_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && (TOC_DOTTED.is_match(trimmed)
            || TOC_LEADING_NUMBER.is_match(trimmed)
            || TOC_TRAILING_NUMBER.is_match(trimmed))
}

/// Short Arabic title without sentence punctuation, as listed in contents pages
pub fn is_short_title_line(line: &str, max_len: usize) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && ARABIC_WORD.is_match(trimmed)
        && trimmed.chars().count() <= max_len
        && !SENTENCE_PUNCT.is_match(trimmed)
}

pub fn is_contents_heading_line(line: &str) -> bool {
    CONTENTS_HEADING.is_match(line.trim())
}

/// Page text mentions a contents heading anywhere
pub fn mentions_contents(text: &str) -> bool {
    text.contains("المحتويات") || text.contains("الفهرس")
}

pub fn looks_like_phone(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() {
        return false;
    }
    if MESSENGER.is_match(t) {
        return true;
    }
    let compact: String = t.chars().filter(|c| !c.is_whitespace()).collect();
    if INTL_PREFIX.is_match(&compact) {
        return true;
    }
    t.chars().filter(|&c| is_digit_char(c)).count() >= 9
}

/// Social handles, emails, URLs, bare domains, contact phrases, phone numbers
pub fn looks_like_contact_line(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() {
        return false;
    }
    HANDLE.is_match(t)
        || EMAIL.is_match(t)
        || URL.is_match(t)
        || BARE_DOMAIN.is_match(t)
        || CONTACT_KEYWORDS.is_match(t)
        || looks_like_phone(t)
}

/// Catalog-in-publication, registration, publisher and physical-description lines
pub fn looks_like_bibliographic_line(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty() && (BIBLIO_META.is_match(t) || PHYSICAL_SIZE.is_match(t) || PAGE_COUNT_ENTRY.is_match(t))
}

pub fn is_intro_marker_line(line: &str) -> bool {
    line.trim() == "مقدمة"
}

pub fn is_chapter_marker_line(line: &str) -> bool {
    CHAPTER_MARKER.is_match(line.trim())
}

/// Dotted leaders, bullet-only lines and short dividers
pub fn is_decorative_line(line: &str) -> bool {
    DOTTED_LEADER.is_match(line) || BULLETS_ONLY.is_match(line) || DIVIDER.is_match(line)
}

pub fn is_divider_line(line: &str) -> bool {
    LONG_DIVIDER.is_match(line.trim())
}

/// Strip page numbers left inside a line: after sentence-ending punctuation
/// before a letter, and a trailing number on a line with no other digits.
pub fn remove_inline_page_numbers(line: &str) -> String {
    let line = NUMBER_AFTER_SENTENCE.replace_all(line, "${1} ${2}");
    TRAILING_NUMBER.replace(&line, "${1}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_lines() {
        assert!(is_page_number_line("12"));
        assert!(is_page_number_line("١٢٣"));
        assert!(is_page_number_line("۴۵"));
        assert!(is_page_number_line(" 1 2 "));
        assert!(is_page_number_line("xiv"));
        assert!(is_page_number_line("Page 7"));
        assert!(is_page_number_line("صفحة ٣"));
        assert!(!is_page_number_line("XIV"));
        assert!(!is_page_number_line("الفصل 3"));
        assert!(!is_page_number_line(""));
    }

    #[test]
    fn test_toc_like_lines() {
        assert!(is_toc_like_line("المقدمة ........ 15"));
        assert!(is_toc_like_line("61 السابع"));
        assert!(is_toc_like_line("السابع ٦١"));
        assert!(!is_toc_like_line("كان يا ما كان في قديم الزمان."));
    }

    #[test]
    fn test_short_title_lines() {
        assert!(is_short_title_line("رحلة إلى الشرق", 40));
        assert!(!is_short_title_line("رحلة إلى الشرق.", 40));
        assert!(!is_short_title_line("ab cd", 40));
    }

    #[test]
    fn test_contact_lines() {
        assert!(looks_like_contact_line("تابعونا @qabas_books"));
        assert!(looks_like_contact_line("info@example.org"));
        assert!(looks_like_contact_line("www.example.net"));
        assert!(looks_like_contact_line("example.com"));
        assert!(looks_like_contact_line("للتواصل: 0555"));
        assert!(looks_like_contact_line("+966 555 123 456"));
        assert!(looks_like_contact_line("٠٥٥٥١٢٣٤٥٦"));
        assert!(!looks_like_contact_line("ذهب الولد إلى المدرسة صباحا."));
        assert!(!looks_like_contact_line("example.community"));
    }

    #[test]
    fn test_bibliographic_lines() {
        assert!(looks_like_bibliographic_line("ردمك: ٩٧٨-٦٠٣"));
        assert!(looks_like_bibliographic_line("ISBN 978-1-4028"));
        assert!(looks_like_bibliographic_line("٢٤٠ ص ؛ ١٧×٢٤ سم"));
        assert!(looks_like_bibliographic_line("الطبعة الأولى"));
        assert!(!looks_like_bibliographic_line("ثم عاد إلى بيته حزينا."));
    }

    #[test]
    fn test_markers() {
        assert!(is_intro_marker_line(" مقدمة "));
        assert!(!is_intro_marker_line("مقدمة الكتاب"));
        assert!(is_chapter_marker_line("الفصل الأول"));
        assert!(is_chapter_marker_line("الباب الثاني: البدايات"));
        assert!(!is_chapter_marker_line("الفصلان"));
    }

    #[test]
    fn test_decorative_lines() {
        assert!(is_decorative_line("عنوان ..........."));
        assert!(is_decorative_line("•••"));
        assert!(is_decorative_line("---"));
        assert!(is_decorative_line("___"));
        assert!(!is_decorative_line("--"));
        assert!(is_divider_line("_____"));
        assert!(!is_divider_line("___"));
    }

    #[test]
    fn test_inline_page_numbers() {
        assert_eq!(remove_inline_page_numbers("انتهى الكلام. 12 ثم بدأ"), "انتهى الكلام. ثم بدأ");
        assert_eq!(remove_inline_page_numbers("نهاية السطر 45"), "نهاية السطر");
        assert_eq!(remove_inline_page_numbers("عام 1990 كان 45"), "عام 1990 كان 45");
        assert_eq!(remove_inline_page_numbers("عام 1990"), "عام 1990");
    }

    #[test]
    fn test_contents_heading() {
        assert!(is_contents_heading_line("الفهرس"));
        assert!(is_contents_heading_line("Table of Contents"));
        assert!(!is_contents_heading_line("المحتوياتها"));
        assert!(mentions_contents("قائمة المحتويات"));
    }
}
