use serde::{Deserialize, Serialize};
use std::fmt;

use super::language::{is_mostly_foreign, looks_like_references_page};
use super::patterns::{
    count_arabic, count_catalog_punctuation, is_chapter_marker_line, is_intro_marker_line, is_short_title_line,
    is_toc_like_line, looks_like_bibliographic_line, looks_like_contact_line, mentions_contents, page_lines,
};
use crate::config::CleanerConfig;

/// Outcome of classifying one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Content,
    TableOfContents,
    PublisherOrFrontMatter,
    References,
    ForeignLanguageOrNoise,
    Empty,
}

impl PageKind {
    pub fn is_content(self) -> bool {
        self == PageKind::Content
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Content => "content",
            PageKind::TableOfContents => "table_of_contents",
            PageKind::PublisherOrFrontMatter => "publisher_or_front_matter",
            PageKind::References => "references",
            PageKind::ForeignLanguageOrNoise => "foreign_language_or_noise",
            PageKind::Empty => "empty",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One drop rule: returns a kind when the page should not be kept
pub type PageRule = fn(&str, usize, &CleanerConfig) -> Option<PageKind>;

/// Rules applied to the raw page, in order
pub const RAW_PAGE_RULES: &[PageRule] = &[front_matter_rule, table_of_contents_rule, publisher_rule];

/// Rules applied to the filtered page text, in order
pub const FILTERED_PAGE_RULES: &[PageRule] = &[front_matter_rule, references_rule, foreign_rule];

/// First matching rule wins
pub fn first_match(rules: &[PageRule], text: &str, index: usize, config: &CleanerConfig) -> Option<PageKind> {
    rules.iter().find_map(|rule| rule(text, index, config))
}

fn front_matter_rule(text: &str, index: usize, config: &CleanerConfig) -> Option<PageKind> {
    is_front_matter_page(text, index, config).then_some(PageKind::PublisherOrFrontMatter)
}

fn table_of_contents_rule(text: &str, index: usize, config: &CleanerConfig) -> Option<PageKind> {
    is_table_of_contents_page(text, index, config).then_some(PageKind::TableOfContents)
}

fn publisher_rule(text: &str, _index: usize, _config: &CleanerConfig) -> Option<PageKind> {
    has_publisher_keyword(text).then_some(PageKind::PublisherOrFrontMatter)
}

fn references_rule(text: &str, _index: usize, config: &CleanerConfig) -> Option<PageKind> {
    looks_like_references_page(text, config).then_some(PageKind::References)
}

fn foreign_rule(text: &str, _index: usize, config: &CleanerConfig) -> Option<PageKind> {
    is_mostly_foreign(text, config).then_some(PageKind::ForeignLanguageOrNoise)
}

/// Catalog-in-publication, copyright and contact pages.
///
/// Pages carrying an intro or chapter marker are never front matter. Early
/// pages drop on strong signals or on dense catalog lines; later pages need
/// strong signals and a high combined line count.
pub fn is_front_matter_page(text: &str, index: usize, config: &CleanerConfig) -> bool {
    let lines = page_lines(text);
    if lines.is_empty() {
        return false;
    }
    if lines.iter().any(|l| is_intro_marker_line(l) || is_chapter_marker_line(l)) {
        return false;
    }

    let mut meta = 0;
    let mut contact = 0;
    for line in lines.iter().take(config.front_matter_scan_lines) {
        if looks_like_bibliographic_line(line) {
            meta += 1;
        }
        if looks_like_contact_line(line) {
            contact += 1;
        }
    }
    let combined = meta + contact;

    let strong = meta >= config.front_matter_meta_strong
        || (meta >= config.front_matter_pair_min && contact >= config.front_matter_pair_min)
        || contact >= config.front_matter_contact_strong;

    let coverage_min = config
        .cip_min_lines
        .max((lines.len() as f32 * config.cip_coverage).floor() as usize);
    let cip_like = combined >= coverage_min
        && count_catalog_punctuation(text) <= config.cip_max_punctuation
        && count_arabic(text) < config.cip_max_arabic_letters;

    if index < config.front_matter_early_pages {
        strong || cip_like
    } else {
        strong && combined >= config.front_matter_late_min_combined
    }
}

/// Contents pages: an explicit heading anywhere, or (near the start of the
/// book) a page made mostly of numbered entries and short titles.
pub fn is_table_of_contents_page(text: &str, index: usize, config: &CleanerConfig) -> bool {
    if mentions_contents(text) {
        return true;
    }
    if index > config.toc_max_page_index {
        return false;
    }

    let lines = page_lines(text);
    if lines.len() < config.toc_min_candidates {
        return false;
    }

    let candidates = lines
        .iter()
        .filter(|l| is_toc_like_line(l) || is_short_title_line(l, config.short_title_max_len))
        .count();

    candidates >= config.toc_min_candidates && candidates as f32 >= lines.len() as f32 * config.toc_coverage
}

const PUBLISHER_KEYWORDS: &[&str] = &[
    "مؤسسة هنداوي",
    "الناشر",
    "hindawi.org",
    "حقوق النشر",
    "الترقيم الدولي",
    "isbn",
    "copyright",
];

pub fn has_publisher_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    PUBLISHER_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CleanerConfig {
        CleanerConfig::default()
    }

    const CIP_PAGE: &str = "فهرسة مكتبة الملك فهد الوطنية أثناء النشر\n\
        ردمك ٩٧٨-٦٠٣-٠٠\n\
        رقم الإيداع ١٤٤٠/١٢٣٤\n\
        الطبعة الأولى\n\
        تصميم الغلاف\n\
        ٢٤٠ ص ؛ ١٧×٢٤ سم";

    #[test]
    fn test_catalog_page_is_front_matter_early() {
        assert!(is_front_matter_page(CIP_PAGE, 3, &cfg()));
    }

    #[test]
    fn test_catalog_page_late_needs_more_evidence() {
        assert!(!is_front_matter_page(CIP_PAGE, 40, &cfg()));

        let heavy = format!(
            "{}\nللتواصل\ninfo@example.org\nwww.example.com\n@qabas_books",
            CIP_PAGE
        );
        assert!(is_front_matter_page(&heavy, 40, &cfg()));
    }

    #[test]
    fn test_chapter_marker_exempts_page() {
        let page = format!("الفصل الأول\n{}", CIP_PAGE);
        assert!(!is_front_matter_page(&page, 3, &cfg()));

        let intro = format!("مقدمة\n{}", CIP_PAGE);
        assert!(!is_front_matter_page(&intro, 3, &cfg()));
    }

    #[test]
    fn test_prose_is_not_front_matter() {
        let page = "كان الصباح هادئا في القرية الصغيرة،\nوخرج الناس إلى حقولهم مبكرين كعادتهم.";
        assert!(!is_front_matter_page(page, 1, &cfg()));
    }

    const STRUCTURAL_TOC: &str = "المقدمة ........ 5\nالباب الأول 11\nالباب الثاني 27\nرحلة إلى الشرق\nالخاتمة 98";

    #[test]
    fn test_structural_toc_only_near_start() {
        assert!(is_table_of_contents_page(STRUCTURAL_TOC, 2, &cfg()));
        assert!(!is_table_of_contents_page(STRUCTURAL_TOC, 50, &cfg()));
    }

    #[test]
    fn test_contents_heading_anywhere() {
        assert!(is_table_of_contents_page("الفهرس\nشيء ما", 120, &cfg()));
    }

    #[test]
    fn test_prose_is_not_toc() {
        let page = "ذهب إلى السوق صباحا.\nاشترى خبزا وتمرا.\nثم عاد إلى البيت.\nجلس مع أمه.\nونام مبكرا.";
        assert!(!is_table_of_contents_page(page, 2, &cfg()));
    }

    #[test]
    fn test_publisher_keywords() {
        assert!(has_publisher_keyword("Copyright © 2020"));
        assert!(has_publisher_keyword("صدر عن مؤسسة هنداوي"));
        assert!(!has_publisher_keyword("نص عادي"));
    }

    #[test]
    fn test_rule_order() {
        // A contents page that also names a publisher reports as contents
        let page = "الفهرس\nالناشر";
        assert_eq!(first_match(RAW_PAGE_RULES, page, 5, &cfg()), Some(PageKind::TableOfContents));
        assert_eq!(first_match(RAW_PAGE_RULES, "نص عادي طويل", 5, &cfg()), None);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PageKind::TableOfContents.to_string(), "table_of_contents");
        assert_eq!(serde_json::to_string(&PageKind::ForeignLanguageOrNoise).unwrap(), "\"foreign_language_or_noise\"");
    }
}
