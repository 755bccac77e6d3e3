use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::classify::{first_match, PageKind, FILTERED_PAGE_RULES, RAW_PAGE_RULES};
use super::footer::strip_reference_footer;
use super::headers::HeaderFooterSet;
use super::language::strip_inline_foreign;
use super::patterns::{
    is_chapter_marker_line, is_contents_heading_line, is_decorative_line, is_intro_marker_line,
    is_page_number_line, looks_like_bibliographic_line, looks_like_contact_line, page_lines,
    remove_inline_page_numbers,
};
use crate::config::CleanerConfig;

/// `page-001.txt` for index 0
pub fn page_file_name(index: usize) -> String {
    format!("page-{:03}.txt", index + 1)
}

/// One classified page. `text` is empty unless `kind` is `Content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedPage {
    pub index: usize,
    pub kind: PageKind,
    pub text: String,
}

impl CleanedPage {
    fn dropped(index: usize, kind: PageKind) -> Self {
        Self {
            index,
            kind,
            text: String::new(),
        }
    }

    pub fn is_content(&self) -> bool {
        self.kind.is_content()
    }

    /// Per-page artifact body: the text plus a newline, empty when dropped
    pub fn artifact_text(&self) -> String {
        if self.is_content() {
            format!("{}\n", self.text)
        } else {
            String::new()
        }
    }
}

/// Cleaned pages, one per raw page, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedDocument {
    pub pages: Vec<CleanedPage>,
}

impl CleanedDocument {
    /// `(file name, body)` for every page slot, dropped pages included
    pub fn page_files(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.pages
            .iter()
            .map(|p| (page_file_name(p.index), p.artifact_text()))
    }

    /// Content pages joined by a blank line
    pub fn combined_text(&self) -> String {
        self.content_pages()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn content_pages(&self) -> impl Iterator<Item = &CleanedPage> {
        self.pages.iter().filter(|p| p.is_content())
    }

    pub fn content_count(&self) -> usize {
        self.content_pages().count()
    }

    pub fn kind_counts(&self) -> BTreeMap<PageKind, usize> {
        let mut counts = BTreeMap::new();
        for page in &self.pages {
            *counts.entry(page.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Two-pass page cleaner: header/footer detection over the whole document,
/// then an ordered per-page decision.
#[derive(Debug, Clone, Default)]
pub struct PageCleaner {
    config: CleanerConfig,
}

impl PageCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn clean_document<S: AsRef<str>>(&self, raw_pages: &[S]) -> CleanedDocument {
        let headers = HeaderFooterSet::detect(raw_pages, &self.config);
        if !headers.is_empty() {
            info!("Detected {} repeated header/footer lines", headers.len());
        }

        let pages: Vec<CleanedPage> = raw_pages
            .iter()
            .enumerate()
            .map(|(index, raw)| self.clean_page(index, raw.as_ref(), &headers))
            .collect();

        let document = CleanedDocument { pages };
        info!(
            "Pages cleaned: {} raw, {} content, {} chars combined",
            document.len(),
            document.content_count(),
            document.combined_text().chars().count()
        );
        document
    }

    /// Classify and clean a single page against a known header set
    pub fn clean_page(&self, index: usize, raw: &str, headers: &HeaderFooterSet) -> CleanedPage {
        let raw = raw.trim();
        if raw.is_empty() {
            return CleanedPage::dropped(index, PageKind::Empty);
        }

        if let Some(kind) = first_match(RAW_PAGE_RULES, raw, index, &self.config) {
            debug!("Page {} dropped before line filtering: {}", index, kind);
            return CleanedPage::dropped(index, kind);
        }

        let filtered = self.filter_lines(raw, headers);
        if filtered.is_empty() {
            debug!("Page {} empty after line filtering", index);
            return CleanedPage::dropped(index, PageKind::Empty);
        }

        if let Some(kind) = first_match(FILTERED_PAGE_RULES, &filtered, index, &self.config) {
            debug!("Page {} dropped after line filtering: {}", index, kind);
            return CleanedPage::dropped(index, kind);
        }

        // Stripping foreign tokens can expose page numbers and dividers
        let text = self.filter_lines(&strip_inline_foreign(&filtered), headers);
        if text.is_empty() {
            return CleanedPage::dropped(index, PageKind::Empty);
        }
        if let Some(kind) = first_match(FILTERED_PAGE_RULES, &text, index, &self.config) {
            debug!("Page {} dropped after foreign stripping: {}", index, kind);
            return CleanedPage::dropped(index, kind);
        }

        CleanedPage {
            index,
            kind: PageKind::Content,
            text,
        }
    }

    fn filter_lines(&self, raw: &str, headers: &HeaderFooterSet) -> String {
        let structural: Vec<&str> = page_lines(raw)
            .into_iter()
            .filter(|l| {
                !is_page_number_line(l)
                    && !headers.contains(l)
                    && !is_contents_heading_line(l)
                    && !looks_like_contact_line(l)
            })
            .collect();

        strip_reference_footer(&structural, &self.config)
            .into_iter()
            .filter(|l| is_intro_marker_line(l) || is_chapter_marker_line(l) || !looks_like_bibliographic_line(l))
            .filter(|l| !is_decorative_line(l))
            .map(remove_inline_page_numbers)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> PageCleaner {
        PageCleaner::new(CleanerConfig::default())
    }

    fn prose(page: usize, lines: usize) -> Vec<String> {
        (0..lines)
            .map(|line| format!("كتب الراوي في الصفحة {page} والسطر {line} كلاما جميلا عن القرية."))
            .collect()
    }

    fn prose_page(page: usize) -> String {
        prose(page, 6).join("\n")
    }

    #[test]
    fn test_repeated_chapter_header_removed() {
        let mut pages = Vec::new();
        for p in 0..7 {
            let mut lines = prose(p, 6);
            if p < 5 {
                lines.insert(0, "الفصل الأول".to_string());
            }
            pages.push(lines.join("\n"));
        }

        let doc = cleaner().clean_document(&pages);
        assert_eq!(doc.len(), 7);
        assert_eq!(doc.content_count(), 7);
        for page in &doc.pages {
            assert!(!page.text.contains("الفصل الأول"));
            assert_eq!(page.text, prose_page(page.index));
        }
    }

    #[test]
    fn test_single_mid_body_heading_kept() {
        let mut middle = prose(1, 6);
        middle.insert(3, "الفصل الأول".to_string());
        let pages = vec![prose_page(0), middle.join("\n"), prose_page(2)];

        let doc = cleaner().clean_document(&pages);
        assert!(doc.pages[1].text.contains("الفصل الأول"));
    }

    const TOC_LINES: &[&str] = &[
        "3 البداية",
        "9 الرحلة",
        "17 الصحراء",
        "25 المدينة",
        "40 السوق",
        "58 البحر",
        "77 العودة",
        "102 الخاتمة",
    ];

    #[test]
    fn test_structural_toc_dropped_only_near_start() {
        let toc = TOC_LINES.join("\n");

        let early = vec![prose_page(0), prose_page(1), toc.clone()];
        let doc = cleaner().clean_document(&early);
        assert_eq!(doc.pages[2].kind, PageKind::TableOfContents);
        assert!(doc.pages[2].text.is_empty());

        let mut late: Vec<String> = (0..50).map(prose_page).collect();
        late.push(toc.clone());
        let doc = cleaner().clean_document(&late);
        assert_eq!(doc.pages[50].kind, PageKind::Content);
        assert_eq!(doc.pages[50].text, toc);
    }

    #[test]
    fn test_see_also_footer_stripped() {
        let page = "كان الصباح هادئا في القرية الصغيرة،\n\
            وخرج الناس إلى حقولهم مبكرين كعادتهم.\n\
            ثم عادوا عند الغروب.\n\
            انظر أيضًا\n\
            رواية الأيام، دار النشر 1995";
        let doc = cleaner().clean_document(&[page]);
        assert_eq!(
            doc.pages[0].text,
            "كان الصباح هادئا في القرية الصغيرة،\nوخرج الناس إلى حقولهم مبكرين كعادتهم.\nثم عادوا عند الغروب."
        );
    }

    #[test]
    fn test_front_matter_references_and_foreign_pages() {
        let cip = "فهرسة مكتبة الملك فهد الوطنية أثناء النشر\nردمك ٩٧٨-٦٠٣-٠٠\nرقم الإيداع ١٤٤٠/١٢٣٤\nالطبعة الأولى\nتصميم الغلاف";
        let refs = "المراجع\nحسين، طه. الأيام (1929).\nمحفوظ، نجيب. الثلاثية ١٩٥٦.\nالعقاد، عباس. العبقريات ١٩٤٢.";
        let foreign = "This chapter discusses the history of printing presses in the region and their impact.";
        let pages = vec![cip.to_string(), prose_page(1), refs.to_string(), foreign.to_string(), "  ".to_string()];

        let doc = cleaner().clean_document(&pages);
        let kinds: Vec<PageKind> = doc.pages.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PageKind::PublisherOrFrontMatter,
                PageKind::Content,
                PageKind::References,
                PageKind::ForeignLanguageOrNoise,
                PageKind::Empty,
            ]
        );
        assert_eq!(doc.combined_text(), prose_page(1));
        assert_eq!(doc.kind_counts()[&PageKind::Content], 1);
    }

    #[test]
    fn test_contact_and_page_number_lines_removed() {
        let page = format!("{}\nتابعونا @qabas_books\n١٢", prose_page(0));
        let doc = cleaner().clean_document(&[page]);
        assert_eq!(doc.pages[0].text, prose_page(0));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let mut pages = Vec::new();
        for p in 0..7 {
            let mut lines = prose(p, 6);
            if p < 5 {
                lines.insert(0, "الفصل الأول".to_string());
            }
            lines.insert(3, "عاد الراوي إلى البيت 12 Chapter".to_string());
            lines.insert(5, "رأى Smith القافلة عند الغروب".to_string());
            lines.push(format!("{}", p + 1));
            pages.push(lines.join("\n"));
        }
        pages.push(TOC_LINES.join("\n"));

        let c = cleaner();
        let doc = c.clean_document(&pages);
        let none = HeaderFooterSet::default();
        for page in doc.content_pages() {
            let lines: Vec<&str> = page.text.lines().collect();
            assert!(lines.contains(&"عاد الراوي إلى البيت"));
            assert!(lines.contains(&"رأى القافلة عند الغروب"));
            let again = c.clean_page(page.index, &page.text, &none);
            assert_eq!(&again, page);
        }
    }

    #[test]
    fn test_page_files_keep_every_slot() {
        let doc = cleaner().clean_document(&[prose_page(0), String::new(), prose_page(2)]);
        let files: Vec<(String, String)> = doc.page_files().collect();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], ("page-001.txt".to_string(), format!("{}\n", prose_page(0))));
        assert_eq!(files[1], ("page-002.txt".to_string(), String::new()));
        assert_eq!(files[2].0, "page-003.txt");
    }

    #[test]
    fn test_cleaning_never_invents_lines() {
        let page = format!(
            "{}\nرأى Smith القافلة. 12 ثم رحل\nwww.example.com\n_____\n(1) Brown, Journal of Sands",
            prose_page(3)
        );
        let doc = cleaner().clean_document(&[page.clone()]);
        for line in doc.pages[0].text.lines() {
            let words_present = line.split_whitespace().all(|w| page.contains(w));
            assert!(words_present, "invented line: {}", line);
        }
        assert!(!doc.pages[0].text.contains("Brown"));
    }
}
