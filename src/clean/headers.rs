use std::collections::{BTreeSet, HashMap, HashSet};

use super::patterns::{is_page_number_line, page_lines};
use crate::config::CleanerConfig;

/// Running headers and footers detected across a whole document
#[derive(Debug, Clone, Default)]
pub struct HeaderFooterSet {
    lines: HashSet<String>,
}

impl HeaderFooterSet {
    /// Count edge lines (first `header_top_lines`, last `header_bottom_lines`)
    /// over every page and register those seen at least
    /// `header_min_occurrences` times. Page numbers and long lines never count.
    pub fn detect<S: AsRef<str>>(pages: &[S], config: &CleanerConfig) -> Self {
        let mut freq: HashMap<&str, usize> = HashMap::new();

        for page in pages {
            let lines = page_lines(page.as_ref());
            let n = lines.len();

            // Each position once, even when the two windows overlap
            let positions: BTreeSet<usize> = (0..n.min(config.header_top_lines))
                .chain(n.saturating_sub(config.header_bottom_lines)..n)
                .collect();

            for pos in positions {
                let line = lines[pos];
                if is_page_number_line(line) || line.chars().count() > config.header_max_len {
                    continue;
                }
                *freq.entry(line).or_insert(0) += 1;
            }
        }

        let lines = freq
            .into_iter()
            .filter(|(_, count)| *count >= config.header_min_occurrences)
            .map(|(line, _)| line.to_string())
            .collect();

        Self { lines }
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.contains(line.trim())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_edge_lines_are_registered() {
        let pages = vec![
            "عنوان الكتاب\nنص الصفحة الأولى.\n١".to_string(),
            "عنوان الكتاب\nنص الصفحة الثانية.\n٢".to_string(),
            "نص الصفحة الثالثة بلا عنوان.".to_string(),
        ];
        let set = HeaderFooterSet::detect(&pages, &CleanerConfig::default());
        assert!(set.contains("عنوان الكتاب"));
        assert!(!set.contains("١"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_single_line_page_not_double_counted() {
        let pages = ["سطر وحيد"];
        let set = HeaderFooterSet::detect(&pages, &CleanerConfig::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_middle_lines_do_not_count() {
        let pages = [
            "أ\nب\nج\nالفصل الأول\nد\nهـ",
            "الفصل الأول\nو\nز\nح\nط\nي",
        ];
        let set = HeaderFooterSet::detect(&pages, &CleanerConfig::default());
        assert!(!set.contains("الفصل الأول"));
    }

    #[test]
    fn test_long_lines_ignored() {
        let long = "كلمة ".repeat(20);
        let pages = [long.clone(), long];
        let set = HeaderFooterSet::detect(&pages, &CleanerConfig::default());
        assert!(set.is_empty());
    }
}
