use serde::{Deserialize, Serialize};

use crate::clean::page_file_name;

/// Who a book upload belongs to, derived from its object path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadContext {
    /// `audiobooks/{book_id}/...`
    Admin { book_id: String },
    /// `users/{user_id}/mybooks/{doc_id}/...`
    User { user_id: String, doc_id: String },
}

impl UploadContext {
    pub fn from_object_path(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            ["audiobooks", book_id, ..] if !book_id.is_empty() => Some(UploadContext::Admin {
                book_id: book_id.to_string(),
            }),
            ["users", user_id, "mybooks", doc_id, ..] if !user_id.is_empty() && !doc_id.is_empty() => {
                Some(UploadContext::User {
                    user_id: user_id.to_string(),
                    doc_id: doc_id.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Prefix every artifact for this book lives under
    pub fn base_prefix(&self) -> String {
        match self {
            UploadContext::Admin { book_id } => format!("audiobooks/{}", book_id),
            UploadContext::User { user_id, doc_id } => format!("users/{}/mybooks/{}", user_id, doc_id),
        }
    }

    /// Short id for log lines
    pub fn log_id(&self) -> String {
        match self {
            UploadContext::Admin { book_id } => book_id.clone(),
            UploadContext::User { user_id, doc_id } => format!("{}/{}", user_id, doc_id),
        }
    }

    pub fn combined_text_path(&self) -> String {
        format!("{}/book.txt", self.base_prefix())
    }

    pub fn pages_prefix(&self) -> String {
        format!("{}/pages", self.base_prefix())
    }

    /// Per-page artifact, 0-based `index` rendered 1-based
    pub fn page_path(&self, index: usize) -> String {
        format!("{}/{}", self.pages_prefix(), page_file_name(index))
    }

    /// OCR output prefix for one part of one run, 1-based `part`
    pub fn ocr_output_prefix(&self, run_id: &str, part: usize) -> String {
        format!("{}/ocr/{}-p{}/", self.base_prefix(), run_id, part)
    }
}

/// Temporary split part, 0-based `part` rendered 1-based
pub fn temp_part_path(temp_prefix: &str, run_id: &str, part: usize) -> String {
    format!("{}/{}/part-{:03}.pdf", temp_prefix.trim_end_matches('/'), run_id, part + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_upload() {
        let ctx = UploadContext::from_object_path("audiobooks/b42/book.pdf").unwrap();
        assert_eq!(ctx, UploadContext::Admin { book_id: "b42".to_string() });
        assert_eq!(ctx.combined_text_path(), "audiobooks/b42/book.txt");
        assert_eq!(ctx.page_path(0), "audiobooks/b42/pages/page-001.txt");
        assert_eq!(ctx.ocr_output_prefix("run1", 2), "audiobooks/b42/ocr/run1-p2/");
    }

    #[test]
    fn test_user_upload() {
        let ctx = UploadContext::from_object_path("users/u1/mybooks/d9/book.pdf").unwrap();
        assert_eq!(ctx.base_prefix(), "users/u1/mybooks/d9");
        assert_eq!(ctx.log_id(), "u1/d9");
    }

    #[test]
    fn test_unknown_paths_rejected() {
        assert!(UploadContext::from_object_path("uploads/x.pdf").is_none());
        assert!(UploadContext::from_object_path("users/u1/books/d9/book.pdf").is_none());
        assert!(UploadContext::from_object_path("audiobooks").is_none());
    }

    #[test]
    fn test_temp_part_path() {
        assert_eq!(temp_part_path("temp-split/", "r", 0), "temp-split/r/part-001.pdf");
    }
}
