//! Page classification and cleaning.
//!
//! Pass 1 registers running headers/footers across the document; pass 2
//! decides each page through an ordered chain of drop rules, filters the
//! surviving lines and strips inline foreign-script tokens.

pub mod classify;
pub mod cleaner;
pub mod footer;
pub mod headers;
pub mod language;
pub mod patterns;

pub use classify::PageKind;
pub use cleaner::{page_file_name, CleanedDocument, CleanedPage, PageCleaner};
pub use headers::HeaderFooterSet;
