use std::ops::Range;

use crate::error::Result;

/// Contiguous 0-based page ranges of at most `cap` pages covering `0..total`
pub fn plan_parts(total: usize, cap: usize) -> Vec<Range<usize>> {
    let cap = cap.max(1);
    (0..total)
        .step_by(cap)
        .map(|start| start..(start + cap).min(total))
        .collect()
}

/// Splits a source document into page-bounded sub-documents
pub trait DocumentSplitter: Send + Sync {
    fn page_count(&self, bytes: &[u8]) -> Result<usize>;

    /// A standalone document holding only `pages` (0-based, half-open)
    fn extract(&self, bytes: &[u8], pages: Range<usize>) -> Result<Vec<u8>>;
}

#[cfg(feature = "pdf-split")]
pub use pdf::PdfSplitter;

#[cfg(feature = "pdf-split")]
mod pdf {
    use lopdf::Document;
    use std::ops::Range;
    use tracing::debug;

    use super::DocumentSplitter;
    use crate::error::{PipelineError, Result};

    /// PDF splitting backed by `lopdf`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfSplitter;

    impl PdfSplitter {
        fn load(bytes: &[u8]) -> Result<Document> {
            Document::load_mem(bytes).map_err(|e| PipelineError::Pdf(format!("failed to load PDF: {}", e)))
        }
    }

    impl DocumentSplitter for PdfSplitter {
        fn page_count(&self, bytes: &[u8]) -> Result<usize> {
            Ok(Self::load(bytes)?.get_pages().len())
        }

        fn extract(&self, bytes: &[u8], pages: Range<usize>) -> Result<Vec<u8>> {
            let mut doc = Self::load(bytes)?;
            let total = doc.get_pages().len();
            if pages.start >= pages.end || pages.end > total {
                return Err(PipelineError::Pdf(format!(
                    "page range {:?} out of bounds for {} pages",
                    pages, total
                )));
            }

            // lopdf numbers pages from 1
            let drop: Vec<u32> = (1..=total as u32)
                .filter(|n| !pages.contains(&(*n as usize - 1)))
                .collect();
            doc.delete_pages(&drop);
            doc.prune_objects();

            let mut out = Vec::new();
            doc.save_to(&mut out)?;
            debug!("Extracted pages {:?} into {} bytes", pages, out.len());
            Ok(out)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use lopdf::{dictionary, Object, Stream};

        fn sample_pdf(pages: usize) -> Vec<u8> {
            let mut doc = Document::with_version("1.5");
            let pages_id = doc.new_object_id();
            let mut kids: Vec<Object> = Vec::new();
            for i in 0..pages {
                let content = format!("BT /F1 12 Tf 72 720 Td (page {}) Tj ET", i + 1);
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                });
                kids.push(page_id.into());
            }
            doc.objects.insert(
                pages_id,
                Object::Dictionary(dictionary! {
                    "Type" => "Pages",
                    "Kids" => kids,
                    "Count" => pages as i64,
                }),
            );
            let catalog_id = doc.add_object(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            });
            doc.trailer.set("Root", catalog_id);

            let mut bytes = Vec::new();
            doc.save_to(&mut bytes).unwrap();
            bytes
        }

        #[test]
        fn test_page_count() {
            let bytes = sample_pdf(5);
            assert_eq!(PdfSplitter.page_count(&bytes).unwrap(), 5);
        }

        #[test]
        fn test_extract_range() {
            let bytes = sample_pdf(5);
            let part = PdfSplitter.extract(&bytes, 1..3).unwrap();
            assert_eq!(PdfSplitter.page_count(&part).unwrap(), 2);

            let last = PdfSplitter.extract(&bytes, 4..5).unwrap();
            assert_eq!(PdfSplitter.page_count(&last).unwrap(), 1);
        }

        #[test]
        fn test_extract_out_of_bounds() {
            let bytes = sample_pdf(2);
            assert!(PdfSplitter.extract(&bytes, 1..4).is_err());
        }

        #[test]
        fn test_garbage_is_pdf_error() {
            let err = PdfSplitter.page_count(b"not a pdf").unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parts() {
        assert_eq!(plan_parts(250, 100), vec![0..100, 100..200, 200..250]);
        assert_eq!(plan_parts(100, 100), vec![0..100]);
        assert_eq!(plan_parts(0, 100), Vec::<Range<usize>>::new());
    }
}
