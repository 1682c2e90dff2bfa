//! Document text extraction.
//!
//! The core treats extraction as an external collaborator behind the
//! [`DocumentExtractor`] trait. [`PlainTextExtractor`] is always available;
//! the `pdf` feature adds [`PdfExtractor`](crate::pdf::PdfExtractor).

use async_trait::async_trait;

use crate::error::Result;

/// Full text and page count extracted from a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// The document's full text.
    pub text: String,
    /// Number of pages in the source document.
    pub page_count: u32,
}

/// Extracts text from raw document bytes.
///
/// Extraction failure for one document is fatal to the whole project build;
/// callers that need partial-success semantics must split the build.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the full text and page count from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`](crate::RagError::ExtractionError) if the
    /// document is unreadable.
    async fn extract(&self, filename: &str, bytes: &[u8]) -> Result<ExtractedDocument>;
}

/// Treats the raw bytes as UTF-8 text, one page per document.
///
/// Used for plain-text uploads and in tests; invalid UTF-8 sequences are
/// replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, _filename: &str, bytes: &[u8]) -> Result<ExtractedDocument> {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let page_count = if text.trim().is_empty() { 0 } else { 1 };
        Ok(ExtractedDocument { text, page_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_extractor_passes_bytes_through() {
        let extracted =
            PlainTextExtractor.extract("notes.txt", b"hello world").await.unwrap();
        assert_eq!(extracted.text, "hello world");
        assert_eq!(extracted.page_count, 1);
    }

    #[tokio::test]
    async fn empty_document_has_zero_pages() {
        let extracted = PlainTextExtractor.extract("empty.txt", b"  \n ").await.unwrap();
        assert_eq!(extracted.page_count, 0);
    }
}
