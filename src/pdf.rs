//! PDF text extraction.
//!
//! Only available when the `pdf` feature is enabled. Text comes from
//! `pdf-extract`; the page count comes from `lopdf`. Both run on the blocking
//! thread pool since PDF parsing is CPU-bound.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::extract::{DocumentExtractor, ExtractedDocument};

/// A [`DocumentExtractor`] for PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, filename: &str, bytes: &[u8]) -> Result<ExtractedDocument> {
        debug!(filename, size = bytes.len(), "extracting PDF");

        let owned = bytes.to_vec();
        let name = filename.to_string();
        let extracted = tokio::task::spawn_blocking(move || extract_pdf(&name, &owned))
            .await
            .map_err(|e| RagError::ExtractionError {
                filename: filename.to_string(),
                message: format!("extraction task failed: {e}"),
            })??;

        Ok(extracted)
    }
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<ExtractedDocument> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| RagError::ExtractionError {
        filename: filename.to_string(),
        message: format!("text extraction failed: {e}"),
    })?;

    // Page count is informational; a malformed page tree should not fail a
    // document whose text extracted fine.
    let page_count = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc.get_pages().len() as u32,
        Err(e) => {
            warn!(filename, error = %e, "could not read PDF page tree");
            0
        }
    };

    Ok(ExtractedDocument { text, page_count })
}
