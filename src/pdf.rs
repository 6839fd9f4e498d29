//! PDF text extraction.
//!
//! Speech PDFs are parsed in memory with `lopdf` and the text of every page
//! is concatenated in page order. Scanned documents without a text layer
//! produce an empty string; there is no OCR fallback.

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Extract the plain text of all pages of a PDF document.
///
/// Pages whose text cannot be decoded are skipped with a warning.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();

    let mut text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page = page_num, error = %e, "Skipping undecodable PDF page"),
        }
    }

    debug!(pages = pages.len(), chars = text.len(), "Extracted PDF text");
    Ok(text)
}
