use tracing::warn;

use crate::config::DOCX_CHARS_PER_PAGE;
use crate::ingestion::error::ExtractionError;

/// Raw text of a Word document plus a display-only page estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct DocxText {
    pub text: String,
    pub estimated_pages: usize,
}

/// Converts an OOXML document to plain text and rejects near-empty results.
pub fn extract_docx(bytes: &[u8], min_chars: usize) -> Result<DocxText, ExtractionError> {
    let raw = docx_lite::extract_text_from_bytes(bytes).map_err(|e| {
        warn!("DOCX conversion failed: {e}");
        ExtractionError::EmptyDocx
    })?;
    accept_docx_text(&raw, min_chars)
}

fn accept_docx_text(raw: &str, min_chars: usize) -> Result<DocxText, ExtractionError> {
    let text = raw.trim();
    let chars = text.chars().count();
    if chars < min_chars {
        return Err(ExtractionError::EmptyDocx);
    }
    Ok(DocxText {
        text: text.to_string(),
        estimated_pages: estimate_page_count(chars),
    })
}

/// Rough page count for progress display. Not a property of the document.
pub fn estimate_page_count(chars: usize) -> usize {
    chars.div_ceil(DOCX_CHARS_PER_PAGE).max(1)
}
