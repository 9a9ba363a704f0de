//! PDF text extraction.
//!
//! `pdf-extract` wants a filesystem path, so the payload goes through a
//! scoped temporary file that is removed on every exit path by its drop
//! handler.

use std::io::Write;

use crate::model::content::ExtractedContent;

/// Extract the text of a PDF payload.
///
/// A PDF that parses but yields no text (scanned/image-only) produces an
/// explicit placeholder instead of an empty string, so "parsed but empty"
/// stays distinguishable from "failed to parse".
pub fn extract_pdf(data: &[u8]) -> anyhow::Result<ExtractedContent> {
    let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    tmp.write_all(data)?;
    tmp.flush()?;

    let text = pdf_extract::extract_text(tmp.path())?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(ExtractedContent::Text("(no text extracted)".to_string()))
    } else {
        Ok(ExtractedContent::Text(trimmed.to_string()))
    }
}
