//! Plain-text-like attachment decoding (txt, csv, log, json, xml, html, md).

use crate::charset;
use crate::model::content::ExtractedContent;

/// Decode a text-like attachment through the charset cascade and wrap it
/// verbatim in a fenced code block.
pub fn extract_text(data: &[u8]) -> ExtractedContent {
    let decoded = charset::decode_fallback(data);
    ExtractedContent::Text(format!("```\n{}\n```", decoded.trim_end()))
}
