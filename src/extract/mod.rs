//! Attachment content extraction: per-format decoders behind one dispatch
//! point with per-attachment failure isolation.

pub mod pdf;
pub mod sheet;
pub mod slides;
pub mod text;

use tracing::warn;

use crate::model::content::ExtractedContent;
use crate::report::format_size;

/// Extensions decoded through the charset cascade and wrapped verbatim.
const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "log", "json", "xml", "html", "htm", "md"];

/// Extensions reported size-only, never parsed.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// Decode one attachment's content.
///
/// Dispatch is by filename extension only; the declared content type is
/// sender-controlled metadata and is not trusted. Any decoder failure is
/// converted to [`ExtractedContent::Error`] here; nothing propagates past
/// this boundary.
pub fn extract(filename: &str, data: &[u8]) -> ExtractedContent {
    let ext = extension_of(filename);

    let result = match ext.as_str() {
        "pdf" => pdf::extract_pdf(data),
        "xlsx" | "xls" | "ods" => sheet::extract_workbook(data, &ext),
        "pptx" => slides::extract_pptx(data),
        "ppt" => {
            return ExtractedContent::Error(
                "legacy .ppt format not supported, only .pptx".to_string(),
            )
        }
        _ if TEXT_EXTENSIONS.contains(&ext.as_str()) => Ok(text::extract_text(data)),
        _ if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(ExtractedContent::Text(format!(
            "(image file - {})",
            format_size(data.len() as u64)
        ))),
        _ => {
            return ExtractedContent::Error(format!(
                "unsupported format: .{ext}, {}",
                format_size(data.len() as u64)
            ))
        }
    };

    result.unwrap_or_else(|e| {
        warn!(filename, error = %e, "attachment extraction failed");
        ExtractedContent::Error(format!("failed to decode .{ext}: {e}"))
    })
}

/// Lowercase extension without the dot; empty when the filename has none.
fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
