//! Attachment and inline-image payloads.
//!
//! Unlike header metadata, the binary payload is carried in memory for the
//! lifetime of one report build: every attachment is both materialized to
//! disk and fed through the content extractor.

use std::path::PathBuf;

/// A regular attachment part.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Attachment {
    /// Declared filename. Generated if the part disclosed none.
    pub filename: String,

    /// Declared MIME content type (e.g. `"application/pdf"`). Display-only:
    /// content extraction dispatches on the filename extension instead.
    pub content_type: String,

    /// Decoded payload size in bytes.
    pub size: u64,

    /// Decoded binary payload.
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Where the materializer wrote the payload. `None` until saved.
    pub saved_path: Option<PathBuf>,
}

/// An inline image part (referenced from an HTML body via its content-id).
#[derive(Debug, Clone, serde::Serialize)]
pub struct InlineImage {
    /// Content-ID with surrounding angle brackets stripped.
    pub content_id: String,

    /// Declared or generated filename (`inline_<n>.<ext>` when missing).
    pub filename: String,

    /// Declared MIME content type (always `image/*`).
    pub content_type: String,

    /// Decoded payload size in bytes.
    pub size: u64,

    /// Decoded binary payload.
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Where the materializer wrote the payload. `None` until saved.
    pub saved_path: Option<PathBuf>,
}
