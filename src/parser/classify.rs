//! Canonical part classification, shared by the EML and MSG adapters.
//!
//! Both container formats reduce their parts to [`LeafPart`] values and run
//! them through one [`Classifier`], so the policy (and its edge cases) lives
//! in exactly one place.

use std::collections::HashSet;

use tracing::debug;

use crate::charset;
use crate::model::attachment::{Attachment, InlineImage};
use crate::model::message::Message;

/// Declared intent of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
    /// No Content-Disposition header at all.
    Unspecified,
    /// Some other disposition token (e.g. `form-data`).
    Other,
}

/// A leaf part as seen by the classifier, already decoded by its adapter.
#[derive(Debug)]
pub struct LeafPart {
    /// Full content type, lowercase (`"text/plain"`, `"image/png"`, …).
    pub content_type: String,

    /// Declared disposition.
    pub disposition: Disposition,

    /// Content-ID with angle brackets stripped, if present.
    pub content_id: Option<String>,

    /// Declared filename, if present.
    pub filename: Option<String>,

    /// Decoded payload bytes.
    pub data: Vec<u8>,

    /// Pre-decoded text for text parts; when `None`, body capture decodes
    /// `data` through the charset cascade using `charset_label`.
    pub text: Option<String>,

    /// Charset declared on the part's content type, if any.
    pub charset_label: Option<String>,

    /// Depth-first encounter ordinal (for diagnostics only).
    pub ordinal: usize,
}

/// Applies the classification policy to a stream of leaf parts, accumulating
/// results into a [`Message`].
#[derive(Default)]
pub struct Classifier {
    seen_content_ids: HashSet<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one leaf part, in priority order:
    ///
    /// 1. content-id present and `image/*` type → inline image (first
    ///    content-id occurrence wins, later duplicates are dropped);
    /// 2. filename present and disposition `attachment`/`inline`/absent →
    ///    attachment (permissive on purpose: a disclosed filename without an
    ///    explicit disposition still counts);
    /// 3. disposition `attachment` → skipped entirely;
    /// 4. `text/plain` and no plain body captured yet → plain body;
    /// 5. `text/html` and no html body captured yet → html body;
    /// 6. anything else is ignored.
    pub fn classify(&mut self, msg: &mut Message, part: LeafPart) {
        // Rule 1: inline image
        if let Some(cid) = part.content_id.as_deref() {
            if !cid.is_empty() && part.content_type.starts_with("image/") {
                if self.seen_content_ids.contains(cid) {
                    debug!(ordinal = part.ordinal, content_id = cid, "duplicate content-id, dropped");
                    return;
                }
                self.seen_content_ids.insert(cid.to_string());
                let filename = part.filename.clone().unwrap_or_else(|| {
                    format!(
                        "inline_{}{}",
                        msg.inline_images.len() + 1,
                        image_extension(&part.content_type)
                    )
                });
                msg.inline_images.push(InlineImage {
                    content_id: cid.to_string(),
                    filename,
                    content_type: part.content_type,
                    size: part.data.len() as u64,
                    data: part.data,
                    saved_path: None,
                });
                return;
            }
        }

        // Rule 2: attachment (permissive: filename alone is enough unless the
        // disposition is something exotic)
        if let Some(filename) = part.filename.clone() {
            if matches!(
                part.disposition,
                Disposition::Attachment | Disposition::Inline | Disposition::Unspecified
            ) {
                msg.attachments.push(Attachment {
                    filename,
                    content_type: part.content_type,
                    size: part.data.len() as u64,
                    data: part.data,
                    saved_path: None,
                });
            }
            return;
        }

        // Rule 3: explicit attachment disposition without filename is dropped
        if part.disposition == Disposition::Attachment {
            return;
        }

        // Rules 4/5: body capture, first part of each kind wins
        if part.content_type == "text/plain" && msg.body_plain.is_none() {
            msg.body_plain = Some(part_text(part));
        } else if part.content_type == "text/html" && msg.body_html.is_none() {
            msg.body_html = Some(part_text(part));
        }
        // Rule 6: ignored
    }
}

/// Decode a text part's content, preferring the adapter's pre-decoded string.
fn part_text(part: LeafPart) -> String {
    match part.text {
        Some(text) => text,
        None => charset::decode_text(&part.data, part.charset_label.as_deref()),
    }
}

/// Pick a file extension for a generated inline-image name.
fn image_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        _ => ".bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(ct: &str, disp: Disposition, cid: Option<&str>, name: Option<&str>) -> LeafPart {
        LeafPart {
            content_type: ct.to_string(),
            disposition: disp,
            content_id: cid.map(String::from),
            filename: name.map(String::from),
            data: vec![1, 2, 3],
            text: Some("hello".to_string()),
            charset_label: None,
            ordinal: 0,
        }
    }

    #[test]
    fn test_inline_image_takes_priority_over_filename() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(
            &mut msg,
            leaf(
                "image/png",
                Disposition::Inline,
                Some("img1"),
                Some("logo.png"),
            ),
        );
        assert_eq!(msg.inline_images.len(), 1);
        assert!(msg.attachments.is_empty());
        assert_eq!(msg.inline_images[0].filename, "logo.png");
    }

    #[test]
    fn test_duplicate_content_id_dropped() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(&mut msg, leaf("image/png", Disposition::Inline, Some("X"), None));
        c.classify(&mut msg, leaf("image/png", Disposition::Inline, Some("X"), None));
        assert_eq!(msg.inline_images.len(), 1);
    }

    #[test]
    fn test_filename_without_disposition_is_attachment() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(
            &mut msg,
            leaf(
                "application/pdf",
                Disposition::Unspecified,
                None,
                Some("doc.pdf"),
            ),
        );
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].filename, "doc.pdf");
    }

    #[test]
    fn test_attachment_disposition_without_filename_skipped() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(&mut msg, leaf("text/plain", Disposition::Attachment, None, None));
        assert!(msg.attachments.is_empty());
        assert!(msg.body_plain.is_none());
    }

    #[test]
    fn test_first_body_of_each_kind_wins() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        let mut first = leaf("text/plain", Disposition::Unspecified, None, None);
        first.text = Some("first".to_string());
        let mut second = leaf("text/plain", Disposition::Unspecified, None, None);
        second.text = Some("second".to_string());
        c.classify(&mut msg, first);
        c.classify(&mut msg, second);
        assert_eq!(msg.body_plain.as_deref(), Some("first"));
    }

    #[test]
    fn test_generated_inline_filename_uses_content_type() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(&mut msg, leaf("image/jpeg", Disposition::Inline, Some("a"), None));
        assert_eq!(msg.inline_images[0].filename, "inline_1.jpg");
    }

    #[test]
    fn test_non_image_with_content_id_not_inline() {
        let mut msg = Message::default();
        let mut c = Classifier::new();
        c.classify(
            &mut msg,
            leaf(
                "application/pdf",
                Disposition::Unspecified,
                Some("cid-doc"),
                Some("doc.pdf"),
            ),
        );
        assert!(msg.inline_images.is_empty());
        assert_eq!(msg.attachments.len(), 1);
    }
}
