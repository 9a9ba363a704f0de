//! Decoded message: headers, bodies, and classified children.

use super::attachment::{Attachment, InlineImage};

/// Which container format the raw input claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// RFC 5322 / MIME text message (`.eml`).
    Eml,
    /// Outlook compound-file message (`.msg`).
    Msg,
}

impl ContainerKind {
    /// Map a lowercase file extension to a container kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "eml" => Some(Self::Eml),
            "msg" => Some(Self::Msg),
            _ => None,
        }
    }
}

/// A fully decoded message, produced by one of the container adapters.
///
/// Attachments and inline images keep their first-encounter order from the
/// depth-first part walk; bodies are first-encountered-wins per kind and are
/// never reassigned once set.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Message {
    /// Decoded `Subject` header (RFC 2047 words resolved). Empty if absent.
    pub subject: String,

    /// Decoded `From` header. Empty if absent.
    pub from: String,

    /// Decoded `To` header. Empty if absent.
    pub to: String,

    /// Decoded `Cc` header. Empty if absent.
    pub cc: String,

    /// Raw `Date` header string. Empty if absent.
    pub date: String,

    /// First `text/plain` body part, decoded. `None` if no part matched.
    pub body_plain: Option<String>,

    /// First `text/html` body part, decoded. `None` if no part matched.
    pub body_html: Option<String>,

    /// Regular attachments, in depth-first encounter order.
    pub attachments: Vec<Attachment>,

    /// Inline images, deduplicated by content-id (first occurrence wins).
    pub inline_images: Vec<InlineImage>,
}
