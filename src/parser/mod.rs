//! Message decoding: container adapters, header decoding, and part classification.

pub mod classify;
pub mod eml;
pub mod header;
pub mod html;
pub mod msg;

use crate::error::Result;
use crate::model::message::{ContainerKind, Message};

/// Decode a raw message into a [`Message`].
///
/// Fails with [`crate::error::SiftError::Parse`] only when the container's
/// root structure cannot be decoded at all; everything below the root is
/// handled with per-item fallbacks.
pub fn decode(raw: &[u8], kind: ContainerKind) -> Result<Message> {
    match kind {
        ContainerKind::Eml => eml::parse_eml(raw),
        ContainerKind::Msg => msg::parse_msg(raw),
    }
}
