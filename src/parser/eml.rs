//! RFC 5322 / MIME container adapter, built on `mail-parser`.
//!
//! The part graph is walked iteratively (explicit stack + visited set) in
//! depth-first order; every leaf is reduced to a [`LeafPart`] and handed to
//! the canonical [`Classifier`].

use std::collections::HashSet;

use mail_parser::{MessageParser, MimeHeaders, PartType};
use tracing::debug;

use crate::error::{Result, SiftError};
use crate::model::message::Message;
use crate::parser::classify::{Classifier, Disposition, LeafPart};
use crate::parser::header;

/// Decode a raw `.eml` message.
pub fn parse_eml(raw: &[u8]) -> Result<Message> {
    let parser = MessageParser::default();
    let parsed = parser
        .parse(raw)
        .ok_or_else(|| SiftError::Parse("not a valid MIME message".to_string()))?;

    let mut msg = Message::default();
    read_headers(raw, &mut msg);

    let mut classifier = Classifier::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut stack: Vec<usize> = vec![0];
    let mut ordinal = 0usize;

    while let Some(part_id) = stack.pop() {
        if !visited.insert(part_id) {
            debug!(part_id, "part visited twice, skipping");
            continue;
        }
        let Some(part) = parsed.parts.get(part_id) else {
            continue;
        };

        if let PartType::Multipart(children) = &part.body {
            // Push in reverse so children pop in declared order.
            for child in children.iter().rev() {
                stack.push(*child);
            }
            continue;
        }

        let content_type = part
            .content_type()
            .map(|ct| match ct.subtype() {
                Some(sub) => format!("{}/{}", ct.ctype(), sub).to_lowercase(),
                None => ct.ctype().to_lowercase(),
            })
            .unwrap_or_else(|| "text/plain".to_string());

        let disposition = match part.content_disposition() {
            None => Disposition::Unspecified,
            Some(cd) => match cd.ctype().to_lowercase().as_str() {
                "attachment" => Disposition::Attachment,
                "inline" => Disposition::Inline,
                _ => Disposition::Other,
            },
        };

        let content_id = part
            .content_id()
            .map(|cid| cid.trim_matches(['<', '>', ' ']).to_string())
            .filter(|cid| !cid.is_empty());

        let mut filename = part.attachment_name().map(String::from);

        let (content_type, text) = match &part.body {
            PartType::Text(t) => (content_type, Some(t.to_string())),
            PartType::Html(t) => (content_type, Some(t.to_string())),
            PartType::Message(_) => {
                // Nested message: surfaced as an opaque attachment, never
                // recursed into.
                if filename.is_none() {
                    filename = Some("attached_message.eml".to_string());
                }
                ("message/rfc822".to_string(), None)
            }
            _ => (content_type, None),
        };

        let charset_label = part
            .content_type()
            .and_then(|ct| ct.attribute("charset"))
            .map(String::from);

        classifier.classify(
            &mut msg,
            LeafPart {
                content_type,
                disposition,
                content_id,
                filename,
                data: part.contents().to_vec(),
                text,
                charset_label,
                ordinal,
            },
        );
        ordinal += 1;
    }

    Ok(msg)
}

/// Decode the five report headers from the raw header block.
///
/// `mail-parser` decodes headers too, but routing them through our own
/// encoded-word decoder keeps the legacy-Korean alias handling in one place.
fn read_headers(raw: &[u8], msg: &mut Message) {
    let block = header::raw_header_block(raw);
    let text = header::decode_header_bytes(block);
    let headers = header::unfold_headers(&text);

    msg.subject = header::get_header(&headers, "subject")
        .map(|v| header::decode_encoded_words(&v))
        .unwrap_or_default();
    msg.from = header::get_header(&headers, "from")
        .map(|v| header::decode_encoded_words(&v))
        .unwrap_or_default();
    msg.to = header::get_header(&headers, "to")
        .map(|v| header::decode_encoded_words(&v))
        .unwrap_or_default();
    msg.cc = header::get_header(&headers, "cc")
        .map(|v| header::decode_encoded_words(&v))
        .unwrap_or_default();
    msg.date = header::get_header(&headers, "date").unwrap_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &[u8] = b"From: Alice <alice@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Quarterly numbers\r\n\
Date: Thu, 04 Jan 2024 10:00:00 +0000\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
See attached.\r\n";

    #[test]
    fn test_single_part_plain_body() {
        let msg = parse_eml(SIMPLE).unwrap();
        assert_eq!(msg.subject, "Quarterly numbers");
        assert_eq!(msg.from, "Alice <alice@example.com>");
        assert_eq!(msg.body_plain.as_deref().map(str::trim), Some("See attached."));
        assert!(msg.body_html.is_none());
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn test_multipart_with_attachment() {
        let raw = b"From: a@b.c\r\n\
Subject: hi\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
body text\r\n\
--XYZ\r\n\
Content-Type: text/plain; name=\"notes.txt\"\r\n\
Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
aGVsbG8gd29ybGQ=\r\n\
--XYZ--\r\n";
        let msg = parse_eml(raw).unwrap();
        assert_eq!(msg.body_plain.as_deref().map(str::trim), Some("body text"));
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].filename, "notes.txt");
        assert_eq!(msg.attachments[0].data, b"hello world");
    }

    #[test]
    fn test_korean_alias_subject() {
        let raw = b"From: a@b.c\r\n\
Subject: =?ks_c_5601-1987?B?vsiz58fPvLy/5A==?=\r\n\
\r\n\
hi\r\n";
        let msg = parse_eml(raw).unwrap();
        assert_eq!(msg.subject, "\u{c548}\u{b155}\u{d558}\u{c138}\u{c694}");
    }
}
