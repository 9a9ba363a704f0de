//! Outlook `.msg` container adapter, built on the `cfb` compound-file crate.
//!
//! MAPI property streams are read directly: `__substg1.0_XXXXTTTT` where
//! `XXXX` is the property id and `TTTT` the type (`001F` UTF-16LE string,
//! `001E` ANSI string, `0102` binary). Attachments live in
//! `__attach_version1.0_#NNNNNNNN` storages. Bodies come from dedicated
//! properties; every attachment storage is reduced to a [`LeafPart`] and run
//! through the same canonical classifier as MIME parts.

use std::io::{Cursor, Read};

use cfb::CompoundFile;
use tracing::debug;

use crate::charset;
use crate::error::{Result, SiftError};
use crate::model::message::Message;
use crate::parser::classify::{Classifier, Disposition, LeafPart};
use crate::parser::header;

type Comp<'a> = CompoundFile<Cursor<&'a [u8]>>;

// MAPI property ids used here.
const PR_SUBJECT: &str = "0037";
const PR_TRANSPORT_HEADERS: &str = "007D";
const PR_SENDER_NAME: &str = "0C1A";
const PR_SENDER_EMAIL: &str = "0C1F";
const PR_SENDER_SMTP: &str = "5D01";
const PR_DISPLAY_CC: &str = "0E03";
const PR_DISPLAY_TO: &str = "0E04";
const PR_BODY: &str = "1000";
const PR_BODY_HTML: &str = "1013";
const PR_ATTACH_DATA: &str = "3701";
const PR_ATTACH_SHORT_NAME: &str = "3704";
const PR_ATTACH_LONG_NAME: &str = "3707";
const PR_ATTACH_MIME: &str = "370E";
const PR_ATTACH_CONTENT_ID: &str = "3712";

/// Decode a raw `.msg` message.
pub fn parse_msg(raw: &[u8]) -> Result<Message> {
    let mut comp = CompoundFile::open(Cursor::new(raw))
        .map_err(|e| SiftError::Parse(format!("not a valid compound file: {e}")))?;

    let mut msg = Message::default();

    msg.subject = prop_string(&mut comp, "/", PR_SUBJECT).unwrap_or_default();
    msg.body_plain = prop_string(&mut comp, "/", PR_BODY);

    // PR_HTML is binary; some producers store it as a string property instead.
    msg.body_html = read_stream(&mut comp, &substg_path("/", PR_BODY_HTML, "0102"))
        .map(|bytes| charset::decode_fallback(&bytes))
        .or_else(|| prop_string(&mut comp, "/", PR_BODY_HTML));

    read_msg_headers(&mut comp, &mut msg);
    read_attachments(&mut comp, &mut msg);

    Ok(msg)
}

/// From/To/Cc/Date prefer the RFC 5322 transport headers when the message
/// carries them; the MAPI display properties are the fallback.
fn read_msg_headers(comp: &mut Comp<'_>, msg: &mut Message) {
    let transport = prop_string(comp, "/", PR_TRANSPORT_HEADERS);
    let headers = transport
        .as_deref()
        .map(header::unfold_headers)
        .unwrap_or_default();

    msg.from = header::get_header(&headers, "from")
        .map(|v| header::decode_encoded_words(&v))
        .unwrap_or_else(|| sender_fallback(comp));
    msg.to = header::get_header(&headers, "to")
        .map(|v| header::decode_encoded_words(&v))
        .or_else(|| prop_string(comp, "/", PR_DISPLAY_TO))
        .unwrap_or_default();
    msg.cc = header::get_header(&headers, "cc")
        .map(|v| header::decode_encoded_words(&v))
        .or_else(|| prop_string(comp, "/", PR_DISPLAY_CC))
        .unwrap_or_default();
    msg.date = header::get_header(&headers, "date").unwrap_or_default();

    if msg.subject.is_empty() {
        msg.subject = header::get_header(&headers, "subject")
            .map(|v| header::decode_encoded_words(&v))
            .unwrap_or_default();
    }
}

/// Compose `Name <email>` from the MAPI sender properties.
fn sender_fallback(comp: &mut Comp<'_>) -> String {
    let name = prop_string(comp, "/", PR_SENDER_NAME).unwrap_or_default();
    let email = prop_string(comp, "/", PR_SENDER_SMTP)
        .or_else(|| prop_string(comp, "/", PR_SENDER_EMAIL))
        .unwrap_or_default();
    match (name.is_empty(), email.is_empty()) {
        (false, false) => format!("{name} <{email}>"),
        (false, true) => name,
        (true, false) => email,
        (true, true) => String::new(),
    }
}

/// Walk the `__attach_version1.0_#NNNNNNNN` storages in ordinal order and
/// classify each one exactly like a MIME leaf part.
fn read_attachments(comp: &mut Comp<'_>, msg: &mut Message) {
    let mut storages: Vec<String> = match comp.read_storage("/") {
        Ok(entries) => entries
            .filter(|e| e.is_storage() && e.name().starts_with("__attach_version1.0_#"))
            .map(|e| e.name().to_string())
            .collect(),
        Err(_) => Vec::new(),
    };
    // The 8-hex-digit ordinal makes lexicographic order the declared order.
    storages.sort();

    let mut classifier = Classifier::new();
    for (ordinal, name) in storages.iter().enumerate() {
        let prefix = format!("/{name}/");

        let filename = prop_string(comp, &prefix, PR_ATTACH_LONG_NAME)
            .or_else(|| prop_string(comp, &prefix, PR_ATTACH_SHORT_NAME));
        let content_type = prop_string(comp, &prefix, PR_ATTACH_MIME)
            .map(|ct| ct.to_lowercase())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content_id = prop_string(comp, &prefix, PR_ATTACH_CONTENT_ID)
            .map(|cid| cid.trim_matches(['<', '>', ' ']).to_string())
            .filter(|cid| !cid.is_empty());

        let (filename, content_type, data) =
            match read_stream(comp, &substg_path(&prefix, PR_ATTACH_DATA, "0102")) {
                Some(data) => (
                    filename.unwrap_or_else(|| "unnamed".to_string()),
                    content_type,
                    data,
                ),
                None => {
                    // No binary stream: an embedded message storage. Surfaced
                    // as an opaque attachment, never recursed into.
                    debug!(storage = name.as_str(), "attachment without data stream");
                    (
                        filename.unwrap_or_else(|| "attached_message.msg".to_string()),
                        "message/rfc822".to_string(),
                        Vec::new(),
                    )
                }
            };

        classifier.classify(
            msg,
            LeafPart {
                content_type,
                disposition: Disposition::Unspecified,
                content_id,
                filename: Some(filename),
                data,
                text: None,
                charset_label: None,
                ordinal,
            },
        );
    }
}

/// Build a `__substg1.0_XXXXTTTT` stream path.
fn substg_path(prefix: &str, prop: &str, type_suffix: &str) -> String {
    format!("{prefix}__substg1.0_{prop}{type_suffix}")
}

/// Read a whole stream if it exists.
fn read_stream(comp: &mut Comp<'_>, path: &str) -> Option<Vec<u8>> {
    if !comp.exists(path) {
        return None;
    }
    let mut stream = comp.open_stream(path).ok()?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).ok()?;
    Some(buf)
}

/// Read a string property: UTF-16LE (`001F`) preferred, ANSI (`001E`)
/// decoded through the charset cascade.
fn prop_string(comp: &mut Comp<'_>, prefix: &str, prop: &str) -> Option<String> {
    if let Some(bytes) = read_stream(comp, &substg_path(prefix, prop, "001F")) {
        return Some(utf16le_string(&bytes));
    }
    read_stream(comp, &substg_path(prefix, prop, "001E"))
        .map(|bytes| charset::decode_fallback(&bytes))
}

/// Decode UTF-16LE bytes, dropping any trailing NUL.
fn utf16le_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}
