//! Legacy charset normalization and best-effort text decoding.
//!
//! Real-world Korean mail traffic declares the same encoding under half a
//! dozen aliases (`ks_c_5601-1987`, `euc_kr`, `cp949`, …). All of them map to
//! the single `EUC-KR` codec that `encoding_rs` implements (its EUC-KR is the
//! windows-949 superset). Decoding never fails: the last cascade tier is a
//! lossy WINDOWS-1252 decode that accepts any byte sequence.

use encoding_rs::{Encoding, EUC_KR, UTF_8, WINDOWS_1252};

/// Legacy Korean labels that must resolve to EUC-KR even when the label is
/// not a WHATWG alias (`cp949` is not; the others are kept here so the
/// mapping is explicit and testable in one place).
const KOREAN_ALIASES: &[&str] = &[
    "ks_c_5601-1987",
    "ks_c_5601",
    "ksc5601",
    "euc_kr",
    "euc-kr",
    "cp949",
    "windows-949",
];

/// Resolve a declared charset label to a canonical codec.
///
/// Unrecognized or absent labels default to UTF-8.
pub fn canonical(label: Option<&str>) -> &'static Encoding {
    let Some(label) = label else {
        return UTF_8;
    };
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return UTF_8;
    }
    let lower = trimmed.to_lowercase();
    if KOREAN_ALIASES.contains(&lower.as_str()) {
        return EUC_KR;
    }
    Encoding::for_label(trimmed.as_bytes()).unwrap_or(UTF_8)
}

/// Decode bytes under a declared charset label, never failing.
///
/// Cascade: the canonicalized codec (strict), then UTF-8 (strict), then
/// EUC-KR (strict), then WINDOWS-1252 lossy as the byte-preserving last
/// resort. Replacement characters can only appear at the final tier.
pub fn decode_text(bytes: &[u8], label: Option<&str>) -> String {
    let declared = canonical(label);
    if let Some(s) = decode_strict(declared, bytes) {
        return s;
    }
    decode_fallback(bytes)
}

/// The label-free fallback cascade used for generic text attachments:
/// UTF-8, then EUC-KR, then lossy WINDOWS-1252.
pub fn decode_fallback(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if let Some(s) = decode_strict(EUC_KR, bytes) {
        return s;
    }
    let (decoded, _, _) = WINDOWS_1252.decode(bytes);
    decoded.into_owned()
}

/// Strict decode: `None` if any byte sequence is invalid for the codec.
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|s| s.into_owned())
}
