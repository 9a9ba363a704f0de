//! Integration tests for the full pipeline: decode, materialize, extract, report.

use std::path::{Path, PathBuf};

use mailsift::config::Config;
use mailsift::model::content::ExtractedContent;
use mailsift::pipeline;
use mailsift::report;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─── Multipart message: counts, order, dedup, isolation ─────────────

#[test]
fn test_multipart_attachment_order_and_count() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("multipart.eml"), Some(out.path()), &Config::default())
            .unwrap();
    let msg = &outcome.message;

    assert_eq!(msg.subject, "Project update");
    assert_eq!(msg.from, "Alice <alice@example.com>");
    assert_eq!(msg.cc, "carol@example.com");

    // Four attachment parts in depth-first order.
    let names: Vec<&str> = msg.attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, ["notes.txt", "data.csv", "report.pdf", "report.pdf"]);
    assert_eq!(outcome.contents.len(), msg.attachments.len());

    // Duplicate content-id: only the first inline image is retained.
    assert_eq!(msg.inline_images.len(), 1);
    assert_eq!(msg.inline_images[0].content_id, "img1");
    assert_eq!(msg.inline_images[0].filename, "chart.png");

    // Plain body wins over the HTML alternative.
    assert_eq!(
        msg.body_plain.as_deref().map(str::trim),
        Some("Please find the files attached.")
    );
    assert!(msg.body_html.is_some());
}

#[test]
fn test_filename_collision_materialization() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("multipart.eml"), Some(out.path()), &Config::default())
            .unwrap();

    let saved: Vec<String> = outcome
        .message
        .attachments
        .iter()
        .map(|a| {
            a.saved_path
                .as_ref()
                .unwrap()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(saved, ["notes.txt", "data.csv", "report.pdf", "report_1.pdf"]);

    // The first copy is intact, not overwritten.
    let first = outcome.message.attachments[2].saved_path.as_ref().unwrap();
    assert_eq!(std::fs::read(first).unwrap(), b"not a pdf");
}

#[test]
fn test_corrupt_pdf_is_isolated_in_report() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("multipart.eml"), Some(out.path()), &Config::default())
            .unwrap();

    // The corrupt PDFs decode to error placeholders...
    assert!(matches!(&outcome.contents[2], ExtractedContent::Error(_)));
    // ...while the text attachments around them decode fine.
    match &outcome.contents[0] {
        ExtractedContent::Text(t) => assert!(t.contains("hello world")),
        other => panic!("expected text content, got {other:?}"),
    }

    let markdown = report::build_report(
        &outcome.message,
        "multipart.eml",
        &outcome.datauri_images,
        &outcome.contents,
    );
    assert!(markdown.contains("### Attachment 1: notes.txt"));
    assert!(markdown.contains("### Attachment 3: report.pdf"));
    assert!(markdown.contains("_(failed to decode .pdf:"));
    // The summary table row count matches the attachment count.
    assert!(markdown.contains("| **Attachments** | 4 |"));
}

// ─── HTML-only message: stripping and data URIs ─────────────────────

#[test]
fn test_html_only_body_stripped() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("htmlonly.eml"), Some(out.path()), &Config::default())
            .unwrap();

    assert!(outcome.message.body_plain.is_none());

    let markdown = report::build_report(
        &outcome.message,
        "htmlonly.eml",
        &outcome.datauri_images,
        &outcome.contents,
    );
    assert!(markdown.contains("Hello & welcome"));
    assert!(markdown.contains("line one\nline two"));
    // Style block content must not leak into the body.
    assert!(!markdown.contains("margin"));
}

#[test]
fn test_data_uri_image_materialized() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("htmlonly.eml"), Some(out.path()), &Config::default())
            .unwrap();

    assert_eq!(outcome.datauri_images.len(), 1);
    assert_eq!(outcome.datauri_images[0].filename, "datauri_1.png");
    let path = outcome.datauri_images[0].saved_path.as_ref().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"hi");

    let markdown = report::build_report(
        &outcome.message,
        "htmlonly.eml",
        &outcome.datauri_images,
        &outcome.contents,
    );
    assert!(markdown.contains("## Inline Images"));
    assert!(markdown.contains("datauri_1.png"));
    assert!(markdown.contains("| **Inline images** | 1 |"));
}

// ─── JSON summary ───────────────────────────────────────────────────

#[test]
fn test_json_summary_normalized_date() {
    let out = tempfile::tempdir().unwrap();
    let outcome =
        pipeline::process_file(&fixture("multipart.eml"), Some(out.path()), &Config::default())
            .unwrap();

    let summary = report::build_summary(&outcome.message, "multipart.eml", &outcome.datauri_images);
    assert_eq!(summary.body, "plain");
    assert_eq!(summary.attachments.len(), 4);
    assert_eq!(summary.inline_images.len(), 1);
    assert!(summary
        .date_rfc3339
        .as_deref()
        .unwrap()
        .starts_with("2024-01-04T10:00:00"));

    let json = serde_json::to_string_pretty(&summary).unwrap();
    assert!(json.contains("\"subject\": \"Project update\""));
}

// ─── Fatal-path errors ──────────────────────────────────────────────

#[test]
fn test_unsupported_extension_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mail.mbox");
    std::fs::write(&path, b"From nobody\n\nhello\n").unwrap();
    let err = pipeline::process_file(&path, None, &Config::default()).unwrap_err();
    assert!(matches!(err, mailsift::error::SiftError::UnsupportedContainer(_)));
}

#[test]
fn test_garbage_msg_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mail.msg");
    std::fs::write(&path, b"this is not a compound file").unwrap();
    let err = pipeline::process_file(&path, None, &Config::default()).unwrap_err();
    assert!(matches!(err, mailsift::error::SiftError::Parse(_)));
}
