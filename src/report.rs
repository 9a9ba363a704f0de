//! Deterministic markdown report assembly (plus the JSON summary mode).

use serde::Serialize;

use crate::model::attachment::Attachment;
use crate::model::content::{ExtractedContent, OutlineBlock, OutlineSection};
use crate::model::message::Message;
use crate::parser::header::parse_date;
use crate::parser::html::strip_html;

/// Human-readable size: bytes below 1024 as `B`, below 1 MiB as `KB` with
/// one decimal, else `MB` with one decimal.
pub fn format_size(n: u64) -> String {
    if n < 1024 {
        format!("{n} B")
    } else if n < 1024 * 1024 {
        format!("{:.1} KB", n as f64 / 1024.0)
    } else {
        format!("{:.1} MB", n as f64 / (1024.0 * 1024.0))
    }
}

/// Assemble the full markdown report.
///
/// `contents` is parallel to `message.attachments`; `datauri_images` are the
/// images recovered from base64 data URIs in the HTML body. Attachment and
/// inline-image order is never changed here.
pub fn build_report(
    message: &Message,
    source_name: &str,
    datauri_images: &[Attachment],
    contents: &[ExtractedContent],
) -> String {
    debug_assert_eq!(message.attachments.len(), contents.len());

    let mut out: Vec<String> = Vec::new();
    out.push("# Email Analysis Report\n".to_string());
    out.push(format!("**Source file**: `{source_name}`\n"));

    // ── Message info ────────────────────────────────────────────────
    out.push("## Message Info\n".to_string());
    out.push("| Field | Value |".to_string());
    out.push("|-------|-------|".to_string());
    out.push(format!("| **Subject** | {} |", cell(&message.subject)));
    out.push(format!("| **From** | {} |", cell(&message.from)));
    out.push(format!("| **To** | {} |", cell(&message.to)));
    if !message.cc.is_empty() {
        out.push(format!("| **Cc** | {} |", cell(&message.cc)));
    }
    out.push(format!("| **Date** | {} |", cell(&message.date)));
    out.push(format!("| **Attachments** | {} |", message.attachments.len()));
    let inline_total = message.inline_images.len() + datauri_images.len();
    if inline_total > 0 {
        out.push(format!("| **Inline images** | {inline_total} |"));
    }
    out.push(String::new());

    // ── Body ────────────────────────────────────────────────────────
    out.push("## Body\n".to_string());
    out.push(body_text(message).unwrap_or_else(|| "_(no body)_".to_string()));
    out.push(String::new());

    // ── Inline images ───────────────────────────────────────────────
    if inline_total > 0 {
        out.push("## Inline Images\n".to_string());
        out.push("| # | Filename | Size | Saved Path |".to_string());
        out.push("|---|----------|------|------------|".to_string());
        let mut index = 0usize;
        for img in &message.inline_images {
            index += 1;
            out.push(format!(
                "| {index} | {} | {} | `{}` |",
                cell(&img.filename),
                format_size(img.size),
                img.saved_path.as_deref().map(path_str).unwrap_or_default(),
            ));
        }
        for img in datauri_images {
            index += 1;
            out.push(format!(
                "| {index} | {} | {} | `{}` |",
                cell(&img.filename),
                format_size(img.size),
                img.saved_path.as_deref().map(path_str).unwrap_or_default(),
            ));
        }
        out.push(String::new());
    }

    // ── Attachments ─────────────────────────────────────────────────
    if !message.attachments.is_empty() {
        out.push("## Attachments\n".to_string());
        out.push("| # | Filename | Type | Size |".to_string());
        out.push("|---|----------|------|------|".to_string());
        for (i, att) in message.attachments.iter().enumerate() {
            out.push(format!(
                "| {} | {} | {} | {} |",
                i + 1,
                cell(&att.filename),
                cell(&att.content_type),
                format_size(att.size),
            ));
        }
        out.push(String::new());

        for (i, (att, content)) in message.attachments.iter().zip(contents).enumerate() {
            out.push(format!("### Attachment {}: {}\n", i + 1, att.filename));
            if let Some(path) = att.saved_path.as_deref() {
                out.push(format!("**Saved to**: `{}`\n", path_str(path)));
            }
            out.push(render_content(content));
            out.push(String::new());
        }
    }

    out.join("\n")
}

/// Resolve the body section: plain body preferred, then the stripped HTML
/// body, then nothing.
fn body_text(message: &Message) -> Option<String> {
    if let Some(plain) = &message.body_plain {
        let trimmed = plain.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(html) = &message.body_html {
        let stripped = strip_html(html);
        if !stripped.is_empty() {
            return Some(stripped);
        }
    }
    None
}

/// Render one extraction result into markdown.
fn render_content(content: &ExtractedContent) -> String {
    match content {
        ExtractedContent::Text(text) => text.clone(),
        ExtractedContent::Table(rows) => render_table(rows),
        ExtractedContent::MixedOutline(sections) => sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join("\n\n"),
        ExtractedContent::Error(msg) => format!("_({msg})_"),
    }
}

fn render_section(section: &OutlineSection) -> String {
    let mut parts = vec![format!("#### {}", section.title)];
    for block in &section.blocks {
        match block {
            OutlineBlock::Paragraph(text) => parts.push(text.clone()),
            OutlineBlock::Table(rows) => parts.push(render_table(rows)),
            OutlineBlock::Note(note) => {
                parts.push(format!("> Note: {}", note.replace('\n', "\n> ")));
            }
        }
    }
    parts.join("\n\n")
}

/// Render rows as a markdown table, first row as header. Rows are padded to
/// the widest row; pipes inside cells are escaped.
pub fn render_table(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let max_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if max_cols == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for c in 0..max_cols {
            let value = row.get(c).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(&cell(value));
            out.push_str(" |");
        }
        out.push('\n');
        if i == 0 {
            out.push('|');
            for _ in 0..max_cols {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

/// Escape a value for use inside a markdown table cell.
fn cell(value: &str) -> String {
    value.trim().replace('|', "\\|").replace('\n', " ")
}

fn path_str(path: &std::path::Path) -> String {
    path.display().to_string()
}

// ── JSON summary ────────────────────────────────────────────────────

/// One attachment or inline image in the JSON summary.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub saved_path: Option<String>,
}

/// Machine-readable report summary (`--json`).
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub source: String,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub date: String,
    /// Normalized date when the raw header parses; `None` otherwise.
    pub date_rfc3339: Option<String>,
    /// `"plain"`, `"html"`, or `"none"`.
    pub body: &'static str,
    pub attachments: Vec<FileSummary>,
    pub inline_images: Vec<FileSummary>,
}

/// Build the JSON summary for a decoded, materialized message.
pub fn build_summary(
    message: &Message,
    source_name: &str,
    datauri_images: &[Attachment],
) -> ReportSummary {
    let body = if message.body_plain.as_deref().is_some_and(|b| !b.trim().is_empty()) {
        "plain"
    } else if message.body_html.as_deref().is_some_and(|b| !b.trim().is_empty()) {
        "html"
    } else {
        "none"
    };

    let mut inline_images: Vec<FileSummary> = message
        .inline_images
        .iter()
        .map(|img| FileSummary {
            filename: img.filename.clone(),
            content_type: img.content_type.clone(),
            size: img.size,
            saved_path: img.saved_path.as_deref().map(path_str),
        })
        .collect();
    inline_images.extend(datauri_images.iter().map(|img| FileSummary {
        filename: img.filename.clone(),
        content_type: img.content_type.clone(),
        size: img.size,
        saved_path: img.saved_path.as_deref().map(path_str),
    }));

    ReportSummary {
        source: source_name.to_string(),
        subject: message.subject.clone(),
        from: message.from.clone(),
        to: message.to.clone(),
        cc: message.cc.clone(),
        date: message.date.clone(),
        date_rfc3339: parse_date(&message.date).map(|dt| dt.to_rfc3339()),
        body,
        attachments: message
            .attachments
            .iter()
            .map(|att| FileSummary {
                filename: att.filename.clone(),
                content_type: att.content_type.clone(),
                size: att.size,
                saved_path: att.saved_path.as_deref().map(path_str),
            })
            .collect(),
        inline_images,
    }
}
