//! Write attachment and inline-image payloads to the output directory.

use std::path::{Path, PathBuf};

use base64::Engine;
use regex::RegexBuilder;
use tracing::warn;

use crate::model::attachment::{Attachment, InlineImage};

/// Save every attachment payload, recording the resulting path on each item.
pub fn save_attachments(attachments: &mut [Attachment], output_dir: &Path) -> anyhow::Result<()> {
    for att in attachments.iter_mut() {
        let path = save_payload(&att.filename, &att.data, output_dir)?;
        att.saved_path = Some(path);
    }
    Ok(())
}

/// Save every inline-image payload, recording the resulting path on each item.
pub fn save_inline_images(images: &mut [InlineImage], output_dir: &Path) -> anyhow::Result<()> {
    for img in images.iter_mut() {
        let path = save_payload(&img.filename, &img.data, output_dir)?;
        img.saved_path = Some(path);
    }
    Ok(())
}

/// Write one payload under a sanitized, collision-safe name.
///
/// The output directory is created lazily, on the first actual write.
fn save_payload(filename: &str, data: &[u8], output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let sanitized = sanitize_filename_part(filename, 150);
    let path = unique_path(&output_dir.join(&sanitized));
    std::fs::write(&path, data)?;
    Ok(path)
}

/// Replace filesystem-hostile characters and cap the length.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

/// If `path` already exists, insert `_<n>` before the extension, starting at
/// 1 and incrementing until a free path is found.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    for i in 1..10000 {
        let candidate = if ext.is_empty() {
            parent.join(format!("{stem}_{i}"))
        } else {
            parent.join(format!("{stem}_{i}.{ext}"))
        };
        if !candidate.exists() {
            return candidate;
        }
    }

    // Fallback — very unlikely
    parent.join(format!("{stem}_dup.{ext}"))
}

/// Scan an HTML body for base64 `data:image/...` URIs in `img` tags and
/// materialize each one as `datauri_<n>.<ext>`.
///
/// A malformed match is skipped (with a warning) without aborting the scan;
/// its index is still consumed, so names stay aligned with match order.
pub fn extract_data_uri_images(
    html_body: &str,
    output_dir: &Path,
) -> anyhow::Result<Vec<Attachment>> {
    let re = RegexBuilder::new(r#"<img[^>]+src=["']data:image/([^;"']+);base64,([^"']+)["']"#)
        .case_insensitive(true)
        .build()
        .expect("static regex");

    let mut images = Vec::new();
    for (i, caps) in re.captures_iter(html_body).enumerate() {
        let image_type = &caps[1];
        let b64 = &caps[2];

        let data = match base64::engine::general_purpose::STANDARD.decode(b64.as_bytes()) {
            Ok(data) => data,
            Err(e) => {
                warn!(index = i + 1, error = %e, "skipping malformed data URI");
                continue;
            }
        };

        let ext = match image_type {
            "jpeg" => ".jpg".to_string(),
            "svg+xml" => ".svg".to_string(),
            other => format!(".{other}"),
        };
        let filename = format!("datauri_{}{ext}", i + 1);
        let path = save_payload(&filename, &data, output_dir)?;

        images.push(Attachment {
            filename,
            content_type: format!("image/{image_type}"),
            size: data.len() as u64,
            data,
            saved_path: Some(path),
        });
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename_part("hello world.pdf", 50), "hello_world.pdf");
        assert_eq!(sanitize_filename_part("", 50), "unnamed");
        assert_eq!(sanitize_filename_part("a/b\\c.txt", 50), "a_b_c.txt");
    }

    #[test]
    fn test_collision_suffix_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut atts = vec![
            Attachment {
                filename: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                size: 1,
                data: vec![1],
                saved_path: None,
            },
            Attachment {
                filename: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                size: 1,
                data: vec![2],
                saved_path: None,
            },
        ];
        save_attachments(&mut atts, dir.path()).unwrap();

        assert_eq!(
            atts[0].saved_path.as_ref().unwrap().file_name().and_then(|n| n.to_str()),
            Some("report.pdf")
        );
        assert_eq!(
            atts[1].saved_path.as_ref().unwrap().file_name().and_then(|n| n.to_str()),
            Some("report_1.pdf")
        );
        // The first file was not overwritten.
        assert_eq!(std::fs::read(atts[0].saved_path.as_ref().unwrap()).unwrap(), vec![1]);
    }

    #[test]
    fn test_data_uri_extraction() {
        let dir = tempfile::tempdir().unwrap();
        // "hi" → aGk=
        let html = r#"<p>x</p><img src="data:image/png;base64,aGk="><img src="data:image/jpeg;base64,aGk=">"#;
        let images = extract_data_uri_images(html, dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].filename, "datauri_1.png");
        assert_eq!(images[1].filename, "datauri_2.jpg");
        assert_eq!(
            std::fs::read(images[0].saved_path.as_ref().unwrap()).unwrap(),
            b"hi"
        );
    }

    #[test]
    fn test_malformed_data_uri_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<img src="data:image/png;base64,!!notbase64!!"><img src="data:image/gif;base64,aGk=">"#;
        let images = extract_data_uri_images(html, dir.path()).unwrap();
        assert_eq!(images.len(), 1);
        // Index 1 was consumed by the malformed match.
        assert_eq!(images[0].filename, "datauri_2.gif");
    }

    #[test]
    fn test_no_matches_creates_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let images = extract_data_uri_images("<p>no images</p>", &target).unwrap();
        assert!(images.is_empty());
        assert!(!target.exists());
    }
}
