//! End-to-end pipeline for one message: decode, materialize, extract.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::extract;
use crate::materialize;
use crate::model::attachment::Attachment;
use crate::model::content::ExtractedContent;
use crate::model::message::{ContainerKind, Message};
use crate::parser;

/// Everything produced for one input message.
#[derive(Debug)]
pub struct SiftOutcome {
    /// The decoded message with materialized paths recorded on its children.
    pub message: Message,
    /// Images recovered from base64 data URIs in the HTML body.
    pub datauri_images: Vec<Attachment>,
    /// Extraction results, parallel to `message.attachments`.
    pub contents: Vec<ExtractedContent>,
    /// The output directory used (it exists only if something was written).
    pub output_dir: PathBuf,
}

/// Determine the container kind from the input path's extension.
pub fn container_kind(input: &Path) -> Result<ContainerKind> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    ContainerKind::from_extension(&ext).ok_or_else(|| SiftError::UnsupportedContainer(ext))
}

/// Resolve the output directory: explicit override, else the configured
/// output root, else adjacent to the input file. The directory name is
/// always `<stem>_files` unless overridden outright.
pub fn output_dir_for(input: &Path, override_dir: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("message");
    let dir_name = format!("{stem}_files");
    match &config.output.output_root {
        Some(root) => root.join(dir_name),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(dir_name),
    }
}

/// Run the whole pipeline for one input file.
///
/// Fatal errors (missing file, unsupported extension, unparseable root) come
/// back as `Err`; everything below the root is isolated per item and lands in
/// the outcome as placeholder content instead.
pub fn process_file(
    input: &Path,
    override_dir: Option<&Path>,
    config: &Config,
) -> Result<SiftOutcome> {
    if !input.is_file() {
        return Err(SiftError::FileNotFound(input.to_path_buf()));
    }
    let kind = container_kind(input)?;
    let raw = std::fs::read(input).map_err(|e| SiftError::io(input, e))?;

    let mut message = parser::decode(&raw, kind)?;
    drop(raw);

    let output_dir = output_dir_for(input, override_dir, config);
    info!(
        attachments = message.attachments.len(),
        inline_images = message.inline_images.len(),
        output_dir = %output_dir.display(),
        "decoded message"
    );

    materialize::save_inline_images(&mut message.inline_images, &output_dir)
        .map_err(|e| SiftError::io(&output_dir, std::io::Error::other(e)))?;

    let datauri_images = match &message.body_html {
        Some(html) => materialize::extract_data_uri_images(html, &output_dir)
            .map_err(|e| SiftError::io(&output_dir, std::io::Error::other(e)))?,
        None => Vec::new(),
    };

    materialize::save_attachments(&mut message.attachments, &output_dir)
        .map_err(|e| SiftError::io(&output_dir, std::io::Error::other(e)))?;

    let contents: Vec<ExtractedContent> = message
        .attachments
        .iter()
        .map(|att| extract::extract(&att.filename, &att.data))
        .collect();

    Ok(SiftOutcome {
        message,
        datauri_images,
        contents,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_kind_by_extension() {
        assert!(matches!(
            container_kind(Path::new("a.eml")),
            Ok(ContainerKind::Eml)
        ));
        assert!(matches!(
            container_kind(Path::new("a.MSG")),
            Ok(ContainerKind::Msg)
        ));
        assert!(matches!(
            container_kind(Path::new("a.mbox")),
            Err(SiftError::UnsupportedContainer(_))
        ));
        assert!(matches!(
            container_kind(Path::new("noext")),
            Err(SiftError::UnsupportedContainer(_))
        ));
    }

    #[test]
    fn test_output_dir_adjacent_to_input() {
        let cfg = Config::default();
        let dir = output_dir_for(Path::new("/data/mail/report.eml"), None, &cfg);
        assert_eq!(dir, Path::new("/data/mail/report_files"));
    }

    #[test]
    fn test_output_dir_override_wins() {
        let cfg = Config::default();
        let dir = output_dir_for(
            Path::new("/data/mail/report.eml"),
            Some(Path::new("/tmp/out")),
            &cfg,
        );
        assert_eq!(dir, Path::new("/tmp/out"));
    }

    #[test]
    fn test_output_dir_config_root() {
        let mut cfg = Config::default();
        cfg.output.output_root = Some(PathBuf::from("/var/sift"));
        let dir = output_dir_for(Path::new("/data/mail/report.eml"), None, &cfg);
        assert_eq!(dir, Path::new("/var/sift/report_files"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let cfg = Config::default();
        let err = process_file(Path::new("/no/such/file.eml"), None, &cfg).unwrap_err();
        assert!(matches!(err, SiftError::FileNotFound(_)));
    }
}
