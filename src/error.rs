//! Centralized error types for mailsift.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors produced by the mailsift library.
///
/// Per-attachment decoding failures are deliberately *not* represented here:
/// they are values ([`crate::model::content::ExtractedContent::Error`]) that
/// flow into the report instead of aborting it.
#[derive(Error, Debug)]
pub enum SiftError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input file does not exist.
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    /// The input file extension is not a recognized message container.
    #[error("unsupported container format '{0}' (expected .eml or .msg)")]
    UnsupportedContainer(String),

    /// The root message structure could not be decoded at all.
    #[error("failed to parse message: {0}")]
    Parse(String),

    /// Bad invocation (missing argument, invalid flag combination).
    #[error("usage error: {0}")]
    Usage(String),
}

/// Convenience alias for `Result<T, SiftError>`.
pub type Result<T> = std::result::Result<T, SiftError>;

impl SiftError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `SiftError`
/// when no path context is available (rare — prefer `SiftError::io`).
impl From<std::io::Error> for SiftError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
