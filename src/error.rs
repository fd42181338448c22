//! Error types for the aggregate store and the merge transform.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while reading, merging or writing metric documents.
#[derive(Debug, Error)]
pub enum JoinError {
    /// A file that must be read unconditionally does not exist.
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but is not valid JSON or has the wrong shape.
    #[error("Malformed document {}: {source}", .path.display())]
    MalformedDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The caller handed the merger something it cannot fold in.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing failed at the OS level.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, JoinError>;

impl JoinError {
    /// Map an I/O error, turning `ErrorKind::NotFound` into [`JoinError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            JoinError::NotFound { path }
        } else {
            JoinError::Io { path, source }
        }
    }
}
