//! Error types for shared-root I/O operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the shared chat root
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller-supplied input was rejected before any I/O happened
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A required directory does not exist (share offline, or room/presence
    /// not initialized). Callers treat this as "retry later", not as failure.
    #[error("Directory missing: {path}")]
    DirectoryMissing { path: PathBuf },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record with the same file name already exists. The caller must retry
    /// with a fresh random token.
    #[error("Record name collision: {path}")]
    NameCollision { path: PathBuf },

    /// The lock file is held by another process. Carries the holder's expiry
    /// and detail for user-facing diagnostics.
    #[error("Lock at {path} is held by another process")]
    LockUnavailable {
        path: PathBuf,
        expires_at: Option<String>,
        detail: Option<String>,
    },
}

impl StoreError {
    /// Classify an `io::Error` from a directory read: `NotFound` means the
    /// feature's directory is absent (retry later), everything else is a
    /// genuine I/O failure.
    pub(crate) fn from_dir_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::DirectoryMissing {
                path: path.to_path_buf(),
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
