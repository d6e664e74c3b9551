//! Packaging error types.

use std::path::PathBuf;

/// Errors that can occur while packaging or exporting.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// A glob pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {detail}")]
    InvalidPattern { pattern: String, detail: String },

    /// A directory the rules copy from does not exist.
    #[error("directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    /// Two different files flatten onto the same destination name.
    #[error("'{name}' packaged twice: {} and {}", first.display(), second.display())]
    Collision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A packaged file no longer matches its recorded hash.
    #[error("integrity check failed for '{path}': expected {expected}, got {actual}")]
    IntegrityFailure {
        path: String,
        expected: String,
        actual: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, PackageError>;
