//! Resolution errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::acquire::TransferFailure;

/// Errors that can occur during a resolution pass or the build it drives.
///
/// `UnsupportedOption` and individual transfer failures are normally
/// absorbed by fallback chains; they only reach the caller when no
/// alternative is left.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("option '{option}' does not accept value '{value}'")]
    UnsupportedOption { option: String, value: String },

    #[error("source acquisition exhausted after {} candidate(s): {}", .failures.len(), join_failures(.failures))]
    AcquisitionExhausted { failures: Vec<TransferFailure> },

    #[error("no sources available; acquire them first or place them manually")]
    MissingSources,

    #[error("{} already has files but no source tree; empty it or choose another destination", .path.display())]
    DestinationOccupied { path: PathBuf },

    #[error("{step} failed ({status}):\n{stderr}")]
    BuildFailure {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("build tool '{program}' not found on PATH")]
    ToolNotFound { program: String },

    #[error("invalid requirement reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("platform error: {0}")]
    Platform(#[from] fftpkg_platform::PlatformError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_failures(failures: &[TransferFailure]) -> String {
    if failures.is_empty() {
        return "no candidates configured".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
