//! Error types for platform descriptor operations.

use std::path::PathBuf;

/// Errors that can occur while loading or parsing platform descriptors.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing profile files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile file not found.
    #[error("profile file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Profile name is neither built-in nor present in `profiles/`.
    #[error("unknown profile: '{name}'")]
    UnknownProfile { name: String },

    /// A value could not be parsed into one of the platform enumerations.
    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
