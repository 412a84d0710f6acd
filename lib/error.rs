//! Error types for fwkit.

use std::path::PathBuf;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Result type for fwkit operations.
pub type FwResult<T> = Result<T, FwError>;

/// Error type for fwkit operations.
#[derive(Debug, Error)]
pub enum FwError {
    /// The selected root does not exist or is not a directory.
    #[error("Not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// No root was given and none could be prompted for.
    #[error("No root directory selected")]
    NoRootSelected,

    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path strip error.
    #[error("Path error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Invalid glob pattern.
    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// User cancelled operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
