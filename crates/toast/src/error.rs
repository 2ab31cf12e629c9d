//! Error types for toast operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for toast operations.
///
/// Assertion failures are never reported through this type; they go to the
/// host test context. These errors cover the library's own plumbing.
#[derive(Error, Debug)]
pub enum ToastError {
    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file exists but could not be parsed.
    #[error("invalid config at {}: {}", path.display(), reason)]
    InvalidConfig {
        /// Path to the offending file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// An environment override carried a value we do not understand.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Raw value found in the environment
        value: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToastError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidEnv { .. } => {
                Some("Use one of 1/0, true/false, yes/no, on/off for flags, or caller/test-file/off for TOAST_LOCATION.")
            }
            Self::InvalidConfig { .. } => Some("Check toast.toml against the documented keys: fail_fast, locator."),
            _ => None,
        }
    }
}

/// Convenience Result type for toast operations.
pub type Result<T> = std::result::Result<T, ToastError>;
