//! Error types for group configuration
//!
//! Loading configuration is the only fallible operation in this crate.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration document is not valid JSON or has the wrong shape
    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
