//! Error types for access checks
//!
//! Access outcomes are never errors: a missing membership or an orphaned
//! piece of content degrades to `Forbidden` or `Neutral`. Errors are reserved
//! for collaborator failures, which are propagated to the caller untouched.

use thiserror::Error;

/// Access engine error types.
#[derive(Debug, Error)]
pub enum OgError {
    /// A collaborator (group type lookup, membership storage, permission
    /// registry) failed
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// Which collaborator failed
        collaborator: &'static str,
        /// Failure description
        message: String,
    },

    /// The engine was built without a required collaborator
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

/// Result type for access engine operations.
pub type OgResult<T> = Result<T, OgError>;

impl OgError {
    /// Create a collaborator failure.
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        OgError::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    /// Check if this error originated in a collaborator.
    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, OgError::Collaborator { .. })
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OgError::Collaborator { .. } => "COLLABORATOR_ERROR",
            OgError::MissingCollaborator(_) => "MISSING_COLLABORATOR",
        }
    }
}
