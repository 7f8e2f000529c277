use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the web app stages.
#[derive(Debug, Error)]
pub enum WebAppError {
    #[error("{field} is required")]
    MissingRequiredInput { field: &'static str },

    #[error("{field} is not valid: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("'{url}' is not a usable URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Failed to {message} at {path:?}")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl WebAppError {
    pub fn filesystem(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        WebAppError::Filesystem {
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            WebAppError::MissingRequiredInput { .. }
            | WebAppError::InvalidInput { .. }
            | WebAppError::InvalidUrl { .. }
            | WebAppError::InvalidSelection(_) => 1,
            WebAppError::NetworkFailure(_) | WebAppError::Filesystem { .. } => 2,
        }
    }
}
