//! Error types for the medi-assistant crate.

use thiserror::Error;

/// Result type alias for assistant calls.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Why the assistant could not answer.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No API key was configured.
    #[error("assistant is not configured")]
    NotConfigured,

    /// The request never produced a response.
    #[error("assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service answered with an error status.
    #[error("assistant returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The upstream answer could not be understood.
    #[error("assistant response was invalid: {reason}")]
    InvalidResponse {
        /// What was wrong with it.
        reason: String,
    },
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            reason: err.to_string(),
        }
    }
}
