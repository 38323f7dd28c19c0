//! Error types for domain validation.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while validating or parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A payload field failed validation.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The offending field, as named on the wire.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A status string did not name a known status.
    #[error("unknown {kind} status: {value:?}")]
    UnknownStatus {
        /// Which status family was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// An identifier was not a valid UUID.
    #[error("invalid {kind} id: {value:?}")]
    InvalidId {
        /// Which entity the id belongs to.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl ModelError {
    /// Shorthand for a [`ModelError::Validation`].
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
