//! Error types for the medi-store crate.

use medi_model::ModelError;
use thiserror::Error;
use tracing::debug;

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No database handle, or the database could not be reached.
    #[error("storage unavailable: {reason}")]
    Unavailable {
        /// What made storage unreachable.
        reason: String,
    },

    /// The query reached the database and failed there.
    #[error("storage operation failed: {reason}")]
    OperationFailed {
        /// Driver message. Logged, never sent to clients.
        reason: String,
    },

    /// A mutator targeted a record that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The missing id.
        id: String,
    },

    /// A referenced record does not exist.
    #[error("referenced record does not exist: {reference}")]
    MissingReference {
        /// Which reference failed to resolve.
        reference: String,
    },

    /// The status change is not allowed from the current status.
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Entity kind.
        entity: &'static str,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The change would break a uniqueness rule, such as one bed per patient.
    #[error("conflict: {reason}")]
    Conflict {
        /// Which rule the change breaks.
        reason: String,
    },

    /// The payload failed validation.
    #[error(transparent)]
    Invalid(#[from] ModelError),
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for failures that mean the backend could not be reached at all.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        debug!(error = %err, "mapping database error");
        match err {
            sqlx::Error::PoolTimedOut => Self::unavailable("timed out waiting for a connection"),
            sqlx::Error::PoolClosed => Self::unavailable("connection pool is closed"),
            sqlx::Error::Io(io) => Self::unavailable(io.to_string()),
            sqlx::Error::Tls(tls) => Self::unavailable(tls.to_string()),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Self::MissingReference {
                reference: db.constraint().unwrap_or("foreign key").to_string(),
            },
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                reason: db.constraint().unwrap_or("unique constraint").to_string(),
            },
            other => Self::OperationFailed {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unavailable() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_unavailable());
    }

    #[test]
    fn test_row_not_found_is_operation_failure() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::OperationFailed { .. }));
    }

    #[test]
    fn test_display() {
        let err = StoreError::InvalidTransition {
            entity: "appointment",
            from: "cancelled".into(),
            to: "confirmed".into(),
        };
        assert_eq!(err.to_string(), "appointment cannot move from cancelled to confirmed");
        assert_eq!(
            StoreError::not_found("bed", "abc").to_string(),
            "bed not found: abc"
        );
        assert_eq!(
            StoreError::Conflict { reason: "patient p1 already occupies bed 101".into() }.to_string(),
            "conflict: patient p1 already occupies bed 101"
        );
    }
}
