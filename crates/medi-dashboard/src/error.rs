//! Errors surfaced by the API and their HTTP rendering.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medi_model::ModelError;
use medi_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that can occur in the dashboard server.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Resource not found.
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Malformed path segment, query string or request body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The payload was well formed but broke a domain rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The payload points at a record that does not exist.
    #[error("referenced record does not exist: {0}")]
    MissingReference(String),

    /// Illegal status change.
    #[error("{0}")]
    InvalidTransition(String),

    /// The change clashes with existing records.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Storage reached but the operation failed. Details go to the log only.
    #[error("storage operation failed")]
    StorageFailed,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Too many connections.
    #[error("too many connections: {0} active, limit is {1}")]
    TooManyConnections(usize, usize),
}

impl DashboardError {
    /// Shorthand for [`DashboardError::NotFound`].
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }

    /// HTTP status and machine-readable kind for this error.
    #[must_use]
    pub const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_, _) => (StatusCode::NOT_FOUND, "not_found"),
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            Self::MissingReference(_) => (StatusCode::UNPROCESSABLE_ENTITY, "missing_reference"),
            Self::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
            Self::TooManyConnections(_, _) => {
                (StatusCode::SERVICE_UNAVAILABLE, "too_many_connections")
            }
            Self::StorageFailed => (StatusCode::INTERNAL_SERVER_ERROR, "storage_operation_failed"),
            Self::BindFailed(_, _) | Self::Internal(_) | Self::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();
        let body = ErrorResponse {
            error: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for DashboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { reason } => Self::StorageUnavailable(reason),
            StoreError::OperationFailed { reason } => {
                error!(error = %reason, "storage operation failed");
                Self::StorageFailed
            }
            StoreError::NotFound { entity, id } => Self::NotFound(entity.to_string(), id),
            StoreError::MissingReference { reference } => Self::MissingReference(reference),
            err @ StoreError::InvalidTransition { .. } => Self::InvalidTransition(err.to_string()),
            StoreError::Conflict { reason } => Self::Conflict(reason),
            StoreError::Invalid(model) => model.into(),
        }
    }
}

impl From<ModelError> for DashboardError {
    fn from(err: ModelError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for DashboardError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for DashboardError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use test_case::test_case;

    async fn body_json(err: DashboardError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let (status, json) = body_json(DashboardError::not_found("bed", "abc123")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "bed not found: abc123");
    }

    #[tokio::test]
    async fn test_storage_failure_hides_driver_text() {
        let err = DashboardError::from(StoreError::OperationFailed {
            reason: "relation \"beds\" does not exist".to_string(),
        });
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "storage_operation_failed");
        assert!(!json["message"].as_str().unwrap().contains("relation"));
    }

    #[test_case(StoreError::unavailable("pool closed"), StatusCode::SERVICE_UNAVAILABLE; "unavailable")]
    #[test_case(StoreError::not_found("alert", "x"), StatusCode::NOT_FOUND; "not found")]
    #[test_case(StoreError::MissingReference { reference: "beds_ward_id_fkey".into() }, StatusCode::UNPROCESSABLE_ENTITY; "missing reference")]
    #[test_case(StoreError::InvalidTransition { entity: "appointment", from: "cancelled".into(), to: "confirmed".into() }, StatusCode::CONFLICT; "invalid transition")]
    #[test_case(StoreError::Conflict { reason: "beds_patient_uidx".into() }, StatusCode::CONFLICT; "conflict")]
    #[test_case(StoreError::Invalid(ModelError::validation("name", "must not be empty")), StatusCode::BAD_REQUEST; "invalid payload")]
    fn test_store_error_status(err: StoreError, expected: StatusCode) {
        assert_eq!(DashboardError::from(err).status().0, expected);
    }

    #[tokio::test]
    async fn test_too_many_connections_error_response() {
        let (status, json) = body_json(DashboardError::TooManyConnections(100, 50)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "too_many_connections");
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err = DashboardError::from(serde_err);

        assert!(matches!(err, DashboardError::Serialization(_)));
    }
}
