//! HTTP request handlers for the dashboard API.
//!
//! Reads go to storage first and fall back to the fixed data set on any
//! storage error, so they always answer 200 with something. Writes never
//! fall back: a failed write is reported, and only a successful one is
//! broadcast to WebSocket viewers.

pub mod alerts;
pub mod appointments;
pub mod beds;
pub mod chatbot;
pub mod doctors;
pub mod donors;
pub mod patients;
pub mod stats;
pub mod wards;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use medi_model::ModelResult;
use medi_store::StoreResult;
use tracing::warn;

use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;
use crate::types::HealthResponse;

/// Handle GET /api/health - health check endpoint.
pub async fn health_check(State(state): State<Arc<DashboardState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
        storage_available: state.storage().is_available(),
        storage_backend: state.storage().backend_name().to_string(),
        assistant_configured: state.assistant().is_configured(),
        ws_connections: state.ws_connection_count(),
    })
}

/// Use the storage answer, or the fallback answer if storage failed.
pub(crate) fn or_fallback<T>(
    resource: &'static str,
    result: StoreResult<T>,
    fallback: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, resource, "storage read failed, serving fallback data");
            fallback()
        }
    }
}

/// Parse a path or query id, rejecting malformed ones with 400.
pub(crate) fn parse_id<T>(
    kind: &str,
    raw: &str,
    parse: impl FnOnce(&str) -> ModelResult<T>,
) -> DashboardResult<T> {
    parse(raw).map_err(|_| DashboardError::InvalidRequest(format!("invalid {kind} ID: {raw}")))
}

/// Turn a lookup result into a response or a 404.
pub(crate) fn found<T>(entity: &str, id: &str, value: Option<T>) -> DashboardResult<Json<T>> {
    value
        .map(Json)
        .ok_or_else(|| DashboardError::not_found(entity, id))
}

/// Current UTC calendar day.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
