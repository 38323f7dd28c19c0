//! Alert handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{Alert, AlertId, NewAlert};
use tracing::info;

use super::{found, or_fallback, parse_id};
use crate::error::DashboardResult;
use crate::fallback;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// Handle GET /api/alerts.
pub async fn list_alerts(State(state): State<Arc<DashboardState>>) -> Json<Vec<Alert>> {
    Json(or_fallback("alerts", state.storage().alerts().await, fallback::alerts))
}

/// Handle GET /api/alerts/unread.
pub async fn list_unread_alerts(State(state): State<Arc<DashboardState>>) -> Json<Vec<Alert>> {
    Json(or_fallback(
        "alerts",
        state.storage().unread_alerts().await,
        fallback::unread_alerts,
    ))
}

/// Handle GET /api/alerts/:id.
pub async fn get_alert(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Alert>> {
    let alert_id = parse_id("alert", &id, AlertId::parse)?;
    let alert = or_fallback("alerts", state.storage().alert(alert_id).await, || {
        fallback::alert(alert_id)
    });
    found("alert", &id, alert)
}

/// Handle POST /api/alerts - raise an alert.
pub async fn create_alert(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewAlert>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Alert>)> {
    let Json(new) = payload?;
    new.validate()?;

    let alert = state.storage().create_alert(new).await?;
    info!(alert_id = %alert.id, severity = alert.severity.as_str(), "alert raised");
    state.publish(&LiveUpdate::NewAlert(alert.clone()));
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Handle PATCH /api/alerts/:id/read. Marking twice is harmless.
pub async fn mark_alert_read(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Alert>> {
    let alert_id = parse_id("alert", &id, AlertId::parse)?;
    let alert = state.storage().mark_alert_read(alert_id).await?;
    Ok(Json(alert))
}
