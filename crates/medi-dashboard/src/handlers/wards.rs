//! Ward handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{NewWard, Ward, WardId};
use tracing::info;

use super::{found, or_fallback, parse_id};
use crate::error::DashboardResult;
use crate::fallback;
use crate::state::DashboardState;

/// Handle GET /api/wards.
pub async fn list_wards(State(state): State<Arc<DashboardState>>) -> Json<Vec<Ward>> {
    Json(or_fallback("wards", state.storage().wards().await, fallback::wards))
}

/// Handle GET /api/wards/:id.
pub async fn get_ward(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Ward>> {
    let ward_id = parse_id("ward", &id, WardId::parse)?;
    let ward = or_fallback("wards", state.storage().ward(ward_id).await, || {
        fallback::ward(ward_id)
    });
    found("ward", &id, ward)
}

/// Handle POST /api/wards.
pub async fn create_ward(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewWard>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Ward>)> {
    let Json(new) = payload?;
    new.validate()?;

    let ward = state.storage().create_ward(new).await?;
    info!(ward_id = %ward.id, name = %ward.name, "ward created");
    Ok((StatusCode::CREATED, Json(ward)))
}
