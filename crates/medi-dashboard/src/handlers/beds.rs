//! Bed and bed-status handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{Bed, BedId, BedStatus, BedStatusChange, BedWithWard, NewBed, WardId};
use serde::Deserialize;
use tracing::info;

use super::{found, or_fallback, parse_id};
use crate::error::{DashboardError, DashboardResult};
use crate::fallback;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// Query parameters for the bed list.
#[derive(Debug, Default, Deserialize)]
pub struct BedListQuery {
    /// Only beds with this status.
    pub status: Option<String>,
}

/// Parse a bed status from a query string value.
fn parse_bed_status(s: &str) -> DashboardResult<BedStatus> {
    BedStatus::from_str(s)
        .map_err(|_| DashboardError::InvalidRequest(format!("invalid bed status: {s}")))
}

/// Handle GET /api/beds - beds with their wards.
pub async fn list_beds(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<BedListQuery>, QueryRejection>,
) -> DashboardResult<Json<Vec<BedWithWard>>> {
    let Query(query) = query?;
    let status = query.status.as_deref().map(parse_bed_status).transpose()?;

    let mut beds = or_fallback(
        "beds",
        state.storage().beds_with_ward().await,
        fallback::beds_with_ward,
    );
    if let Some(status) = status {
        beds.retain(|row| row.bed.status == status);
    }
    Ok(Json(beds))
}

/// Handle GET /api/beds/:id.
pub async fn get_bed(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Bed>> {
    let bed_id = parse_id("bed", &id, BedId::parse)?;
    let bed = or_fallback("beds", state.storage().bed(bed_id).await, || {
        fallback::bed(bed_id)
    });
    found("bed", &id, bed)
}

/// Handle GET /api/beds/by-ward/:ward_id.
pub async fn list_beds_by_ward(
    State(state): State<Arc<DashboardState>>,
    Path(ward_id): Path<String>,
) -> DashboardResult<Json<Vec<Bed>>> {
    let ward_id = parse_id("ward", &ward_id, WardId::parse)?;
    Ok(Json(or_fallback(
        "beds",
        state.storage().beds_by_ward(ward_id).await,
        || fallback::beds_by_ward(ward_id),
    )))
}

/// Handle POST /api/beds.
pub async fn create_bed(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewBed>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Bed>)> {
    let Json(new) = payload?;
    new.validate()?;

    let bed = state.storage().create_bed(new).await?;
    info!(bed_id = %bed.id, ward_id = %bed.ward_id, "bed created");
    Ok((StatusCode::CREATED, Json(bed)))
}

/// Handle PATCH /api/beds/:id/status - occupy or release a bed.
pub async fn update_bed_status(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
    payload: Result<Json<BedStatusChange>, JsonRejection>,
) -> DashboardResult<Json<Bed>> {
    let bed_id = parse_id("bed", &id, BedId::parse)?;
    let Json(change) = payload?;
    change.validate()?;

    let bed = state.storage().update_bed_status(bed_id, change).await?;
    info!(bed_id = %bed.id, status = bed.status.as_str(), "bed status updated");
    state.publish(&LiveUpdate::BedStatusUpdate(bed.clone()));
    Ok(Json(bed))
}
