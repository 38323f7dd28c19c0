//! Organ donor registry handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{DonorId, DonorQuery, DonorStatusChange, NewDonor, OrganDonor};
use tracing::info;

use super::{found, or_fallback, parse_id};
use crate::error::DashboardResult;
use crate::fallback;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// Handle GET /api/organ-donors - search by `bloodType` and `organType`.
pub async fn list_donors(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<DonorQuery>, QueryRejection>,
) -> DashboardResult<Json<Vec<OrganDonor>>> {
    let Query(query) = query?;
    let query = query.normalized();

    Ok(Json(or_fallback(
        "organ-donors",
        state.storage().search_donors(query.clone()).await,
        || fallback::donors(&query),
    )))
}

/// Handle GET /api/organ-donors/:id.
pub async fn get_donor(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<OrganDonor>> {
    let donor_id = parse_id("donor", &id, DonorId::parse)?;
    let donor = or_fallback("organ-donors", state.storage().donor(donor_id).await, || {
        fallback::donor(donor_id)
    });
    found("donor", &id, donor)
}

/// Handle POST /api/organ-donors - register a donor.
pub async fn create_donor(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewDonor>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<OrganDonor>)> {
    let Json(new) = payload?;
    new.validate()?;

    let donor = state.storage().create_donor(new).await?;
    info!(donor_id = %donor.id, blood_type = %donor.blood_type, "donor registered");
    state.publish(&LiveUpdate::NewDonor(donor.clone()));
    Ok((StatusCode::CREATED, Json(donor)))
}

/// Handle PATCH /api/organ-donors/:id/status.
pub async fn update_donor_status(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
    payload: Result<Json<DonorStatusChange>, JsonRejection>,
) -> DashboardResult<Json<OrganDonor>> {
    let donor_id = parse_id("donor", &id, DonorId::parse)?;
    let Json(change) = payload?;

    let donor = state
        .storage()
        .update_donor_status(donor_id, change.status)
        .await?;
    info!(donor_id = %donor.id, status = donor.status.as_str(), "donor status updated");
    state.publish(&LiveUpdate::DonorStatusUpdate(donor.clone()));
    Ok(Json(donor))
}
