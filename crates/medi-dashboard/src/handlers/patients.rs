//! Patient handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{NewPatient, Patient, PatientId, PatientUpdate};
use tracing::info;

use super::{found, or_fallback, parse_id, today};
use crate::error::DashboardResult;
use crate::fallback;
use crate::state::DashboardState;

/// Handle GET /api/patients.
pub async fn list_patients(State(state): State<Arc<DashboardState>>) -> Json<Vec<Patient>> {
    Json(or_fallback("patients", state.storage().patients().await, fallback::patients))
}

/// Handle GET /api/patients/:id.
pub async fn get_patient(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Patient>> {
    let patient_id = parse_id("patient", &id, PatientId::parse)?;
    let patient = or_fallback("patients", state.storage().patient(patient_id).await, || {
        fallback::patient(patient_id)
    });
    found("patient", &id, patient)
}

/// Handle POST /api/patients.
pub async fn create_patient(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Patient>)> {
    let Json(new) = payload?;
    new.validate(today())?;

    let patient = state.storage().create_patient(new).await?;
    info!(patient_id = %patient.id, "patient admitted");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Handle PATCH /api/patients/:id - partial update.
pub async fn update_patient(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
    payload: Result<Json<PatientUpdate>, JsonRejection>,
) -> DashboardResult<Json<Patient>> {
    let patient_id = parse_id("patient", &id, PatientId::parse)?;
    let Json(update) = payload?;
    update.validate(today())?;

    let patient = state.storage().update_patient(patient_id, update).await?;
    info!(patient_id = %patient.id, "patient updated");
    Ok(Json(patient))
}
