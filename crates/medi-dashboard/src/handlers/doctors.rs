//! Doctor handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medi_model::{Doctor, DoctorAvailabilityChange, DoctorId, NewDoctor};
use tracing::info;

use super::{found, or_fallback, parse_id};
use crate::error::DashboardResult;
use crate::fallback;
use crate::state::DashboardState;

/// Handle GET /api/doctors.
pub async fn list_doctors(State(state): State<Arc<DashboardState>>) -> Json<Vec<Doctor>> {
    Json(or_fallback("doctors", state.storage().doctors().await, fallback::doctors))
}

/// Handle GET /api/doctors/:id.
pub async fn get_doctor(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Doctor>> {
    let doctor_id = parse_id("doctor", &id, DoctorId::parse)?;
    let doctor = or_fallback("doctors", state.storage().doctor(doctor_id).await, || {
        fallback::doctor(doctor_id)
    });
    found("doctor", &id, doctor)
}

/// Handle GET /api/doctors/department/:department.
pub async fn list_doctors_by_department(
    State(state): State<Arc<DashboardState>>,
    Path(department): Path<String>,
) -> Json<Vec<Doctor>> {
    Json(or_fallback(
        "doctors",
        state.storage().doctors_by_department(&department).await,
        || fallback::doctors_by_department(&department),
    ))
}

/// Handle POST /api/doctors.
pub async fn create_doctor(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewDoctor>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Doctor>)> {
    let Json(new) = payload?;
    new.validate()?;

    let doctor = state.storage().create_doctor(new).await?;
    info!(doctor_id = %doctor.id, department = %doctor.department, "doctor created");
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// Handle PATCH /api/doctors/:id/availability.
pub async fn set_doctor_availability(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
    payload: Result<Json<DoctorAvailabilityChange>, JsonRejection>,
) -> DashboardResult<Json<Doctor>> {
    let doctor_id = parse_id("doctor", &id, DoctorId::parse)?;
    let Json(change) = payload?;

    let doctor = state
        .storage()
        .set_doctor_availability(doctor_id, change.available)
        .await?;
    info!(doctor_id = %doctor.id, available = doctor.available, "doctor availability changed");
    Ok(Json(doctor))
}
