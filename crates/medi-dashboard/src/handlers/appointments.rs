//! Appointment handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use medi_model::appointment::day_window;
use medi_model::{
    Appointment, AppointmentDetails, AppointmentId, AppointmentQuery, AppointmentStatusChange,
    DoctorId, NewAppointment, PatientId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{found, or_fallback, parse_id, today};
use crate::error::{DashboardError, DashboardResult};
use crate::fallback;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// Query parameters for the appointment list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    /// A calendar day (`2024-01-15`) or any RFC 3339 timestamp on it.
    pub date: Option<String>,
    /// Filter by doctor.
    pub doctor_id: Option<String>,
    /// Filter by patient.
    pub patient_id: Option<String>,
}

impl AppointmentListQuery {
    fn parse(&self) -> DashboardResult<AppointmentQuery> {
        Ok(AppointmentQuery {
            date: self.date.as_deref().map(parse_date).transpose()?,
            doctor_id: self
                .doctor_id
                .as_deref()
                .map(|id| parse_id("doctor", id, DoctorId::parse))
                .transpose()?,
            patient_id: self
                .patient_id
                .as_deref()
                .map(|id| parse_id("patient", id, PatientId::parse))
                .transpose()?,
        })
    }
}

/// A calendar day or RFC 3339 timestamp, reduced to its UTC day. Days
/// without a complete 24h window after them are rejected.
fn parse_date(s: &str) -> DashboardResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc).date_naive()))
        .ok()
        .filter(|date| day_window(*date).is_some())
        .ok_or_else(|| DashboardError::InvalidRequest(format!("invalid date: {s}")))
}

/// Appointment list body: joined details when unfiltered, plain rows otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AppointmentListing {
    /// Every appointment with patient and doctor inlined.
    Details(Vec<AppointmentDetails>),
    /// Appointments matching a filter.
    Filtered(Vec<Appointment>),
}

/// Handle GET /api/appointments.
pub async fn list_appointments(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<AppointmentListQuery>, QueryRejection>,
) -> DashboardResult<Json<AppointmentListing>> {
    let Query(query) = query?;
    let query = query.parse()?;

    let listing = if query.is_empty() {
        AppointmentListing::Details(or_fallback(
            "appointments",
            state.storage().appointments_with_details().await,
            fallback::appointments_with_details,
        ))
    } else {
        AppointmentListing::Filtered(or_fallback(
            "appointments",
            state.storage().appointments_matching(query).await,
            || fallback::appointments_matching(query),
        ))
    };
    Ok(Json(listing))
}

/// Handle GET /api/appointments/today.
pub async fn list_todays_appointments(
    State(state): State<Arc<DashboardState>>,
) -> Json<Vec<Appointment>> {
    let today = today();
    Json(or_fallback(
        "appointments",
        state.storage().appointments_on(today).await,
        || fallback::appointments_matching(AppointmentQuery::on(today)),
    ))
}

/// Handle GET /api/appointments/:id.
pub async fn get_appointment(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<Appointment>> {
    let appointment_id = parse_id("appointment", &id, AppointmentId::parse)?;
    let appointment = or_fallback(
        "appointments",
        state.storage().appointment(appointment_id).await,
        || fallback::appointment(appointment_id),
    );
    found("appointment", &id, appointment)
}

/// Handle POST /api/appointments - book an appointment.
pub async fn create_appointment(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> DashboardResult<(StatusCode, Json<Appointment>)> {
    let Json(new) = payload?;
    new.validate()?;

    let appointment = state.storage().create_appointment(new).await?;
    info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        at = %appointment.appointment_date,
        "appointment booked"
    );
    state.publish(&LiveUpdate::NewAppointment(appointment.clone()));
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Handle PATCH /api/appointments/:id/status.
pub async fn update_appointment_status(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<String>,
    payload: Result<Json<AppointmentStatusChange>, JsonRejection>,
) -> DashboardResult<Json<Appointment>> {
    let appointment_id = parse_id("appointment", &id, AppointmentId::parse)?;
    let Json(change) = payload?;

    let appointment = state
        .storage()
        .update_appointment_status(appointment_id, change.status)
        .await?;
    info!(
        appointment_id = %appointment.id,
        status = appointment.status.as_str(),
        "appointment status updated"
    );
    state.publish(&LiveUpdate::AppointmentStatusUpdate(appointment.clone()));
    Ok(Json(appointment))
}
