//! Appointments, their status state machine, and the detailed join.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::doctor::Doctor;
use crate::error::{ModelError, ModelResult};
use crate::ids::{AppointmentId, DoctorId, PatientId};
use crate::patient::Patient;
use crate::validation::{optional_long_text, optional_text};

/// Longest bookable slot, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Slot length used when a booking does not say.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Lifecycle state of an appointment.
///
/// Status only moves forward:
///
/// ```text
/// pending ──► scheduled ──► confirmed
///    │            │             │
///    └────────────┴─────────────┴──► cancelled
/// ```
///
/// `pending` may also jump straight to `confirmed`. `cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Requested, not yet placed in the calendar.
    Pending,
    /// Placed in the calendar.
    Scheduled,
    /// Confirmed with the patient.
    Confirmed,
    /// Called off.
    Cancelled,
}

impl AppointmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Scheduled, Self::Confirmed, Self::Cancelled];

    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    ///
    /// Re-applying the current status is allowed and changes nothing.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _)
                | (Self::Scheduled, Self::Scheduled | Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Confirmed | Self::Cancelled)
                | (Self::Cancelled, Self::Cancelled)
        )
    }

    /// Every status from which `next` can be reached in one step.
    #[must_use]
    pub fn sources_of(next: Self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .collect()
    }

    /// Statuses a new booking may start in.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::Pending | Self::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStatus {
                kind: "appointment",
                value: s.to_string(),
            })
    }
}

/// A booked appointment between a patient and a doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Appointment ID.
    pub id: AppointmentId,
    /// Patient being seen.
    pub patient_id: PatientId,
    /// Doctor seeing the patient.
    pub doctor_id: DoctorId,
    /// Start of the slot.
    pub appointment_date: DateTime<Utc>,
    /// Slot length in minutes.
    pub duration: u32,
    /// Lifecycle state.
    pub status: AppointmentStatus,
    /// Reason for the visit.
    pub reason: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the booking was made.
    pub created_at: DateTime<Utc>,
}

/// Payload for booking an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    /// Patient being seen.
    pub patient_id: PatientId,
    /// Doctor seeing the patient.
    pub doctor_id: DoctorId,
    /// Start of the slot.
    pub appointment_date: DateTime<Utc>,
    /// Slot length in minutes.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Initial status; defaults to `scheduled`.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    /// Reason for the visit.
    #[serde(default)]
    pub reason: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

impl NewAppointment {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        if self.duration == 0 || self.duration > MAX_DURATION_MINUTES {
            return Err(ModelError::validation(
                "duration",
                format!("must be between 1 and {MAX_DURATION_MINUTES} minutes"),
            ));
        }
        if let Some(status) = self.status {
            if !status.is_initial() {
                return Err(ModelError::validation(
                    "status",
                    format!("a new appointment cannot start as {status}"),
                ));
            }
        }
        optional_text("reason", self.reason.as_deref())?;
        optional_long_text("notes", self.notes.as_deref())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_appointment(self, id: AppointmentId, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_date: self.appointment_date,
            duration: self.duration,
            status: self.status.unwrap_or(AppointmentStatus::Scheduled),
            reason: self.reason,
            notes: self.notes,
            created_at,
        }
    }
}

/// Body of `PATCH /api/appointments/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AppointmentStatusChange {
    /// Target status.
    pub status: AppointmentStatus,
}

/// Filter over appointments. All present criteria must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    /// Only appointments starting on this UTC calendar day.
    pub date: Option<NaiveDate>,
    /// Only appointments with this doctor.
    pub doctor_id: Option<DoctorId>,
    /// Only appointments for this patient.
    pub patient_id: Option<PatientId>,
}

impl AppointmentQuery {
    /// Appointments on one day.
    #[must_use]
    pub const fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            doctor_id: None,
            patient_id: None,
        }
    }

    /// Appointments with one doctor.
    #[must_use]
    pub const fn for_doctor(doctor_id: DoctorId) -> Self {
        Self {
            date: None,
            doctor_id: Some(doctor_id),
            patient_id: None,
        }
    }

    /// Appointments for one patient.
    #[must_use]
    pub const fn for_patient(patient_id: PatientId) -> Self {
        Self {
            date: None,
            doctor_id: None,
            patient_id: Some(patient_id),
        }
    }

    /// True if the query has no criteria.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.date.is_none() && self.doctor_id.is_none() && self.patient_id.is_none()
    }

    /// Whether `appointment` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(date) = self.date {
            let Some((start, end)) = day_window(date) else {
                return false;
            };
            if appointment.appointment_date < start || appointment.appointment_date >= end {
                return false;
            }
        }
        self.doctor_id.is_none_or(|id| appointment.doctor_id == id)
            && self.patient_id.is_none_or(|id| appointment.patient_id == id)
    }

    /// Sort results the way this query presents them: ascending by date for
    /// a day view, most recent first otherwise.
    pub fn sort(&self, appointments: &mut [Appointment]) {
        if self.date.is_some() {
            appointments.sort_by(|a, b| {
                a.appointment_date
                    .cmp(&b.appointment_date)
                    .then(a.id.cmp(&b.id))
            });
        } else {
            sort_appointments(appointments);
        }
    }
}

/// Half-open UTC window `[start, start + 1 day)` covering `date`.
///
/// `None` for the last representable day, whose end cannot be expressed.
#[must_use]
pub fn day_window(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start.checked_add_signed(Duration::days(1))?;
    Some((start, end))
}

/// Sort appointments most recent first, ties by id.
pub fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| {
        b.appointment_date
            .cmp(&a.appointment_date)
            .then(a.id.cmp(&b.id))
    });
}

/// An appointment with its patient and doctor inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    /// The appointment.
    #[serde(flatten)]
    pub appointment: Appointment,
    /// The patient.
    pub patient: Patient,
    /// The doctor.
    pub doctor: Doctor,
}

/// Inner-join appointments to patients and doctors, most recent first.
#[must_use]
pub fn join_details(
    appointments: &[Appointment],
    patients: &[Patient],
    doctors: &[Doctor],
) -> Vec<AppointmentDetails> {
    let mut sorted = appointments.to_vec();
    sort_appointments(&mut sorted);
    sorted
        .into_iter()
        .filter_map(|appointment| {
            let patient = patients.iter().find(|p| p.id == appointment.patient_id)?;
            let doctor = doctors.iter().find(|d| d.id == appointment.doctor_id)?;
            Some(AppointmentDetails {
                patient: patient.clone(),
                doctor: doctor.clone(),
                appointment,
            })
        })
        .collect()
}
