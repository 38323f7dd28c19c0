//! Row shapes returned by the queries, and their conversion into model types.

use chrono::{DateTime, NaiveDate, Utc};
use medi_model::{
    Alert, Appointment, Bed, BedWithWard, ChatMessage, Doctor, ModelError, OrganDonor, Patient,
    Ward,
};
use uuid::Uuid;

use crate::error::StoreError;

fn corrupt(err: ModelError) -> StoreError {
    StoreError::OperationFailed {
        reason: format!("stored row is invalid: {err}"),
    }
}

fn unsigned(column: &str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::OperationFailed {
        reason: format!("stored {column} is negative: {value}"),
    })
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DoctorRow {
    id: Uuid,
    name: String,
    specialization: String,
    department: String,
    license_number: String,
    phone_number: Option<String>,
    available: bool,
    created_at: DateTime<Utc>,
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            specialization: row.specialization,
            department: row.department,
            license_number: row.license_number,
            phone_number: row.phone_number,
            available: row.available,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PatientRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone_number: Option<String>,
    date_of_birth: Option<NaiveDate>,
    blood_type: Option<String>,
    condition: Option<String>,
    room: Option<String>,
    medical_history: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Self {
            id: row.id.into(),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            date_of_birth: row.date_of_birth,
            blood_type: row.blood_type,
            condition: row.condition,
            room: row.room,
            medical_history: row.medical_history,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WardRow {
    id: Uuid,
    name: String,
    department: String,
    capacity: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<WardRow> for Ward {
    type Error = StoreError;

    fn try_from(row: WardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            department: row.department,
            capacity: unsigned("capacity", row.capacity)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BedRow {
    id: Uuid,
    ward_id: Uuid,
    bed_number: String,
    status: String,
    critical: bool,
    patient_id: Option<Uuid>,
    equipment: Vec<String>,
    notes: Option<String>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<BedRow> for Bed {
    type Error = StoreError;

    fn try_from(row: BedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            ward_id: row.ward_id.into(),
            bed_number: row.bed_number,
            status: row.status.parse().map_err(corrupt)?,
            critical: row.critical,
            patient_id: row.patient_id.map(Into::into),
            equipment: row.equipment,
            notes: row.notes,
            last_updated: row.last_updated,
        })
    }
}

/// A bed row joined with the columns of its ward, prefixed `ward_`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BedWardRow {
    #[sqlx(flatten)]
    bed: BedRow,
    ward_name: String,
    ward_department: String,
    ward_capacity: i32,
    ward_created_at: DateTime<Utc>,
}

impl TryFrom<BedWardRow> for BedWithWard {
    type Error = StoreError;

    fn try_from(row: BedWardRow) -> Result<Self, Self::Error> {
        let ward = Ward {
            id: row.bed.ward_id.into(),
            name: row.ward_name,
            department: row.ward_department,
            capacity: unsigned("capacity", row.ward_capacity)?,
            created_at: row.ward_created_at,
        };
        Ok(Self {
            bed: row.bed.try_into()?,
            ward,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AppointmentRow {
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Uuid,
    appointment_date: DateTime<Utc>,
    duration: i32,
    status: String,
    reason: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            patient_id: row.patient_id.into(),
            doctor_id: row.doctor_id.into(),
            appointment_date: row.appointment_date,
            duration: unsigned("duration", row.duration)?,
            status: row.status.parse().map_err(corrupt)?,
            reason: row.reason,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DonorRow {
    id: Uuid,
    name: String,
    blood_type: String,
    organs: Vec<String>,
    status: String,
    contact_phone: Option<String>,
    registered_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<DonorRow> for OrganDonor {
    type Error = StoreError;

    fn try_from(row: DonorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            blood_type: row.blood_type,
            organs: row.organs,
            status: row.status.parse().map_err(corrupt)?,
            contact_phone: row.contact_phone,
            registered_at: row.registered_at,
            last_updated: row.last_updated,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AlertRow {
    id: Uuid,
    message: String,
    severity: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            message: row.message,
            severity: row.severity.parse().map_err(corrupt)?,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ChatRow {
    id: Uuid,
    session_id: String,
    message: String,
    is_user: bool,
    timestamp: DateTime<Utc>,
}

impl From<ChatRow> for ChatMessage {
    fn from(row: ChatRow) -> Self {
        Self {
            id: row.id.into(),
            session_id: row.session_id,
            message: row.message,
            is_user: row.is_user,
            timestamp: row.timestamp,
        }
    }
}

/// Convert every row, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
