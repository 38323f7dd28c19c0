//! PostgreSQL backend over a `sqlx` connection pool.
//!
//! Every list query spells out its `ORDER BY` to match the ordering helpers in
//! `medi-model`, so the in-memory backend and this one return rows in the
//! same order. Text keys sort with `COLLATE "C"` (byte order), names through
//! `lower()`.

mod rows;

use chrono::{DateTime, Utc};
use medi_model::appointment::{day_window, join_details};
use medi_model::{
    Alert, AlertId, Appointment, AppointmentDetails, AppointmentId, AppointmentQuery,
    AppointmentStatus, Bed, BedId, BedStatus, BedStatusChange, BedWithWard, ChatMessage, Doctor,
    DoctorId, DonorId, DonorQuery, DonorStatus, OrganDonor, Patient, PatientId, PatientUpdate,
    Ward, WardId,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::error::{StoreError, StoreResult};

use self::rows::{
    AlertRow, AppointmentRow, BedRow, BedWardRow, ChatRow, DonorRow, DoctorRow, PatientRow,
    WardRow, convert_all,
};

/// The bundled DDL, applied by [`PgStore::init_schema`].
pub const SCHEMA: &str = include_str!("../schema.sql");

macro_rules! select_doctors {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, specialization, department, license_number, phone_number, \
             available, created_at FROM doctors ",
            $tail
        )
    };
}

macro_rules! select_patients {
    ($tail:literal) => {
        concat!(
            "SELECT id, first_name, last_name, email, phone_number, date_of_birth, blood_type, \
             condition, room, medical_history, created_at FROM patients ",
            $tail
        )
    };
}

macro_rules! select_wards {
    ($tail:literal) => {
        concat!("SELECT id, name, department, capacity, created_at FROM wards ", $tail)
    };
}

macro_rules! select_beds {
    ($tail:literal) => {
        concat!(
            "SELECT id, ward_id, bed_number, status, critical, patient_id, equipment, notes, \
             last_updated FROM beds ",
            $tail
        )
    };
}

macro_rules! select_appointments {
    ($tail:literal) => {
        concat!(
            "SELECT id, patient_id, doctor_id, appointment_date, duration, status, reason, \
             notes, created_at FROM appointments ",
            $tail
        )
    };
}

macro_rules! select_donors {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, blood_type, organs, status, contact_phone, registered_at, \
             last_updated FROM organ_donors ",
            $tail
        )
    };
}

macro_rules! select_alerts {
    ($tail:literal) => {
        concat!("SELECT id, message, severity, is_read, created_at FROM alerts ", $tail)
    };
}

const APPOINTMENTS_ON_DAY: &str = select_appointments!(
    "WHERE appointment_date >= $1 AND appointment_date < $2 \
     AND ($3::uuid IS NULL OR doctor_id = $3) \
     AND ($4::uuid IS NULL OR patient_id = $4) \
     ORDER BY appointment_date ASC, id"
);

const APPOINTMENTS_FILTERED: &str = select_appointments!(
    "WHERE ($1::timestamptz IS NULL OR appointment_date >= $1) \
     AND ($2::timestamptz IS NULL OR appointment_date < $2) \
     AND ($3::uuid IS NULL OR doctor_id = $3) \
     AND ($4::uuid IS NULL OR patient_id = $4) \
     ORDER BY appointment_date DESC, id"
);

fn signed(column: &str, value: u32) -> StoreResult<i32> {
    i32::try_from(value).map_err(|_| StoreError::OperationFailed {
        reason: format!("{column} out of range: {value}"),
    })
}

/// Escape `LIKE` metacharacters so the fragment matches literally.
fn like_fragment(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Storage backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build a pool for `url` without connecting.
    ///
    /// Connections are opened on first use, so an unreachable server shows up
    /// as [`StoreError::Unavailable`] on each call rather than at startup.
    pub fn connect_lazy(url: &str, config: &PoolConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(url)
            .map_err(|err| StoreError::unavailable(format!("invalid database url: {err}")))?;
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "postgres pool configured"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tables.
    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("database schema applied");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ==================== Doctors ====================

    pub(crate) async fn doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>> {
        let row = sqlx::query_as::<_, DoctorRow>(select_doctors!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub(crate) async fn doctors(&self) -> StoreResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, DoctorRow>(select_doctors!(
            "ORDER BY lower(name) COLLATE \"C\", id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn doctors_by_department(&self, department: &str) -> StoreResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, DoctorRow>(select_doctors!(
            "WHERE department = $1 ORDER BY lower(name) COLLATE \"C\", id"
        ))
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn insert_doctor(&self, doctor: &Doctor) -> StoreResult<Doctor> {
        sqlx::query(
            "INSERT INTO doctors (id, name, specialization, department, license_number, \
             phone_number, available, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(doctor.id.as_uuid())
        .bind(&doctor.name)
        .bind(&doctor.specialization)
        .bind(&doctor.department)
        .bind(&doctor.license_number)
        .bind(&doctor.phone_number)
        .bind(doctor.available)
        .bind(doctor.created_at)
        .execute(&self.pool)
        .await?;
        Ok(doctor.clone())
    }

    pub(crate) async fn set_doctor_availability(
        &self,
        id: DoctorId,
        available: bool,
    ) -> StoreResult<Doctor> {
        let row = sqlx::query_as::<_, DoctorRow>(
            "UPDATE doctors SET available = $2 WHERE id = $1 RETURNING id, name, specialization, \
             department, license_number, phone_number, available, created_at",
        )
        .bind(id.as_uuid())
        .bind(available)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into)
            .ok_or_else(|| StoreError::not_found("doctor", id))
    }

    // ==================== Patients ====================

    pub(crate) async fn patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        let row = sqlx::query_as::<_, PatientRow>(select_patients!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub(crate) async fn patients(&self) -> StoreResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, PatientRow>(select_patients!(
            "ORDER BY lower(last_name) COLLATE \"C\", lower(first_name) COLLATE \"C\", id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn insert_patient(&self, patient: &Patient) -> StoreResult<Patient> {
        sqlx::query(
            "INSERT INTO patients (id, first_name, last_name, email, phone_number, date_of_birth, \
             blood_type, condition, room, medical_history, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(patient.id.as_uuid())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.phone_number)
        .bind(patient.date_of_birth)
        .bind(&patient.blood_type)
        .bind(&patient.condition)
        .bind(&patient.room)
        .bind(&patient.medical_history)
        .bind(patient.created_at)
        .execute(&self.pool)
        .await?;
        Ok(patient.clone())
    }

    pub(crate) async fn update_patient(
        &self,
        id: PatientId,
        update: &PatientUpdate,
    ) -> StoreResult<Patient> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PatientRow>(select_patients!("WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
        let mut patient: Patient = row
            .map(Into::into)
            .ok_or_else(|| StoreError::not_found("patient", id))?;
        update.apply(&mut patient);

        sqlx::query(
            "UPDATE patients SET first_name = $2, last_name = $3, email = $4, phone_number = $5, \
             date_of_birth = $6, blood_type = $7, condition = $8, room = $9, \
             medical_history = $10 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.phone_number)
        .bind(patient.date_of_birth)
        .bind(&patient.blood_type)
        .bind(&patient.condition)
        .bind(&patient.room)
        .bind(&patient.medical_history)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(patient)
    }

    // ==================== Wards ====================

    pub(crate) async fn ward(&self, id: WardId) -> StoreResult<Option<Ward>> {
        let row = sqlx::query_as::<_, WardRow>(select_wards!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Ward::try_from).transpose()
    }

    pub(crate) async fn wards(&self) -> StoreResult<Vec<Ward>> {
        let rows = sqlx::query_as::<_, WardRow>(select_wards!("ORDER BY lower(name) COLLATE \"C\", id"))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    pub(crate) async fn insert_ward(&self, ward: &Ward) -> StoreResult<Ward> {
        sqlx::query(
            "INSERT INTO wards (id, name, department, capacity, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(ward.id.as_uuid())
        .bind(&ward.name)
        .bind(&ward.department)
        .bind(signed("capacity", ward.capacity)?)
        .bind(ward.created_at)
        .execute(&self.pool)
        .await?;
        Ok(ward.clone())
    }

    // ==================== Beds ====================

    pub(crate) async fn bed(&self, id: BedId) -> StoreResult<Option<Bed>> {
        let row = sqlx::query_as::<_, BedRow>(select_beds!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Bed::try_from).transpose()
    }

    pub(crate) async fn beds(&self) -> StoreResult<Vec<Bed>> {
        let rows = sqlx::query_as::<_, BedRow>(select_beds!("ORDER BY bed_number COLLATE \"C\", id"))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    pub(crate) async fn beds_by_ward(&self, ward_id: WardId) -> StoreResult<Vec<Bed>> {
        let rows = sqlx::query_as::<_, BedRow>(select_beds!(
            "WHERE ward_id = $1 ORDER BY bed_number COLLATE \"C\", id"
        ))
        .bind(ward_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub(crate) async fn beds_by_status(&self, status: BedStatus) -> StoreResult<Vec<Bed>> {
        let rows = sqlx::query_as::<_, BedRow>(select_beds!(
            "WHERE status = $1 ORDER BY bed_number COLLATE \"C\", id"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub(crate) async fn beds_with_ward(&self) -> StoreResult<Vec<BedWithWard>> {
        let rows = sqlx::query_as::<_, BedWardRow>(
            "SELECT b.id, b.ward_id, b.bed_number, b.status, b.critical, b.patient_id, \
             b.equipment, b.notes, b.last_updated, w.name AS ward_name, \
             w.department AS ward_department, w.capacity AS ward_capacity, \
             w.created_at AS ward_created_at \
             FROM beds b JOIN wards w ON w.id = b.ward_id \
             ORDER BY lower(w.name) COLLATE \"C\", b.bed_number COLLATE \"C\", b.id",
        )
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub(crate) async fn insert_bed(&self, bed: &Bed) -> StoreResult<Bed> {
        sqlx::query(
            "INSERT INTO beds (id, ward_id, bed_number, status, critical, patient_id, equipment, \
             notes, last_updated) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(bed.id.as_uuid())
        .bind(bed.ward_id.as_uuid())
        .bind(&bed.bed_number)
        .bind(bed.status.as_str())
        .bind(bed.critical)
        .bind(bed.patient_id.map(|id| id.as_uuid()))
        .bind(&bed.equipment)
        .bind(&bed.notes)
        .bind(bed.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(bed.clone())
    }

    pub(crate) async fn update_bed_status(
        &self,
        id: BedId,
        change: &BedStatusChange,
        now: DateTime<Utc>,
    ) -> StoreResult<Bed> {
        if let Some(patient_id) = change.patient_id {
            let other: Option<String> = sqlx::query_scalar(
                "SELECT bed_number FROM beds WHERE patient_id = $1 AND id <> $2 LIMIT 1",
            )
            .bind(patient_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
            if let Some(bed_number) = other {
                return Err(StoreError::Conflict {
                    reason: format!("patient {patient_id} already occupies bed {bed_number}"),
                });
            }
        }
        let row = sqlx::query_as::<_, BedRow>(
            "UPDATE beds SET status = $2, patient_id = $3, critical = $4, last_updated = $5 \
             WHERE id = $1 RETURNING id, ward_id, bed_number, status, critical, patient_id, \
             equipment, notes, last_updated",
        )
        .bind(id.as_uuid())
        .bind(change.status.as_str())
        .bind(change.patient_id.map(|p| p.as_uuid()))
        .bind(change.critical)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Bed::try_from)
            .transpose()?
            .ok_or_else(|| StoreError::not_found("bed", id))
    }

    // ==================== Appointments ====================

    pub(crate) async fn appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(select_appointments!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Appointment::try_from).transpose()
    }

    pub(crate) async fn appointments_matching(
        &self,
        query: &AppointmentQuery,
    ) -> StoreResult<Vec<Appointment>> {
        let sql = if query.date.is_some() {
            APPOINTMENTS_ON_DAY
        } else {
            APPOINTMENTS_FILTERED
        };
        let window = match query.date {
            Some(date) => match day_window(date) {
                Some(window) => Some(window),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let rows = sqlx::query_as::<_, AppointmentRow>(sql)
            .bind(window.map(|(start, _)| start))
            .bind(window.map(|(_, end)| end))
            .bind(query.doctor_id.map(|id| id.as_uuid()))
            .bind(query.patient_id.map(|id| id.as_uuid()))
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), ?query, "appointments fetched");
        convert_all(rows)
    }

    pub(crate) async fn appointments_with_details(&self) -> StoreResult<Vec<AppointmentDetails>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        let appointments: Vec<Appointment> = convert_all(
            sqlx::query_as::<_, AppointmentRow>(select_appointments!(""))
                .fetch_all(&mut *tx)
                .await?,
        )?;
        let patients: Vec<Patient> = sqlx::query_as::<_, PatientRow>(select_patients!(
            "WHERE id IN (SELECT patient_id FROM appointments)"
        ))
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
        let doctors: Vec<Doctor> = sqlx::query_as::<_, DoctorRow>(select_doctors!(
            "WHERE id IN (SELECT doctor_id FROM appointments)"
        ))
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
        tx.commit().await?;
        Ok(join_details(&appointments, &patients, &doctors))
    }

    pub(crate) async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<Appointment> {
        sqlx::query(
            "INSERT INTO appointments (id, patient_id, doctor_id, appointment_date, duration, \
             status, reason, notes, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(appointment.id.as_uuid())
        .bind(appointment.patient_id.as_uuid())
        .bind(appointment.doctor_id.as_uuid())
        .bind(appointment.appointment_date)
        .bind(signed("duration", appointment.duration)?)
        .bind(appointment.status.as_str())
        .bind(&appointment.reason)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(appointment.clone())
    }

    pub(crate) async fn update_appointment_status(
        &self,
        id: AppointmentId,
        next: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        let sources: Vec<String> = AppointmentStatus::sources_of(next)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let row = sqlx::query_as::<_, AppointmentRow>(
            "UPDATE appointments SET status = $2 WHERE id = $1 AND status = ANY($3) \
             RETURNING id, patient_id, doctor_id, appointment_date, duration, status, reason, \
             notes, created_at",
        )
        .bind(id.as_uuid())
        .bind(next.as_str())
        .bind(&sources)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return row.try_into();
        }
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM appointments WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        Err(match current {
            None => StoreError::not_found("appointment", id),
            Some(from) => StoreError::InvalidTransition {
                entity: "appointment",
                from,
                to: next.to_string(),
            },
        })
    }

    // ==================== Organ donors ====================

    pub(crate) async fn donor(&self, id: DonorId) -> StoreResult<Option<OrganDonor>> {
        let row = sqlx::query_as::<_, DonorRow>(select_donors!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(OrganDonor::try_from).transpose()
    }

    pub(crate) async fn search_donors(&self, query: &DonorQuery) -> StoreResult<Vec<OrganDonor>> {
        let rows = sqlx::query_as::<_, DonorRow>(select_donors!(
            "WHERE ($1::text IS NULL OR blood_type = $1) \
             AND ($2::text IS NULL OR EXISTS ( \
                 SELECT 1 FROM unnest(organs) AS organ WHERE organ ILIKE $2 ESCAPE '\\')) \
             ORDER BY last_updated DESC, id"
        ))
        .bind(query.blood_type.as_deref())
        .bind(query.organ_type.as_deref().map(like_fragment))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub(crate) async fn insert_donor(&self, donor: &OrganDonor) -> StoreResult<OrganDonor> {
        sqlx::query(
            "INSERT INTO organ_donors (id, name, blood_type, organs, status, contact_phone, \
             registered_at, last_updated) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(donor.id.as_uuid())
        .bind(&donor.name)
        .bind(&donor.blood_type)
        .bind(&donor.organs)
        .bind(donor.status.as_str())
        .bind(&donor.contact_phone)
        .bind(donor.registered_at)
        .bind(donor.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(donor.clone())
    }

    pub(crate) async fn update_donor_status(
        &self,
        id: DonorId,
        next: DonorStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<OrganDonor> {
        let sources: Vec<String> = DonorStatus::sources_of(next)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let row = sqlx::query_as::<_, DonorRow>(
            "UPDATE organ_donors SET status = $2, \
             last_updated = CASE WHEN status = $2 THEN last_updated ELSE $4 END \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING id, name, blood_type, organs, status, contact_phone, registered_at, \
             last_updated",
        )
        .bind(id.as_uuid())
        .bind(next.as_str())
        .bind(&sources)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return row.try_into();
        }
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM organ_donors WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        Err(match current {
            None => StoreError::not_found("organ donor", id),
            Some(from) => StoreError::InvalidTransition {
                entity: "organ donor",
                from,
                to: next.to_string(),
            },
        })
    }

    // ==================== Alerts ====================

    pub(crate) async fn alert(&self, id: AlertId) -> StoreResult<Option<Alert>> {
        let row = sqlx::query_as::<_, AlertRow>(select_alerts!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Alert::try_from).transpose()
    }

    pub(crate) async fn alerts(&self) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(select_alerts!("ORDER BY created_at DESC, id"))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    pub(crate) async fn unread_alerts(&self) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(select_alerts!(
            "WHERE NOT is_read ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub(crate) async fn insert_alert(&self, alert: &Alert) -> StoreResult<Alert> {
        sqlx::query(
            "INSERT INTO alerts (id, message, severity, is_read, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(alert.id.as_uuid())
        .bind(&alert.message)
        .bind(alert.severity.as_str())
        .bind(alert.is_read)
        .bind(alert.created_at)
        .execute(&self.pool)
        .await?;
        Ok(alert.clone())
    }

    pub(crate) async fn mark_alert_read(&self, id: AlertId) -> StoreResult<Alert> {
        let row = sqlx::query_as::<_, AlertRow>(
            "UPDATE alerts SET is_read = TRUE WHERE id = $1 \
             RETURNING id, message, severity, is_read, created_at",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Alert::try_from)
            .transpose()?
            .ok_or_else(|| StoreError::not_found("alert", id))
    }

    // ==================== Chat ====================

    pub(crate) async fn chat_messages(&self, session_id: &str) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatRow>(
            "SELECT id, session_id, message, is_user, timestamp FROM chat_messages \
             WHERE session_id = $1 ORDER BY timestamp, id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<ChatMessage> {
        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, message, is_user, timestamp) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.id.as_uuid())
        .bind(&message.session_id)
        .bind(&message.message)
        .bind(message.is_user)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(message.clone())
    }
}
