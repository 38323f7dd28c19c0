//! Fixed data served when storage cannot answer a read.
//!
//! The data set never changes: ids are fixed, timestamps sit on
//! 2024-01-15 UTC and nothing here reads the clock. It is not kept in step
//! with the database. Every function filters and orders with the same
//! `medi_model` rules the storage backends use, so a query means the same
//! thing on both paths.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use medi_model::alert::sort_alerts;
use medi_model::appointment::join_details;
use medi_model::bed::{join_wards, sort_beds};
use medi_model::doctor::{in_department, sort_doctors};
use medi_model::donor::sort_donors;
use medi_model::patient::sort_patients;
use medi_model::ward::sort_wards;
use medi_model::{
    Alert, AlertId, AlertSeverity, Appointment, AppointmentDetails, AppointmentId,
    AppointmentQuery, AppointmentStatus, Bed, BedId, BedStatus, BedWithWard, ChatMessage, Doctor,
    DoctorId, DonorId, DonorQuery, DonorStatus, OrganDonor, Patient, PatientId, Snapshot, Ward,
    WardId,
};

use crate::types::DashboardStats;

/// Seconds from the Unix epoch to 2024-01-15T00:00:00Z.
const DAY_ZERO: i64 = 1_705_276_800;

const DOCTOR: u128 = 0x1;
const PATIENT: u128 = 0x2;
const WARD: u128 = 0x3;
const BED: u128 = 0x4;
const APPOINTMENT: u128 = 0x5;
const DONOR: u128 = 0x6;
const ALERT: u128 = 0x7;

const fn key(kind: u128, n: u128) -> u128 {
    (kind << 96) | n
}

fn at(hour: i64, minute: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(DAY_ZERO + hour * 3600 + minute * 60)
}

static SNAPSHOT: LazyLock<Snapshot> = LazyLock::new(build);

/// The whole data set.
#[must_use]
pub fn snapshot() -> &'static Snapshot {
    &SNAPSHOT
}

fn build() -> Snapshot {
    let general = WardId::from_u128(key(WARD, 1));
    let icu = WardId::from_u128(key(WARD, 2));
    let pediatrics = WardId::from_u128(key(WARD, 3));

    let john = PatientId::from_u128(key(PATIENT, 1));
    let jane = PatientId::from_u128(key(PATIENT, 2));
    let mike = PatientId::from_u128(key(PATIENT, 3));

    let wilson = DoctorId::from_u128(key(DOCTOR, 1));
    let chen = DoctorId::from_u128(key(DOCTOR, 2));
    let garcia = DoctorId::from_u128(key(DOCTOR, 3));

    let doctor = |id, name: &str, field: &str, license: &str, available| Doctor {
        id,
        name: name.to_string(),
        specialization: field.to_string(),
        department: field.to_string(),
        license_number: license.to_string(),
        phone_number: None,
        available,
        created_at: at(0, 0),
    };

    let patient = |id, first: &str, last: &str, born, blood: &str, condition: &str, room: &str| {
        Patient {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: None,
            phone_number: None,
            date_of_birth: born,
            blood_type: Some(blood.to_string()),
            condition: Some(condition.to_string()),
            room: Some(room.to_string()),
            medical_history: None,
            created_at: at(0, 0),
        }
    };

    let ward = |id, name: &str, department: &str, capacity| Ward {
        id,
        name: name.to_string(),
        department: department.to_string(),
        capacity,
        created_at: at(0, 0),
    };

    let bed = |n: u128,
               ward_id,
               number: &str,
               patient_id: Option<PatientId>,
               critical,
               equipment: &[&str]| {
        Bed {
            id: BedId::from_u128(key(BED, n)),
            ward_id,
            bed_number: number.to_string(),
            status: if patient_id.is_some() {
                BedStatus::Occupied
            } else {
                BedStatus::Available
            },
            critical,
            patient_id,
            equipment: equipment.iter().map(|e| (*e).to_string()).collect(),
            notes: None,
            last_updated: at(6, 0),
        }
    };

    let appointment = |n: u128, patient_id, doctor_id, hour, minute, reason: &str| Appointment {
        id: AppointmentId::from_u128(key(APPOINTMENT, n)),
        patient_id,
        doctor_id,
        appointment_date: at(hour, minute),
        duration: 30,
        status: AppointmentStatus::Scheduled,
        reason: Some(reason.to_string()),
        notes: None,
        created_at: at(0, 0),
    };

    let donor = |n: u128, name: &str, blood: &str, organs: &[&str], status| OrganDonor {
        id: DonorId::from_u128(key(DONOR, n)),
        name: name.to_string(),
        blood_type: blood.to_string(),
        organs: organs.iter().map(|o| (*o).to_string()).collect(),
        status,
        contact_phone: None,
        registered_at: at(0, 0),
        last_updated: at(0, n as i64),
    };

    let alert = |n: u128, message: &str, severity, is_read, hour, minute| Alert {
        id: AlertId::from_u128(key(ALERT, n)),
        message: message.to_string(),
        severity,
        is_read,
        created_at: at(hour, minute),
    };

    Snapshot {
        doctors: vec![
            doctor(wilson, "Dr. Sarah Wilson", "Cardiology", "MD-1001", true),
            doctor(chen, "Dr. Alex Chen", "Neurology", "MD-1002", true),
            doctor(garcia, "Dr. Maria Garcia", "Pediatrics", "MD-1003", false),
        ],
        patients: vec![
            patient(john, "John", "Doe", NaiveDate::from_ymd_opt(1978, 5, 2), "A+", "Stable", "101"),
            patient(jane, "Jane", "Smith", NaiveDate::from_ymd_opt(1991, 9, 14), "O-", "Recovering", "102"),
            patient(mike, "Mike", "Johnson", NaiveDate::from_ymd_opt(1955, 11, 23), "B+", "Critical", "ICU-1"),
        ],
        wards: vec![
            ward(general, "General Ward", "General Medicine", 20),
            ward(icu, "ICU", "Critical Care", 8),
            ward(pediatrics, "Pediatrics", "Pediatrics", 12),
        ],
        beds: vec![
            bed(1, general, "101", None, false, &["Monitor"]),
            bed(2, general, "102", Some(jane), false, &["Monitor", "IV Pump"]),
            bed(3, icu, "ICU-1", Some(mike), true, &["Ventilator", "Cardiac Monitor"]),
            bed(4, icu, "ICU-2", None, false, &["Ventilator", "Cardiac Monitor"]),
        ],
        appointments: vec![
            appointment(1, john, wilson, 10, 0, "Cardiology follow-up"),
            appointment(2, jane, chen, 11, 30, "Neurology consultation"),
        ],
        donors: vec![
            donor(1, "Robert Brown", "O+", &["Kidney"], DonorStatus::Available),
            donor(2, "Lisa Wang", "A-", &["Liver", "Cornea"], DonorStatus::Pending),
        ],
        alerts: vec![
            alert(1, "Patient in room 102 needs attention", AlertSeverity::Warning, false, 9, 15),
            alert(2, "ICU bed available", AlertSeverity::Info, true, 7, 45),
        ],
        chat_messages: Vec::new(),
    }
}

// ==================== Doctors ====================

/// All doctors, by name.
#[must_use]
pub fn doctors() -> Vec<Doctor> {
    let mut doctors = SNAPSHOT.doctors.clone();
    sort_doctors(&mut doctors);
    doctors
}

/// One doctor.
#[must_use]
pub fn doctor(id: DoctorId) -> Option<Doctor> {
    SNAPSHOT.doctors.iter().find(|d| d.id == id).cloned()
}

/// Doctors in `department`, by name.
#[must_use]
pub fn doctors_by_department(department: &str) -> Vec<Doctor> {
    let in_dept = in_department(department);
    let mut doctors: Vec<Doctor> = SNAPSHOT
        .doctors
        .iter()
        .filter(|d| in_dept(*d))
        .cloned()
        .collect();
    sort_doctors(&mut doctors);
    doctors
}

// ==================== Patients ====================

/// All patients, by last then first name.
#[must_use]
pub fn patients() -> Vec<Patient> {
    let mut patients = SNAPSHOT.patients.clone();
    sort_patients(&mut patients);
    patients
}

/// One patient.
#[must_use]
pub fn patient(id: PatientId) -> Option<Patient> {
    SNAPSHOT.patients.iter().find(|p| p.id == id).cloned()
}

// ==================== Wards and beds ====================

/// All wards, by name.
#[must_use]
pub fn wards() -> Vec<Ward> {
    let mut wards = SNAPSHOT.wards.clone();
    sort_wards(&mut wards);
    wards
}

/// One ward.
#[must_use]
pub fn ward(id: WardId) -> Option<Ward> {
    SNAPSHOT.wards.iter().find(|w| w.id == id).cloned()
}

fn beds_where(keep: impl Fn(&Bed) -> bool) -> Vec<Bed> {
    let mut beds: Vec<Bed> = SNAPSHOT.beds.iter().filter(|b| keep(*b)).cloned().collect();
    sort_beds(&mut beds);
    beds
}

/// All beds, by bed number.
#[must_use]
pub fn beds() -> Vec<Bed> {
    beds_where(|_| true)
}

/// One bed.
#[must_use]
pub fn bed(id: BedId) -> Option<Bed> {
    SNAPSHOT.beds.iter().find(|b| b.id == id).cloned()
}

/// Beds in one ward.
#[must_use]
pub fn beds_by_ward(ward_id: WardId) -> Vec<Bed> {
    beds_where(|b| b.ward_id == ward_id)
}

/// Beds with one status.
#[must_use]
pub fn beds_by_status(status: BedStatus) -> Vec<Bed> {
    beds_where(|b| b.status == status)
}

/// Beds joined to their wards, by ward name then bed number.
#[must_use]
pub fn beds_with_ward() -> Vec<BedWithWard> {
    join_wards(&SNAPSHOT.beds, &SNAPSHOT.wards)
}

// ==================== Appointments ====================

/// Appointments matching `query`, ordered the way the query presents them.
#[must_use]
pub fn appointments_matching(query: AppointmentQuery) -> Vec<Appointment> {
    let mut appointments: Vec<Appointment> = SNAPSHOT
        .appointments
        .iter()
        .filter(|a| query.matches(a))
        .cloned()
        .collect();
    query.sort(&mut appointments);
    appointments
}

/// One appointment.
#[must_use]
pub fn appointment(id: AppointmentId) -> Option<Appointment> {
    SNAPSHOT.appointments.iter().find(|a| a.id == id).cloned()
}

/// Appointments with patient and doctor inlined, most recent first.
#[must_use]
pub fn appointments_with_details() -> Vec<AppointmentDetails> {
    join_details(&SNAPSHOT.appointments, &SNAPSHOT.patients, &SNAPSHOT.doctors)
}

// ==================== Donors ====================

/// Donors matching `query`, most recently updated first.
#[must_use]
pub fn donors(query: &DonorQuery) -> Vec<OrganDonor> {
    let mut donors: Vec<OrganDonor> = SNAPSHOT
        .donors
        .iter()
        .filter(|d| query.matches(d))
        .cloned()
        .collect();
    sort_donors(&mut donors);
    donors
}

/// One donor.
#[must_use]
pub fn donor(id: DonorId) -> Option<OrganDonor> {
    SNAPSHOT.donors.iter().find(|d| d.id == id).cloned()
}

// ==================== Alerts ====================

/// All alerts, newest first.
#[must_use]
pub fn alerts() -> Vec<Alert> {
    let mut alerts = SNAPSHOT.alerts.clone();
    sort_alerts(&mut alerts);
    alerts
}

/// Unread alerts, newest first.
#[must_use]
pub fn unread_alerts() -> Vec<Alert> {
    alerts().into_iter().filter(|a| !a.is_read).collect()
}

/// One alert.
#[must_use]
pub fn alert(id: AlertId) -> Option<Alert> {
    SNAPSHOT.alerts.iter().find(|a| a.id == id).cloned()
}

// ==================== Chat and stats ====================

/// Chat history is never invented.
#[must_use]
pub fn chat_messages(_session_id: &str) -> Vec<ChatMessage> {
    Vec::new()
}

/// Headline numbers computed from the data set, with `today` deciding which
/// appointments count.
#[must_use]
pub fn stats(today: NaiveDate) -> DashboardStats {
    DashboardStats::tally(
        &SNAPSHOT.beds,
        &appointments_matching(AppointmentQuery::on(today)),
        &SNAPSHOT.donors,
        &unread_alerts(),
    )
}
