//! In-memory backend.
//!
//! Holds every table in a [`Snapshot`] behind one `parking_lot::RwLock`.
//! Filtering and ordering go through the same helpers the fallback data uses,
//! and foreign keys are checked by hand so both backends reject the same
//! writes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use medi_model::alert::sort_alerts;
use medi_model::appointment::join_details;
use medi_model::bed::{join_wards, sort_beds};
use medi_model::chat::sort_chat;
use medi_model::doctor::{in_department, sort_doctors};
use medi_model::donor::sort_donors;
use medi_model::patient::sort_patients;
use medi_model::ward::sort_wards;
use medi_model::{
    Alert, AlertId, Appointment, AppointmentDetails, AppointmentId, AppointmentQuery,
    AppointmentStatus, Bed, BedId, BedStatus, BedStatusChange, BedWithWard, ChatMessage, Doctor,
    DoctorId, DonorId, DonorQuery, DonorStatus, OrganDonor, Patient, PatientId, PatientUpdate,
    Snapshot, Ward, WardId,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Storage held in process memory. Cloning shares the tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Snapshot>>,
}

fn missing(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::MissingReference {
        reference: format!("{what} {id}"),
    }
}

fn occupied(patient_id: PatientId, bed_number: &str) -> StoreError {
    StoreError::Conflict {
        reason: format!("patient {patient_id} already occupies bed {bed_number}"),
    }
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        debug!(
            doctors = snapshot.doctors.len(),
            patients = snapshot.patients.len(),
            beds = snapshot.beds.len(),
            "seeding memory store"
        );
        Self {
            tables: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Copy out every table.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.tables.read().clone()
    }

    // ==================== Doctors ====================

    pub(crate) fn doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>> {
        Ok(self.tables.read().doctors.iter().find(|d| d.id == id).cloned())
    }

    pub(crate) fn doctors(&self) -> StoreResult<Vec<Doctor>> {
        let mut doctors = self.tables.read().doctors.clone();
        sort_doctors(&mut doctors);
        Ok(doctors)
    }

    pub(crate) fn doctors_by_department(&self, department: &str) -> StoreResult<Vec<Doctor>> {
        let keep = in_department(department);
        let mut doctors: Vec<Doctor> = self
            .tables
            .read()
            .doctors
            .iter()
            .filter(|d| keep(d))
            .cloned()
            .collect();
        sort_doctors(&mut doctors);
        Ok(doctors)
    }

    pub(crate) fn insert_doctor(&self, doctor: &Doctor) -> StoreResult<Doctor> {
        self.tables.write().doctors.push(doctor.clone());
        Ok(doctor.clone())
    }

    pub(crate) fn set_doctor_availability(&self, id: DoctorId, available: bool) -> StoreResult<Doctor> {
        let mut tables = self.tables.write();
        let doctor = tables
            .doctors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::not_found("doctor", id))?;
        doctor.available = available;
        Ok(doctor.clone())
    }

    // ==================== Patients ====================

    pub(crate) fn patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().patients.iter().find(|p| p.id == id).cloned())
    }

    pub(crate) fn patients(&self) -> StoreResult<Vec<Patient>> {
        let mut patients = self.tables.read().patients.clone();
        sort_patients(&mut patients);
        Ok(patients)
    }

    pub(crate) fn insert_patient(&self, patient: &Patient) -> StoreResult<Patient> {
        self.tables.write().patients.push(patient.clone());
        Ok(patient.clone())
    }

    pub(crate) fn update_patient(&self, id: PatientId, update: &PatientUpdate) -> StoreResult<Patient> {
        let mut tables = self.tables.write();
        let patient = tables
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("patient", id))?;
        update.apply(patient);
        Ok(patient.clone())
    }

    // ==================== Wards ====================

    pub(crate) fn ward(&self, id: WardId) -> StoreResult<Option<Ward>> {
        Ok(self.tables.read().wards.iter().find(|w| w.id == id).cloned())
    }

    pub(crate) fn wards(&self) -> StoreResult<Vec<Ward>> {
        let mut wards = self.tables.read().wards.clone();
        sort_wards(&mut wards);
        Ok(wards)
    }

    pub(crate) fn insert_ward(&self, ward: &Ward) -> StoreResult<Ward> {
        self.tables.write().wards.push(ward.clone());
        Ok(ward.clone())
    }

    // ==================== Beds ====================

    pub(crate) fn bed(&self, id: BedId) -> StoreResult<Option<Bed>> {
        Ok(self.tables.read().beds.iter().find(|b| b.id == id).cloned())
    }

    fn beds_where(&self, keep: impl Fn(&Bed) -> bool) -> Vec<Bed> {
        let mut beds: Vec<Bed> = self
            .tables
            .read()
            .beds
            .iter()
            .filter(|b| keep(b))
            .cloned()
            .collect();
        sort_beds(&mut beds);
        beds
    }

    pub(crate) fn beds(&self) -> StoreResult<Vec<Bed>> {
        Ok(self.beds_where(|_| true))
    }

    pub(crate) fn beds_by_ward(&self, ward_id: WardId) -> StoreResult<Vec<Bed>> {
        Ok(self.beds_where(|b| b.ward_id == ward_id))
    }

    pub(crate) fn beds_by_status(&self, status: BedStatus) -> StoreResult<Vec<Bed>> {
        Ok(self.beds_where(|b| b.status == status))
    }

    pub(crate) fn beds_with_ward(&self) -> StoreResult<Vec<BedWithWard>> {
        let tables = self.tables.read();
        Ok(join_wards(&tables.beds, &tables.wards))
    }

    pub(crate) fn insert_bed(&self, bed: &Bed) -> StoreResult<Bed> {
        let mut tables = self.tables.write();
        if !tables.wards.iter().any(|w| w.id == bed.ward_id) {
            return Err(missing("ward", bed.ward_id));
        }
        tables.beds.push(bed.clone());
        Ok(bed.clone())
    }

    pub(crate) fn update_bed_status(
        &self,
        id: BedId,
        change: &BedStatusChange,
        now: DateTime<Utc>,
    ) -> StoreResult<Bed> {
        let mut tables = self.tables.write();
        let position = tables
            .beds
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found("bed", id))?;
        if let Some(patient_id) = change.patient_id {
            if !tables.patients.iter().any(|p| p.id == patient_id) {
                return Err(missing("patient", patient_id));
            }
            if let Some(other) = tables
                .beds
                .iter()
                .find(|b| b.id != id && b.patient_id == Some(patient_id))
            {
                return Err(occupied(patient_id, &other.bed_number));
            }
        }
        let bed = &mut tables.beds[position];
        bed.apply(change, now);
        Ok(bed.clone())
    }

    // ==================== Appointments ====================

    pub(crate) fn appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>> {
        Ok(self.tables.read().appointments.iter().find(|a| a.id == id).cloned())
    }

    pub(crate) fn appointments_matching(&self, query: &AppointmentQuery) -> StoreResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .tables
            .read()
            .appointments
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        query.sort(&mut appointments);
        Ok(appointments)
    }

    pub(crate) fn appointments_with_details(&self) -> StoreResult<Vec<AppointmentDetails>> {
        let tables = self.tables.read();
        Ok(join_details(&tables.appointments, &tables.patients, &tables.doctors))
    }

    pub(crate) fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write();
        if !tables.patients.iter().any(|p| p.id == appointment.patient_id) {
            return Err(missing("patient", appointment.patient_id));
        }
        if !tables.doctors.iter().any(|d| d.id == appointment.doctor_id) {
            return Err(missing("doctor", appointment.doctor_id));
        }
        tables.appointments.push(appointment.clone());
        Ok(appointment.clone())
    }

    pub(crate) fn update_appointment_status(
        &self,
        id: AppointmentId,
        next: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        let mut tables = self.tables.write();
        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("appointment", id))?;
        if !appointment.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                entity: "appointment",
                from: appointment.status.to_string(),
                to: next.to_string(),
            });
        }
        appointment.status = next;
        Ok(appointment.clone())
    }

    // ==================== Organ donors ====================

    pub(crate) fn donor(&self, id: DonorId) -> StoreResult<Option<OrganDonor>> {
        Ok(self.tables.read().donors.iter().find(|d| d.id == id).cloned())
    }

    pub(crate) fn search_donors(&self, query: &DonorQuery) -> StoreResult<Vec<OrganDonor>> {
        let mut donors: Vec<OrganDonor> = self
            .tables
            .read()
            .donors
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        sort_donors(&mut donors);
        Ok(donors)
    }

    pub(crate) fn insert_donor(&self, donor: &OrganDonor) -> StoreResult<OrganDonor> {
        self.tables.write().donors.push(donor.clone());
        Ok(donor.clone())
    }

    pub(crate) fn update_donor_status(
        &self,
        id: DonorId,
        next: DonorStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<OrganDonor> {
        let mut tables = self.tables.write();
        let donor = tables
            .donors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::not_found("organ donor", id))?;
        if !donor.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                entity: "organ donor",
                from: donor.status.to_string(),
                to: next.to_string(),
            });
        }
        if donor.status != next {
            donor.status = next;
            donor.last_updated = now;
        }
        Ok(donor.clone())
    }

    // ==================== Alerts ====================

    pub(crate) fn alert(&self, id: AlertId) -> StoreResult<Option<Alert>> {
        Ok(self.tables.read().alerts.iter().find(|a| a.id == id).cloned())
    }

    fn alerts_where(&self, keep: impl Fn(&Alert) -> bool) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .tables
            .read()
            .alerts
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        sort_alerts(&mut alerts);
        alerts
    }

    pub(crate) fn alerts(&self) -> StoreResult<Vec<Alert>> {
        Ok(self.alerts_where(|_| true))
    }

    pub(crate) fn unread_alerts(&self) -> StoreResult<Vec<Alert>> {
        Ok(self.alerts_where(|a| !a.is_read))
    }

    pub(crate) fn insert_alert(&self, alert: &Alert) -> StoreResult<Alert> {
        self.tables.write().alerts.push(alert.clone());
        Ok(alert.clone())
    }

    pub(crate) fn mark_alert_read(&self, id: AlertId) -> StoreResult<Alert> {
        let mut tables = self.tables.write();
        let alert = tables
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("alert", id))?;
        alert.is_read = true;
        Ok(alert.clone())
    }

    // ==================== Chat ====================

    pub(crate) fn chat_messages(&self, session_id: &str) -> StoreResult<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self
            .tables
            .read()
            .chat_messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        sort_chat(&mut messages);
        Ok(messages)
    }

    pub(crate) fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<ChatMessage> {
        self.tables.write().chat_messages.push(message.clone());
        Ok(message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medi_model::{NewBed, NewPatient, NewWard};
    use proptest::prelude::*;

    fn seeded(occupancy: &[(bool, bool)]) -> MemoryStore {
        let store = MemoryStore::new();
        let ward = NewWard {
            name: "General Ward".into(),
            department: "General Medicine".into(),
            capacity: 20,
        }
        .into_ward(WardId::from_u128(1), DateTime::UNIX_EPOCH);
        store.insert_ward(&ward).unwrap();

        for (n, (occupied, critical)) in occupancy.iter().enumerate() {
            let id = BedId::from_u128(n as u128 + 1);
            let bed = NewBed {
                ward_id: ward.id,
                bed_number: format!("{n:03}"),
                equipment: Vec::new(),
                notes: None,
            }
            .into_bed(id, DateTime::UNIX_EPOCH);
            store.insert_bed(&bed).unwrap();
            if *occupied {
                let patient = NewPatient {
                    first_name: "Patient".into(),
                    last_name: format!("{n:03}"),
                    ..NewPatient::default()
                }
                .into_patient(PatientId::from_u128(n as u128 + 1), DateTime::UNIX_EPOCH);
                store.insert_patient(&patient).unwrap();
                let change = BedStatusChange::occupy(patient.id, *critical);
                store.update_bed_status(id, &change, DateTime::UNIX_EPOCH).unwrap();
            }
        }
        store
    }

    #[test]
    fn test_missing_patient_leaves_bed_unchanged() {
        let store = seeded(&[(false, false)]);
        let id = BedId::from_u128(1);
        let change = BedStatusChange::occupy(PatientId::from_u128(99), false);
        let err = store.update_bed_status(id, &change, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { .. }));
        assert_eq!(store.bed(id).unwrap().unwrap().status, BedStatus::Available);
    }

    #[test]
    fn test_second_bed_for_patient_conflicts() {
        let store = seeded(&[(true, false), (false, false)]);
        let change = BedStatusChange::occupy(PatientId::from_u128(1), false);
        let err = store
            .update_bed_status(BedId::from_u128(2), &change, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(err.to_string(), format!("conflict: patient {} already occupies bed 000", PatientId::from_u128(1)));
        assert_eq!(store.bed(BedId::from_u128(2)).unwrap().unwrap().status, BedStatus::Available);
    }

    #[test]
    fn test_snapshot_roundtrip_shares_nothing() {
        let store = seeded(&[(true, false)]);
        let copy = store.snapshot();
        store.tables.write().beds.clear();
        assert_eq!(copy.beds.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_statuses_partition_beds(occupancy in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..24)) {
            let store = seeded(&occupancy);
            let available = store.beds_by_status(BedStatus::Available).unwrap();
            let occupied = store.beds_by_status(BedStatus::Occupied).unwrap();
            let all = store.beds().unwrap();
            prop_assert_eq!(available.len() + occupied.len(), all.len());
            prop_assert_eq!(occupied.len(), occupancy.iter().filter(|(o, _)| *o).count());
        }
    }
}
