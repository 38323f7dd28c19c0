//! A complete, self-consistent copy of every table.

use serde::{Deserialize, Serialize};

use crate::{Alert, Appointment, Bed, ChatMessage, Doctor, OrganDonor, Patient, Ward};

/// Every table at one point in time.
///
/// Used to seed the in-memory backend and to hold the fallback data set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Doctors.
    pub doctors: Vec<Doctor>,
    /// Patients.
    pub patients: Vec<Patient>,
    /// Wards.
    pub wards: Vec<Ward>,
    /// Beds.
    pub beds: Vec<Bed>,
    /// Appointments.
    pub appointments: Vec<Appointment>,
    /// Organ donors.
    pub donors: Vec<OrganDonor>,
    /// Alerts.
    pub alerts: Vec<Alert>,
    /// Chat history.
    pub chat_messages: Vec<ChatMessage>,
}

impl Snapshot {
    /// Check that every foreign key resolves and every bed respects the
    /// occupancy rule. Returns the first problem found.
    pub fn check_references(&self) -> Result<(), String> {
        for bed in &self.beds {
            if !self.wards.iter().any(|w| w.id == bed.ward_id) {
                return Err(format!("bed {} references unknown ward {}", bed.id, bed.ward_id));
            }
            if let Some(patient_id) = bed.patient_id {
                if !self.patients.iter().any(|p| p.id == patient_id) {
                    return Err(format!("bed {} references unknown patient {patient_id}", bed.id));
                }
            }
            if bed.is_occupied() != bed.patient_id.is_some() || (bed.critical && !bed.is_occupied()) {
                return Err(format!("bed {} violates the occupancy rule", bed.id));
            }
        }
        for appointment in &self.appointments {
            if !self.patients.iter().any(|p| p.id == appointment.patient_id) {
                return Err(format!("appointment {} references unknown patient", appointment.id));
            }
            if !self.doctors.iter().any(|d| d.id == appointment.doctor_id) {
                return Err(format!("appointment {} references unknown doctor", appointment.id));
            }
        }
        Ok(())
    }
}
