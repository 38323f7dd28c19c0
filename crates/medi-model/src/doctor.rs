//! Doctors and their availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::ids::DoctorId;
use crate::validation::{optional_text, require_text};

/// A doctor on staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Doctor ID.
    pub id: DoctorId,
    /// Display name, e.g. "Dr. Sarah Wilson".
    pub name: String,
    /// Medical specialization.
    pub specialization: String,
    /// Hospital department the doctor belongs to.
    pub department: String,
    /// Medical license number.
    pub license_number: String,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Whether the doctor is currently taking appointments.
    pub available: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    /// Display name.
    pub name: String,
    /// Medical specialization.
    pub specialization: String,
    /// Department.
    pub department: String,
    /// Medical license number.
    pub license_number: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Initial availability (defaults to available).
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

impl NewDoctor {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("name", &self.name)?;
        require_text("specialization", &self.specialization)?;
        require_text("department", &self.department)?;
        require_text("licenseNumber", &self.license_number)?;
        optional_text("phoneNumber", self.phone_number.as_deref())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_doctor(self, id: DoctorId, created_at: DateTime<Utc>) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialization: self.specialization,
            department: self.department,
            license_number: self.license_number,
            phone_number: self.phone_number,
            available: self.available,
            created_at,
        }
    }
}

/// Body of `PATCH /api/doctors/{id}/availability`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoctorAvailabilityChange {
    /// New availability.
    pub available: bool,
}

/// Sort doctors alphabetically by name (case-insensitive), ties by id.
pub fn sort_doctors(doctors: &mut [Doctor]) {
    doctors.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
}

/// Keep doctors of exactly one department.
pub fn in_department<'a>(department: &'a str) -> impl Fn(&Doctor) -> bool + 'a {
    move |d| d.department == department
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(n: u128, name: &str, department: &str) -> Doctor {
        Doctor {
            id: DoctorId::from_u128(n),
            name: name.to_string(),
            specialization: "General".to_string(),
            department: department.to_string(),
            license_number: format!("LIC-{n}"),
            phone_number: None,
            available: true,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let mut doctors = vec![
            doctor(1, "dr. zed", "A"),
            doctor(2, "Dr. Alex Chen", "A"),
            doctor(3, "Dr. maria Garcia", "A"),
        ];
        sort_doctors(&mut doctors);
        let names: Vec<_> = doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Dr. Alex Chen", "Dr. maria Garcia", "dr. zed"]);
    }

    #[test]
    fn test_department_filter_is_exact() {
        let doctors = [doctor(1, "A", "Cardiology"), doctor(2, "B", "cardiology")];
        let matched: Vec<_> = doctors.iter().filter(|d| in_department("Cardiology")(d)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, DoctorId::from_u128(1));
    }

    #[test]
    fn test_new_doctor_defaults_available() {
        let json = r#"{"name":"Dr. A","specialization":"Neurology","department":"Neuro","licenseNumber":"L-1"}"#;
        let new: NewDoctor = serde_json::from_str(json).unwrap();
        assert!(new.available);
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_doctor_requires_license() {
        let new = NewDoctor {
            name: "Dr. A".into(),
            specialization: "Neurology".into(),
            department: "Neuro".into(),
            license_number: " ".into(),
            phone_number: None,
            available: true,
        };
        assert!(new.validate().is_err());
    }
}
