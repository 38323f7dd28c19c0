//! Patients and partial updates to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::PatientId;
use crate::validation::{
    optional_email, optional_long_text, optional_text, require_blood_type, require_text,
};

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Patient ID.
    pub id: PatientId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Blood group, canonical spelling.
    pub blood_type: Option<String>,
    /// Current clinical condition, e.g. "Stable".
    pub condition: Option<String>,
    /// Room the patient is in, if admitted.
    pub room: Option<String>,
    /// Free-text medical history.
    pub medical_history: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for registering a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Date of birth.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Blood group.
    #[serde(default)]
    pub blood_type: Option<String>,
    /// Current condition.
    #[serde(default)]
    pub condition: Option<String>,
    /// Room.
    #[serde(default)]
    pub room: Option<String>,
    /// Medical history.
    #[serde(default)]
    pub medical_history: Option<String>,
}

impl NewPatient {
    /// Validate the payload.
    pub fn validate(&self, today: NaiveDate) -> ModelResult<()> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        validate_details(
            self.email.as_deref(),
            self.phone_number.as_deref(),
            self.date_of_birth,
            self.blood_type.as_deref(),
            self.condition.as_deref(),
            self.room.as_deref(),
            self.medical_history.as_deref(),
            today,
        )
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_patient(self, id: PatientId, created_at: DateTime<Utc>) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            date_of_birth: self.date_of_birth,
            blood_type: self.blood_type,
            condition: self.condition,
            room: self.room,
            medical_history: self.medical_history,
            created_at,
        }
    }
}

/// Partial update of a patient. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    /// New given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// New e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// New date of birth.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// New blood group.
    #[serde(default)]
    pub blood_type: Option<String>,
    /// New condition.
    #[serde(default)]
    pub condition: Option<String>,
    /// New room.
    #[serde(default)]
    pub room: Option<String>,
    /// New medical history.
    #[serde(default)]
    pub medical_history: Option<String>,
}

impl PatientUpdate {
    /// True when the update carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.date_of_birth.is_none()
            && self.blood_type.is_none()
            && self.condition.is_none()
            && self.room.is_none()
            && self.medical_history.is_none()
    }

    /// Validate the fields that are present.
    pub fn validate(&self, today: NaiveDate) -> ModelResult<()> {
        if self.is_empty() {
            return Err(ModelError::validation("body", "no fields to update"));
        }
        if let Some(first) = &self.first_name {
            require_text("firstName", first)?;
        }
        if let Some(last) = &self.last_name {
            require_text("lastName", last)?;
        }
        validate_details(
            self.email.as_deref(),
            self.phone_number.as_deref(),
            self.date_of_birth,
            self.blood_type.as_deref(),
            self.condition.as_deref(),
            self.room.as_deref(),
            self.medical_history.as_deref(),
            today,
        )
    }

    /// Apply the present fields to a patient.
    pub fn apply(&self, patient: &mut Patient) {
        if let Some(v) = &self.first_name {
            patient.first_name.clone_from(v);
        }
        if let Some(v) = &self.last_name {
            patient.last_name.clone_from(v);
        }
        if let Some(v) = &self.email {
            patient.email = Some(v.clone());
        }
        if let Some(v) = &self.phone_number {
            patient.phone_number = Some(v.clone());
        }
        if let Some(v) = self.date_of_birth {
            patient.date_of_birth = Some(v);
        }
        if let Some(v) = &self.blood_type {
            patient.blood_type = Some(v.clone());
        }
        if let Some(v) = &self.condition {
            patient.condition = Some(v.clone());
        }
        if let Some(v) = &self.room {
            patient.room = Some(v.clone());
        }
        if let Some(v) = &self.medical_history {
            patient.medical_history = Some(v.clone());
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_details(
    email: Option<&str>,
    phone_number: Option<&str>,
    date_of_birth: Option<NaiveDate>,
    blood_type: Option<&str>,
    condition: Option<&str>,
    room: Option<&str>,
    medical_history: Option<&str>,
    today: NaiveDate,
) -> ModelResult<()> {
    optional_email("email", email)?;
    optional_text("phoneNumber", phone_number)?;
    if let Some(dob) = date_of_birth {
        if dob > today {
            return Err(ModelError::validation("dateOfBirth", "is in the future"));
        }
    }
    if let Some(blood) = blood_type {
        require_blood_type("bloodType", blood)?;
    }
    optional_text("condition", condition)?;
    optional_text("room", room)?;
    optional_long_text("medicalHistory", medical_history)
}

/// Sort patients by last name, then first name (case-insensitive), ties by id.
pub fn sort_patients(patients: &mut [Patient]) {
    patients.sort_by(|a, b| {
        a.last_name
            .to_lowercase()
            .cmp(&b.last_name.to_lowercase())
            .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
            .then(a.id.cmp(&b.id))
    });
}
