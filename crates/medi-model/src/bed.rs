//! Beds, their occupancy state, and the bed/ward join.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::{BedId, PatientId, WardId};
use crate::validation::{optional_long_text, require_text};
use crate::ward::Ward;

/// Occupancy state of a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedStatus {
    /// Free for a new admission.
    Available,
    /// Assigned to a patient.
    Occupied,
}

impl BedStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 2] = [Self::Available, Self::Occupied];

    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
        }
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BedStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStatus {
                kind: "bed",
                value: s.to_string(),
            })
    }
}

/// A hospital bed.
///
/// `patient_id` is present exactly when the bed is occupied, and `critical`
/// can only be set on an occupied bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    /// Bed ID.
    pub id: BedId,
    /// Ward the bed belongs to.
    pub ward_id: WardId,
    /// Bed label, e.g. "ICU-1".
    pub bed_number: String,
    /// Occupancy state.
    pub status: BedStatus,
    /// Occupant needs critical/ICU-level care.
    pub critical: bool,
    /// Occupying patient.
    pub patient_id: Option<PatientId>,
    /// Equipment attached to the bed.
    pub equipment: Vec<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Last time the occupancy changed.
    pub last_updated: DateTime<Utc>,
}

impl Bed {
    /// True if the bed is assigned to a patient.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.status == BedStatus::Occupied
    }

    /// Apply a validated status change.
    pub fn apply(&mut self, change: &BedStatusChange, now: DateTime<Utc>) {
        self.status = change.status;
        self.patient_id = change.patient_id;
        self.critical = change.critical;
        self.last_updated = now;
    }
}

/// Payload for adding a bed to a ward. New beds start available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBed {
    /// Ward to add the bed to.
    pub ward_id: WardId,
    /// Bed label.
    pub bed_number: String,
    /// Attached equipment.
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBed {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("bedNumber", &self.bed_number)?;
        for item in &self.equipment {
            require_text("equipment", item)?;
        }
        optional_long_text("notes", self.notes.as_deref())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_bed(self, id: BedId, now: DateTime<Utc>) -> Bed {
        Bed {
            id,
            ward_id: self.ward_id,
            bed_number: self.bed_number,
            status: BedStatus::Available,
            critical: false,
            patient_id: None,
            equipment: self.equipment,
            notes: self.notes,
            last_updated: now,
        }
    }
}

/// Body of `PATCH /api/beds/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedStatusChange {
    /// Target status.
    pub status: BedStatus,
    /// Patient to place in the bed; required for `occupied`.
    #[serde(default)]
    pub patient_id: Option<PatientId>,
    /// Mark the occupant as critical.
    #[serde(default)]
    pub critical: bool,
}

impl BedStatusChange {
    /// Free the bed.
    #[must_use]
    pub const fn release() -> Self {
        Self {
            status: BedStatus::Available,
            patient_id: None,
            critical: false,
        }
    }

    /// Place a patient in the bed.
    #[must_use]
    pub const fn occupy(patient_id: PatientId, critical: bool) -> Self {
        Self {
            status: BedStatus::Occupied,
            patient_id: Some(patient_id),
            critical,
        }
    }

    /// Enforce the occupancy invariant.
    pub fn validate(&self) -> ModelResult<()> {
        match (self.status, self.patient_id) {
            (BedStatus::Occupied, None) => Err(ModelError::validation(
                "patientId",
                "an occupied bed needs a patient",
            )),
            (BedStatus::Available, Some(_)) => Err(ModelError::validation(
                "patientId",
                "an available bed cannot hold a patient",
            )),
            (BedStatus::Available, None) if self.critical => Err(ModelError::validation(
                "critical",
                "only an occupied bed can be critical",
            )),
            _ => Ok(()),
        }
    }
}

/// A bed together with the ward it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedWithWard {
    /// The bed.
    #[serde(flatten)]
    pub bed: Bed,
    /// Its ward.
    pub ward: Ward,
}

/// Sort beds by bed number (byte order), ties by id.
pub fn sort_beds(beds: &mut [Bed]) {
    beds.sort_by(|a, b| a.bed_number.cmp(&b.bed_number).then(a.id.cmp(&b.id)));
}

/// Inner-join beds to their wards, ordered by ward name then bed number.
#[must_use]
pub fn join_wards(beds: &[Bed], wards: &[Ward]) -> Vec<BedWithWard> {
    let mut joined: Vec<BedWithWard> = beds
        .iter()
        .filter_map(|bed| {
            wards.iter().find(|w| w.id == bed.ward_id).map(|ward| BedWithWard {
                bed: bed.clone(),
                ward: ward.clone(),
            })
        })
        .collect();
    joined.sort_by(|a, b| {
        a.ward
            .name
            .to_lowercase()
            .cmp(&b.ward.name.to_lowercase())
            .then_with(|| a.bed.bed_number.cmp(&b.bed.bed_number))
            .then(a.bed.id.cmp(&b.bed.id))
    });
    joined
}
