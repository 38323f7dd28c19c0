//! The organ donor registry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::DonorId;
use crate::validation::{optional_text, require_blood_type, require_text};

/// Registry state of a donor.
///
/// `pending → available → matched`, with `pending → matched` allowed;
/// `matched` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorStatus {
    /// Registered, screening not complete.
    Pending,
    /// Cleared and available for matching.
    Available,
    /// Matched to a recipient.
    Matched,
}

impl DonorStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Available, Self::Matched];

    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Matched => "matched",
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _)
                | (Self::Available, Self::Available | Self::Matched)
                | (Self::Matched, Self::Matched)
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
}

impl fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonorStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStatus {
                kind: "donor",
                value: s.to_string(),
            })
    }
}

/// A registered organ donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganDonor {
    /// Donor ID.
    pub id: DonorId,
    /// Donor name.
    pub name: String,
    /// Blood group, canonical spelling.
    pub blood_type: String,
    /// Organs the donor is registered for.
    pub organs: Vec<String>,
    /// Registry state.
    pub status: DonorStatus,
    /// Contact phone number.
    pub contact_phone: Option<String>,
    /// When the donor registered.
    pub registered_at: DateTime<Utc>,
    /// Last status change.
    pub last_updated: DateTime<Utc>,
}

/// Payload for registering a donor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonor {
    /// Donor name.
    pub name: String,
    /// Blood group.
    pub blood_type: String,
    /// Organs offered.
    pub organs: Vec<String>,
    /// Initial status; defaults to `available`. Cannot be `matched`.
    #[serde(default)]
    pub status: Option<DonorStatus>,
    /// Contact phone number.
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl NewDonor {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("name", &self.name)?;
        require_blood_type("bloodType", &self.blood_type)?;
        if self.organs.is_empty() {
            return Err(ModelError::validation("organs", "at least one organ is required"));
        }
        for organ in &self.organs {
            require_text("organs", organ)?;
        }
        if self.status == Some(DonorStatus::Matched) {
            return Err(ModelError::validation(
                "status",
                "a new donor cannot start as matched",
            ));
        }
        optional_text("contactPhone", self.contact_phone.as_deref())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_donor(self, id: DonorId, now: DateTime<Utc>) -> OrganDonor {
        OrganDonor {
            id,
            name: self.name,
            blood_type: self.blood_type,
            organs: self.organs,
            status: self.status.unwrap_or(DonorStatus::Available),
            contact_phone: self.contact_phone,
            registered_at: now,
            last_updated: now,
        }
    }
}

/// Body of `PATCH /api/organ-donors/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DonorStatusChange {
    /// Target status.
    pub status: DonorStatus,
}

/// Donor search criteria.
///
/// Blood type matches exactly and case-sensitively. Organ matches any
/// registered organ by case-insensitive substring. Blank criteria are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorQuery {
    /// Exact blood group.
    #[serde(default)]
    pub blood_type: Option<String>,
    /// Organ name fragment.
    #[serde(default)]
    pub organ_type: Option<String>,
}

impl DonorQuery {
    /// Build a query from optional criteria.
    #[must_use]
    pub fn new(blood_type: Option<&str>, organ_type: Option<&str>) -> Self {
        Self {
            blood_type: blood_type.map(str::to_string),
            organ_type: organ_type.map(str::to_string),
        }
        .normalized()
    }

    /// Drop blank criteria and trim the organ fragment.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            blood_type: self.blood_type.filter(|b| !b.trim().is_empty()),
            organ_type: self
                .organ_type
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty()),
        }
    }

    /// Whether `donor` satisfies the query.
    #[must_use]
    pub fn matches(&self, donor: &OrganDonor) -> bool {
        let blood_ok = self
            .blood_type
            .as_deref()
            .is_none_or(|blood| donor.blood_type == blood);
        let organ_ok = self.organ_type.as_deref().is_none_or(|fragment| {
            let fragment = fragment.to_lowercase();
            donor
                .organs
                .iter()
                .any(|organ| organ.to_lowercase().contains(&fragment))
        });
        blood_ok && organ_ok
    }
}

/// Sort donors most recently updated first, ties by id.
pub fn sort_donors(donors: &mut [OrganDonor]) {
    donors.sort_by(|a, b| b.last_updated.cmp(&a.last_updated).then(a.id.cmp(&b.id)));
}
