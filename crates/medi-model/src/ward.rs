//! Hospital wards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::WardId;
use crate::validation::require_text;

/// Upper bound on beds per ward; anything larger is a typo.
pub const MAX_WARD_CAPACITY: u32 = 10_000;

/// A ward grouping a set of beds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    /// Ward ID.
    pub id: WardId,
    /// Ward name, e.g. "ICU".
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Number of beds the ward is planned for.
    pub capacity: u32,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a ward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWard {
    /// Ward name.
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Planned number of beds.
    pub capacity: u32,
}

impl NewWard {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("name", &self.name)?;
        require_text("department", &self.department)?;
        if self.capacity == 0 || self.capacity > MAX_WARD_CAPACITY {
            return Err(ModelError::validation(
                "capacity",
                format!("must be between 1 and {MAX_WARD_CAPACITY}"),
            ));
        }
        Ok(())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_ward(self, id: WardId, created_at: DateTime<Utc>) -> Ward {
        Ward {
            id,
            name: self.name,
            department: self.department,
            capacity: self.capacity,
            created_at,
        }
    }
}

/// Sort wards by name (case-insensitive), ties by id.
pub fn sort_wards(wards: &mut [Ward]) {
    wards.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, false ; "zero")]
    #[test_case(1, true ; "one")]
    #[test_case(MAX_WARD_CAPACITY, true ; "at limit")]
    #[test_case(MAX_WARD_CAPACITY + 1, false ; "over limit")]
    fn test_capacity_bounds(capacity: u32, ok: bool) {
        let ward = NewWard {
            name: "ICU".into(),
            department: "Critical Care".into(),
            capacity,
        };
        assert_eq!(ward.validate().is_ok(), ok);
    }
}
