//! Typed identifiers for every stored entity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Create a new random `", stringify!($name), "`.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Parse a `", stringify!($name), "` from its string form.")]
            ///
            /// # Errors
            ///
            /// Returns [`ModelError::InvalidId`] if the string is not a UUID.
            pub fn parse(s: &str) -> ModelResult<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ModelError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }

            /// Wrap a known UUID. Used for fixture data with stable ids.
            #[must_use]
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a doctor.
    DoctorId,
    "doctor"
);
entity_id!(
    /// Identifier of a patient.
    PatientId,
    "patient"
);
entity_id!(
    /// Identifier of a ward.
    WardId,
    "ward"
);
entity_id!(
    /// Identifier of a bed.
    BedId,
    "bed"
);
entity_id!(
    /// Identifier of an appointment.
    AppointmentId,
    "appointment"
);
entity_id!(
    /// Identifier of an organ donor record.
    DonorId,
    "organ donor"
);
entity_id!(
    /// Identifier of an alert.
    AlertId,
    "alert"
);
entity_id!(
    /// Identifier of a stored chat message.
    ChatMessageId,
    "chat message"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let id = BedId::new();
        let parsed = BedId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = WardId::from_u128(7);
        let parsed = WardId::parse(&format!("  {id} ")).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = DoctorId::parse("dr-house").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidId {
                kind: "doctor",
                value: "dr-house".to_string()
            }
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = AlertId::from_u128(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
