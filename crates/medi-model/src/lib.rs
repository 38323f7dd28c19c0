//! # medi-model
//!
//! Domain types for the MediConnect hospital dashboard.
//!
//! Everything here is plain data plus the rules that travel with it: typed
//! ids, status enums and their legal transitions, create/update payloads with
//! validation, query filters, and the canonical ordering of each list. Both
//! storage backends and the fallback data set are built on these, so a filter
//! means the same thing whichever path answers a request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alert;
pub mod appointment;
pub mod bed;
pub mod chat;
pub mod doctor;
pub mod donor;
pub mod error;
pub mod ids;
pub mod patient;
pub mod snapshot;
pub mod validation;
pub mod ward;

pub use alert::{Alert, AlertSeverity, NewAlert};
pub use appointment::{
    Appointment, AppointmentDetails, AppointmentQuery, AppointmentStatus,
    AppointmentStatusChange, NewAppointment,
};
pub use bed::{Bed, BedStatus, BedStatusChange, BedWithWard, NewBed};
pub use chat::{ChatMessage, NewChatMessage};
pub use doctor::{Doctor, DoctorAvailabilityChange, NewDoctor};
pub use donor::{DonorQuery, DonorStatus, DonorStatusChange, NewDonor, OrganDonor};
pub use error::{ModelError, ModelResult};
pub use ids::{AlertId, AppointmentId, BedId, ChatMessageId, DoctorId, DonorId, PatientId, WardId};
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use snapshot::Snapshot;
pub use ward::{NewWard, Ward};
