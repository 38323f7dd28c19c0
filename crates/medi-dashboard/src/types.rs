//! Response and event types for the dashboard API.

use medi_model::{Alert, Appointment, Bed, BedStatus, DonorStatus, OrganDonor};
use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Beds with status available.
    pub available_beds: usize,
    /// Beds with status occupied.
    pub occupied_beds: usize,
    /// All beds.
    pub total_beds: usize,
    /// Appointments starting today (UTC).
    pub today_appointments: usize,
    /// Donors with status available.
    pub active_donors: usize,
    /// Beds flagged critical.
    pub emergency_cases: usize,
    /// Alerts not yet read.
    pub unread_alerts: usize,
}

impl DashboardStats {
    /// Count everything from already-fetched rows.
    ///
    /// The live path and the fallback path both go through here, so the two
    /// can only differ in their inputs.
    #[must_use]
    pub fn tally(
        beds: &[Bed],
        today_appointments: &[Appointment],
        donors: &[OrganDonor],
        unread_alerts: &[Alert],
    ) -> Self {
        let count_beds = |status: BedStatus| beds.iter().filter(|b| b.status == status).count();
        Self {
            available_beds: count_beds(BedStatus::Available),
            occupied_beds: count_beds(BedStatus::Occupied),
            total_beds: beds.len(),
            today_appointments: today_appointments.len(),
            active_donors: donors
                .iter()
                .filter(|d| d.status == DonorStatus::Available)
                .count(),
            emergency_cases: beds.iter().filter(|b| b.critical).count(),
            unread_alerts: unread_alerts.iter().filter(|a| !a.is_read).count(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Whether a storage backend was configured at startup.
    pub storage_available: bool,
    /// Which backend answers requests.
    pub storage_backend: String,
    /// Whether the chat assistant has an upstream service.
    pub assistant_configured: bool,
    /// Open WebSocket connections.
    pub ws_connections: usize,
}

/// Real-time update pushed to every WebSocket viewer.
///
/// Serialized as `{"type": "<event>", "data": <record>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LiveUpdate {
    /// A bed was occupied or released.
    BedStatusUpdate(Bed),

    /// An appointment was booked.
    NewAppointment(Appointment),

    /// An appointment moved to a new status.
    AppointmentStatusUpdate(Appointment),

    /// A donor was registered.
    NewDonor(OrganDonor),

    /// A donor moved to a new status.
    DonorStatusUpdate(OrganDonor),

    /// An alert was raised.
    NewAlert(Alert),
}

impl LiveUpdate {
    /// The `type` tag this update carries on the wire.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::BedStatusUpdate(_) => "bedStatusUpdate",
            Self::NewAppointment(_) => "newAppointment",
            Self::AppointmentStatusUpdate(_) => "appointmentStatusUpdate",
            Self::NewDonor(_) => "newDonor",
            Self::DonorStatusUpdate(_) => "donorStatusUpdate",
            Self::NewAlert(_) => "newAlert",
        }
    }
}
