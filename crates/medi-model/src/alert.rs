//! Staff alerts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::ids::AlertId;
use crate::validation::require_text;

/// The severity level of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational, no action required.
    #[default]
    Info,
    /// Should be looked at.
    Warning,
    /// Needs immediate attention.
    Critical,
}

impl AlertSeverity {
    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = crate::error::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Info, Self::Warning, Self::Critical]
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::ModelError::UnknownStatus {
                kind: "alert severity",
                value: s.to_string(),
            })
    }
}

/// A message shown on the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert ID.
    pub id: AlertId,
    /// Alert text.
    pub message: String,
    /// Severity.
    pub severity: AlertSeverity,
    /// Whether a staff member has acknowledged it.
    pub is_read: bool,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
}

/// Payload for raising an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlert {
    /// Alert text.
    pub message: String,
    /// Severity, `info` when omitted.
    #[serde(default)]
    pub severity: AlertSeverity,
}

impl NewAlert {
    /// Validate the payload.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("message", &self.message)
    }

    /// Materialize the stored record, unread.
    #[must_use]
    pub fn into_alert(self, id: AlertId, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id,
            message: self.message,
            severity: self.severity,
            is_read: false,
            created_at,
        }
    }
}

/// Sort alerts newest first, ties by id.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
