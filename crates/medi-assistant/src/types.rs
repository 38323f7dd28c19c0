//! Assistant answers as sent to the dashboard.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chatbot answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text.
    pub message: String,
    /// When the reply was produced.
    pub timestamp: DateTime<Utc>,
}

impl ChatReply {
    /// A reply stamped now.
    #[must_use]
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// How soon the patient should be seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Seek emergency care now.
    Emergency,
    /// See a doctor soon.
    Urgent,
    /// Routine follow-up.
    NonUrgent,
}

impl Urgency {
    /// Returns the urgency as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::NonUrgent => "non_urgent",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A preliminary read of reported symptoms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    /// Likely explanation.
    pub diagnosis: String,
    /// Suggested next steps.
    pub recommendations: Vec<String>,
    /// How soon to act.
    pub urgency: Urgency,
}
