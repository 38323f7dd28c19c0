//! Offline answers used when the completion service is unavailable.

use crate::types::{ChatReply, SymptomAnalysis, Urgency};

const GREETING: &str = "Hello! How can I assist you with medical information today?";
const DEFAULT_REPLY: &str = "I understand you're asking about medical services. \
                             Please contact our staff for detailed medical advice.";

/// Canned replies keyed by the whole message, lowercased.
const REPLIES: [(&str, &str); 7] = [
    ("hello", GREETING),
    ("hi", GREETING),
    (
        "appointment",
        "To book an appointment, please visit the appointments section.",
    ),
    (
        "doctor",
        "Our doctors are available. Check the doctors section for details.",
    ),
    (
        "emergency",
        "For emergencies, please call 911 or visit the nearest emergency room.",
    ),
    (
        "bed",
        "Current bed availability: 2 general beds and 1 ICU bed available.",
    ),
    ("patient", "We have 3 patients currently admitted."),
];

/// The canned reply text for `message`.
///
/// Matches the whole message case-insensitively; anything else gets the
/// default reply.
#[must_use]
pub fn reply_text(message: &str) -> &'static str {
    let key = message.trim().to_lowercase();
    REPLIES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(DEFAULT_REPLY, |(_, reply)| reply)
}

/// The canned reply for `message`, stamped now.
#[must_use]
pub fn reply(message: &str) -> ChatReply {
    ChatReply::now(reply_text(message))
}

/// The conservative analysis returned when none can be computed.
#[must_use]
pub fn fallback_analysis() -> SymptomAnalysis {
    SymptomAnalysis {
        diagnosis: "Please consult with a healthcare professional for accurate diagnosis"
            .to_string(),
        recommendations: vec![
            "Rest well".to_string(),
            "Stay hydrated".to_string(),
            "Monitor symptoms".to_string(),
        ],
        urgency: Urgency::NonUrgent,
    }
}
