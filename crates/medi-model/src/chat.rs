//! Stored chatbot conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::ChatMessageId;
use crate::validation::{MAX_LONG_TEXT, require_text};

/// One turn of a chatbot conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID.
    pub id: ChatMessageId,
    /// Client-chosen conversation id.
    pub session_id: String,
    /// Message text.
    pub message: String,
    /// `true` for the user's turn, `false` for the assistant's.
    pub is_user: bool,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A turn to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    /// Conversation id.
    pub session_id: String,
    /// Message text.
    pub message: String,
    /// Who spoke.
    pub is_user: bool,
}

impl NewChatMessage {
    /// Validate the turn.
    pub fn validate(&self) -> ModelResult<()> {
        require_text("sessionId", &self.session_id)?;
        if self.message.trim().is_empty() {
            return Err(ModelError::validation("message", "must not be empty"));
        }
        if self.message.chars().count() > MAX_LONG_TEXT {
            return Err(ModelError::validation("message", "is too long"));
        }
        Ok(())
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_message(self, id: ChatMessageId, timestamp: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            session_id: self.session_id,
            message: self.message,
            is_user: self.is_user,
            timestamp,
        }
    }
}

/// Sort turns oldest first, ties by id.
pub fn sort_chat(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
}
