//! Chatbot handlers.
//!
//! The chat endpoints never fail because of the assistant: an offline or
//! failing completion service is answered with canned text. History is
//! best effort too; a turn that cannot be stored is logged and dropped.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use medi_assistant::{canned, ChatReply, SymptomAnalysis};
use medi_model::{ChatMessage, NewChatMessage};
use serde::Deserialize;
use tracing::{debug, warn};

use super::or_fallback;
use crate::error::{DashboardError, DashboardResult};
use crate::fallback;
use crate::state::DashboardState;

/// Body of POST /api/chatbot/message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// What the user typed.
    pub message: String,
    /// Conversation id chosen by the client.
    pub session_id: String,
}

/// Body of POST /api/chatbot/analyze-symptoms.
#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    /// Free-text description of the symptoms.
    pub symptoms: String,
}

async fn record_turn(state: &DashboardState, session_id: &str, message: &str, is_user: bool) {
    let turn = NewChatMessage {
        session_id: session_id.to_string(),
        message: message.to_string(),
        is_user,
    };
    if let Err(err) = state.storage().create_chat_message(turn).await {
        warn!(error = %err, session_id, is_user, "failed to store chat message");
    }
}

/// Handle POST /api/chatbot/message.
pub async fn send_message(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> DashboardResult<Json<ChatReply>> {
    let Json(request) = payload?;
    NewChatMessage {
        session_id: request.session_id.clone(),
        message: request.message.clone(),
        is_user: true,
    }
    .validate()?;

    record_turn(&state, &request.session_id, &request.message, true).await;

    let reply = match state.assistant().process_message(&request.message).await {
        Ok(reply) => reply,
        Err(err) => {
            debug!(error = %err, "assistant unavailable, using canned reply");
            canned::reply(&request.message)
        }
    };

    record_turn(&state, &request.session_id, &reply.message, false).await;
    Ok(Json(reply))
}

/// Handle GET /api/chatbot/messages/:session_id.
pub async fn list_messages(
    State(state): State<Arc<DashboardState>>,
    Path(session_id): Path<String>,
) -> Json<Vec<ChatMessage>> {
    Json(or_fallback(
        "chat-messages",
        state.storage().chat_messages(&session_id).await,
        || fallback::chat_messages(&session_id),
    ))
}

/// Handle POST /api/chatbot/analyze-symptoms.
pub async fn analyze_symptoms(
    State(state): State<Arc<DashboardState>>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> DashboardResult<Json<SymptomAnalysis>> {
    let Json(request) = payload?;
    if request.symptoms.trim().is_empty() {
        return Err(DashboardError::Validation(
            "symptoms: must not be empty".to_string(),
        ));
    }

    let analysis = match state.assistant().analyze_symptoms(&request.symptoms).await {
        Ok(analysis) => analysis,
        Err(err) => {
            debug!(error = %err, "assistant unavailable, using fallback analysis");
            canned::fallback_analysis()
        }
    };
    Ok(Json(analysis))
}
