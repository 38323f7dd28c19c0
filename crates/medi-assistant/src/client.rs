//! Client for an OpenAI-compatible chat-completions endpoint.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::error::{AssistantError, AssistantResult};
use crate::types::{ChatReply, SymptomAnalysis};

const CHAT_PROMPT: &str = "You are the help desk assistant of a hospital. Answer questions \
about appointments, doctors, bed availability and hospital services briefly and politely. \
Do not give a diagnosis; for medical concerns advise speaking to staff, and for emergencies \
tell the user to call emergency services.";

const SYMPTOM_PROMPT: &str = "You triage reported symptoms for hospital staff. Reply with a \
JSON object with exactly these fields: \"diagnosis\" (a short, cautious preliminary \
assessment), \"recommendations\" (an array of short next steps) and \"urgency\" (one of \
\"emergency\", \"urgent\", \"non_urgent\").";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// A configured connection to the completion service.
#[derive(Debug, Clone)]
pub struct RemoteAssistant {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl RemoteAssistant {
    async fn complete(&self, system: &str, user: &str, json: bool) -> AssistantResult<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            response_format: json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "assistant returned an error status");
            return Err(AssistantError::Status {
                status: status.as_u16(),
            });
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AssistantError::InvalidResponse {
                reason: "no completion in response".to_string(),
            })
    }
}

/// The chat assistant: remote when configured, otherwise offline.
#[derive(Debug, Clone)]
pub enum Assistant {
    /// Answers come from the completion service.
    Remote(RemoteAssistant),
    /// No service configured; every call fails with
    /// [`AssistantError::NotConfigured`].
    Offline,
}

impl Assistant {
    /// Build the assistant. No API key means [`Assistant::Offline`].
    pub fn from_config(config: &AssistantConfig) -> AssistantResult<Self> {
        let Some(api_key) = config.key() else {
            debug!("no assistant api key, running offline");
            return Ok(Self::Offline);
        };
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self::Remote(RemoteAssistant {
            http,
            endpoint,
            api_key: api_key.to_string(),
            model: config.model.clone(),
        }))
    }

    /// True if a completion service is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    fn remote(&self) -> AssistantResult<&RemoteAssistant> {
        match self {
            Self::Remote(remote) => Ok(remote),
            Self::Offline => Err(AssistantError::NotConfigured),
        }
    }

    /// Answer a chat message.
    pub async fn process_message(&self, text: &str) -> AssistantResult<ChatReply> {
        let content = self.remote()?.complete(CHAT_PROMPT, text, false).await?;
        Ok(ChatReply::now(content.trim()))
    }

    /// Give a preliminary read of reported symptoms.
    pub async fn analyze_symptoms(&self, symptoms: &str) -> AssistantResult<SymptomAnalysis> {
        let content = self.remote()?.complete(SYMPTOM_PROMPT, symptoms, true).await?;
        let analysis: SymptomAnalysis = serde_json::from_str(content.trim())?;
        Ok(analysis)
    }
}
