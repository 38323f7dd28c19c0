//! # medi-assistant
//!
//! The dashboard's chatbot. [`Assistant`] talks to an OpenAI-compatible
//! chat-completions service when an API key is configured; the [`canned`]
//! module holds the answers served when it is not, or when a call fails.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod canned;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{Assistant, RemoteAssistant};
pub use config::AssistantConfig;
pub use error::{AssistantError, AssistantResult};
pub use types::{ChatReply, SymptomAnalysis, Urgency};
