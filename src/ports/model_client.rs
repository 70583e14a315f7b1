//! Model provider port definition.

use std::time::Duration;

use serde::Serialize;

use crate::domain::ModelCallError;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat-style request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Request for a single structured completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Provider model identifier.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Transport-level timeout. The stage executor enforces its own deadline too.
    pub timeout: Duration,
}

/// Port for model provider calls.
///
/// Implementations are shared across concurrent runs behind an `Arc`, so they
/// must not hold per-run state.
pub trait ModelClient: Send + Sync {
    /// Perform one completion and return the raw response text.
    fn complete(&self, request: ChatRequest) -> Result<String, ModelCallError>;
}
