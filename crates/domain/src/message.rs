//! Conversation message types
//!
//! A conversation's history is an ordered sequence of [`ChatMessage`]s. The
//! sequence is sent verbatim to the completion service as turn history, so
//! insertion order is load-bearing and messages are immutable once appended.

use serde::{Deserialize, Serialize};

/// Who produced a message in the conversation history.
///
/// Serialized with lowercase names because the wire format for the
/// completion service expects `system` / `user` / `assistant` verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona and scene framing, always the first message of a history
    System,
    /// The human actor's side of the exchange
    User,
    /// The NPC's side of the exchange
    Assistant,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Whether this is the leading system message of a history.
    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}
