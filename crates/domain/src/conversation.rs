//! Conversation lifecycle value objects

use serde::{Deserialize, Serialize};

/// What kind of completion a dispatch is asking for.
///
/// Serialized in SCREAMING_SNAKE_CASE because the completion service's
/// `request_type` field expects `GREETING` / `CONVERSATION` verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// One-shot opening line when a conversation starts
    Greeting,
    /// A regular conversational turn
    Conversation,
}

impl RequestKind {
    /// Greetings are one-shots: they skip per-actor reply translation.
    pub fn is_conversational(&self) -> bool {
        matches!(self, RequestKind::Conversation)
    }
}

/// Why a conversation ended.
///
/// These are teardown reasons, not failures; they travel on the
/// conversation-ended notification so presentation collaborators can react
/// appropriately (e.g. a farewell animation vs. an error cue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The actor (or an admin) explicitly ended the conversation
    Requested,
    /// The inactivity timeout fired
    Inactivity,
    /// The actor's session disconnected
    Disconnected,
    /// The actor moved out of conversational range
    WalkedAway,
    /// The remote completion call failed
    RequestFailed,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::Requested => write!(f, "requested"),
            EndReason::Inactivity => write!(f, "inactivity"),
            EndReason::Disconnected => write!(f, "disconnected"),
            EndReason::WalkedAway => write!(f, "walked_away"),
            EndReason::RequestFailed => write!(f, "request_failed"),
        }
    }
}
