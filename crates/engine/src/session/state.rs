//! Per-actor conversation state and history management.

use chrono::{DateTime, Utc};

use parleyr_domain::{ChatMessage, NpcProfile};

/// An active conversation between one actor and one NPC.
///
/// The history always starts with the system message seeded at
/// conversation start and grows in user/assistant pairs. Messages are
/// immutable once appended; the sequence is sent verbatim to the
/// completion service as turn history.
#[derive(Debug, Clone)]
pub struct ConversationState {
    npc: NpcProfile,
    history: Vec<ChatMessage>,
    /// Maximum number of messages (system message included) to keep
    max_history_len: usize,
    started_at: DateTime<Utc>,
}

impl ConversationState {
    /// Create a new conversation seeded with its system message.
    pub fn new(
        npc: NpcProfile,
        system_message: ChatMessage,
        max_history_len: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            npc,
            history: vec![system_message],
            max_history_len,
            started_at,
        }
    }

    pub fn npc(&self) -> &NpcProfile {
        &self.npc
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Clone the history for use outside the store's per-key lock.
    pub fn history_snapshot(&self) -> Vec<ChatMessage> {
        self.history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Replace the history wholesale with an already-trimmed sequence
    /// produced by a completed dispatch.
    pub fn replace_history(&mut self, history: Vec<ChatMessage>) {
        self.history = history;
    }

    /// Append one user/assistant exchange, trimming per the cap.
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        append_exchange(&mut self.history, user, assistant, self.max_history_len);
    }
}

/// Append a user/assistant exchange to `history` and trim to `max_len`.
///
/// Eviction removes the oldest user/assistant pair, never the leading
/// system message, so the persona framing survives arbitrarily long
/// conversations.
pub fn append_exchange(
    history: &mut Vec<ChatMessage>,
    user: ChatMessage,
    assistant: ChatMessage,
    max_len: usize,
) {
    history.push(user);
    history.push(assistant);
    while history.len() > max_len && history.len() > 3 {
        // Indices 1 and 2 are the oldest pair after the system message
        history.drain(1..3);
    }
}
