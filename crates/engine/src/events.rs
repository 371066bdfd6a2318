//! Outward notifications.
//!
//! The engine narrates conversation lifecycle to presentation
//! collaborators (chat echo, visual feedback, error cues) through a
//! best-effort sink. Emission never blocks and never fails the
//! conversation flow.

use serde::Serialize;
use tokio::sync::mpsc;

use parleyr_domain::{ActorId, EndReason};

/// Everything the engine announces to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ConversationStarted {
        actor: ActorId,
        npc_name: String,
    },
    /// The actor's accepted message, echoed back for display
    ActorMessageEchoed {
        actor: ActorId,
        text: String,
    },
    NpcReplied {
        actor: ActorId,
        npc_name: String,
        text: String,
    },
    /// A completion call failed; the conversation is being torn down
    ConversationFailed {
        actor: ActorId,
        detail: String,
    },
    ConversationEnded {
        actor: ActorId,
        reason: EndReason,
    },
    VisualFeedbackStarted {
        actor: ActorId,
    },
    VisualFeedbackStopped {
        actor: ActorId,
    },
}

/// Best-effort event consumer.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Implementations log failures and move on;
    /// nothing here may break the conversation flow.
    fn emit(&self, event: EngineEvent);
}

/// Sink backed by an unbounded channel, for embedding applications that
/// drain events from their own dispatch loop (and for tests).
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!(error = %e, "event receiver gone, dropping notification");
        }
    }
}
