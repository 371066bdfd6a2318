//! Wire and collaborator-facing types for port operations.
//!
//! # Architectural Note
//!
//! These types intentionally include serde derives. They exist to be
//! serialized across the completion and persistence boundaries;
//! serialization is intrinsic to their purpose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parleyr_domain::{ActorId, ChatMessage, RequestKind};

/// A point-in-time bundle of world/actor facts used to ground a reply.
///
/// Shared read-only across concurrent lookups for the same actor within
/// its TTL window; recomputed and replaced wholesale after expiry, never
/// mutated field-by-field in place.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    /// Environment description (time of day, surroundings, nearby entities)
    pub environment: String,
    /// Description of the actor as the NPC perceives them
    pub actor: String,
    /// Description of the NPC who is replying
    pub npc: String,
    /// What kind of completion this snapshot was assembled for
    pub request_kind: RequestKind,
    /// Derived running summary patched in by collaborators, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// When the snapshot was captured (drives the cache TTL)
    pub captured_at: DateTime<Utc>,
}

/// Outbound payload for the remote completion service.
///
/// Serialized as-is: the field names below are the wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub context: ContextSnapshot,
    pub message: String,
    /// Sent verbatim as turn history; ordering is load-bearing
    pub conversation_history: Vec<ChatMessage>,
    pub request_type: RequestKind,
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Successful completion service response.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionReply {
    pub output: String,
}

/// One persisted line of a conversation, handed to the persistence
/// collaborator fire-and-forget.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationRecord {
    pub actor: ActorId,
    pub npc_name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub from_npc: bool,
}
