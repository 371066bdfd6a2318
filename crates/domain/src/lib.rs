//! Parleyr domain types.
//!
//! Pure value objects shared by the orchestration engine and its
//! collaborators: strongly-typed IDs, conversation messages, NPC profiles,
//! and lifecycle enums. No I/O, no async, no ambient state.

pub mod conversation;
pub mod ids;
pub mod message;
pub mod npc;

pub use conversation::{EndReason, RequestKind};
pub use ids::{ActorId, NpcId};
pub use message::{ChatMessage, MessageRole};
pub use npc::NpcProfile;
