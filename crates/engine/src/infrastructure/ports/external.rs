//! Port traits for external collaborators.
//!
//! The orchestration core talks to everything outside the process through
//! these traits: the remote completion service, the translation service,
//! the game world's state readers, and the persistence backend. Each is
//! specified only at its interface boundary; implementations live in
//! `infrastructure` or with the embedding application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parleyr_domain::ActorId;

use super::error::CompletionError;
use super::types::{CompletionReply, CompletionRequest, ConversationRecord};

/// Remote completion endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Perform one completion call. Blocks the calling worker until the
    /// response arrives or the transport gives up; never retried here.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionReply, CompletionError>;
}

/// Reply translation collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationPort: Send + Sync {
    /// Translate `text` into the given locale. `None` means "use the
    /// original text"; implementations swallow their own failures.
    async fn translate(&self, text: &str, target_locale: &str) -> Option<String>;
}

/// Pure world/actor state readers.
///
/// No concurrency contract beyond thread safety: these are synchronous,
/// idempotent reads of game state, called during context assembly on the
/// synchronous path.
#[cfg_attr(test, mockall::automock)]
pub trait WorldStatePort: Send + Sync {
    fn environment_description(&self, actor: ActorId) -> String;
    fn actor_description(&self, actor: ActorId) -> String;
    /// Locale tag for reply translation, if the actor has one configured.
    fn actor_locale(&self, actor: ActorId) -> Option<String>;
}

/// Persistence collaborator for conversation records.
///
/// Fire-and-forget from the core: failures are logged by the caller and
/// never propagated into the conversation flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationLogPort: Send + Sync {
    async fn save(&self, record: &ConversationRecord) -> anyhow::Result<()>;
}

/// Injectable wall clock.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
