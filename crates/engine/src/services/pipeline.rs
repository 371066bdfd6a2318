//! Request pipeline: one completion round-trip, behind the actor's mutex.

use std::sync::Arc;

use parleyr_domain::{ActorId, ChatMessage, RequestKind};

use crate::infrastructure::ports::{
    CompletionError, CompletionPort, CompletionRequest, ContextSnapshot, TranslationPort,
};
use crate::session::append_exchange;

use super::actor_locks::ActorLockRegistry;

/// Provider parameters and conversation limits for outbound dispatches.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    /// Delivered when the service answers 200 with an unreadable body;
    /// a conversational reply must always be deliverable.
    pub fallback_reply: String,
    pub max_history_len: usize,
}

/// One dispatch worth of inputs.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub actor: ActorId,
    pub message: String,
    pub request_kind: RequestKind,
    pub snapshot: Arc<ContextSnapshot>,
    /// Target locale for reply translation, if the actor has one
    pub locale: Option<String>,
}

/// The finalized result of a dispatch: the reply to announce and the
/// history to install, tagged with what kind of request produced them.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub reply_text: String,
    pub updated_history: Vec<ChatMessage>,
    pub request_kind: RequestKind,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("completion service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("completion service returned status {0}")]
    RemoteError(u16),

    /// The conversation ended while this call was queued on the actor's
    /// request slot; nothing was sent and nothing was mutated.
    #[error("conversation ended while waiting for the actor's request slot")]
    InterruptedWait,
}

/// Composes context, history and the new message into a completion call
/// and feeds the finalized reply back to the caller.
pub struct RequestPipeline {
    locks: Arc<ActorLockRegistry>,
    completion: Arc<dyn CompletionPort>,
    translation: Arc<dyn TranslationPort>,
    config: PipelineConfig,
}

impl RequestPipeline {
    pub fn new(
        locks: Arc<ActorLockRegistry>,
        completion: Arc<dyn CompletionPort>,
        translation: Arc<dyn TranslationPort>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            locks,
            completion,
            translation,
            config,
        }
    }

    /// Run one completion round-trip for the actor.
    ///
    /// `history_source` is evaluated after the actor's request slot is
    /// acquired, so a call that queued behind another sees the exchange
    /// its predecessor appended rather than a stale snapshot; a source
    /// that reports the conversation gone maps to
    /// [`PipelineError::InterruptedWait`].
    pub async fn dispatch<H>(
        &self,
        request: DispatchRequest,
        history_source: H,
    ) -> Result<DispatchOutcome, PipelineError>
    where
        H: FnOnce() -> Option<Vec<ChatMessage>> + Send,
    {
        // One in-flight request per actor. A second call for the same
        // actor waits here rather than failing: it is the same user
        // waiting for their own answer to come back. The guard releases
        // on every exit path below.
        let _slot = self.locks.lock(request.actor).await;

        let history = history_source().ok_or(PipelineError::InterruptedWait)?;

        let outbound = CompletionRequest {
            context: ContextSnapshot::clone(&request.snapshot),
            message: request.message.clone(),
            conversation_history: history.clone(),
            request_type: request.request_kind,
            provider: self.config.provider.clone(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
        };

        // Remote call; failures are terminal for this call, never retried.
        let reply = match self.completion.complete(outbound).await {
            Ok(reply) => reply.output,
            Err(CompletionError::Malformed(detail)) => {
                tracing::warn!(
                    actor = %request.actor,
                    %detail,
                    "malformed completion response, delivering fallback reply"
                );
                self.config.fallback_reply.clone()
            }
            Err(CompletionError::Unavailable(detail)) => {
                return Err(PipelineError::RemoteUnavailable(detail));
            }
            Err(CompletionError::Status(code)) => {
                return Err(PipelineError::RemoteError(code));
            }
        };

        // Conversational turns are translated into the actor's locale;
        // greetings are one-shots and skip this. Translation failure
        // degrades to the untranslated reply.
        let reply = match (&request.locale, request.request_kind.is_conversational()) {
            (Some(locale), true) => self
                .translation
                .translate(&reply, locale)
                .await
                .unwrap_or(reply),
            _ => reply,
        };

        let mut updated_history = history;
        append_exchange(
            &mut updated_history,
            ChatMessage::user(request.message),
            ChatMessage::assistant(reply.clone()),
            self.config.max_history_len,
        );

        Ok(DispatchOutcome {
            reply_text: reply,
            updated_history,
            request_kind: request.request_kind,
        })
    }
}
