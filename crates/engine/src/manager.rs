//! Conversation manager: the lifecycle owner.
//!
//! The manager is the only component that mutates conversation state. It
//! wires the per-actor registries (store, locks, cooldowns, timers,
//! context cache) to the request pipeline and narrates lifecycle
//! transitions outward. Triggering events (chat input, movement checks,
//! disconnects, completion returns) arrive on arbitrary tasks; every
//! shared mutation below goes through a per-key atomic operation.

use std::sync::{Arc, Weak};

use parleyr_domain::{ActorId, ChatMessage, EndReason, NpcProfile, RequestKind};

use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventSink};
use crate::infrastructure::ports::{
    ClockPort, CompletionPort, ContextSnapshot, ConversationLogPort, ConversationRecord,
    TranslationPort, WorldStatePort,
};
use crate::services::{
    ActorLockRegistry, ContextSnapshotCache, ConversationTimeouts, CooldownGate, DispatchRequest,
    PipelineConfig, PipelineError, RequestPipeline,
};
use crate::session::{ConversationState, ConversationStore};

/// What happened to an accepted `process_message` call.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// The NPC's (possibly translated) reply was applied and announced
    Replied(String),
    /// Consumed by the cooldown gate; deliberately no feedback
    DroppedByCooldown,
    /// The reply returned after the conversation ended and was discarded
    DiscardedInactive,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("a conversation is already active for this actor")]
    AlreadyActive,

    #[error("no active conversation for this actor")]
    NotActive,

    #[error("message is too short (minimum {min} characters)")]
    MessageTooShort { min: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Coordinates conversation lifecycle for every actor in the process.
///
/// Constructed as an `Arc`: the inactivity timers hold a weak reference
/// back to the manager so a fired timer can run the same teardown path as
/// an explicit end, without keeping the manager alive on its own.
pub struct ConversationManager {
    config: EngineConfig,
    store: ConversationStore,
    locks: Arc<ActorLockRegistry>,
    timeouts: ConversationTimeouts,
    cooldowns: CooldownGate,
    context: ContextSnapshotCache,
    pipeline: RequestPipeline,
    world: Arc<dyn WorldStatePort>,
    log: Arc<dyn ConversationLogPort>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn ClockPort>,
    self_ref: Weak<ConversationManager>,
}

impl ConversationManager {
    pub fn new(
        config: EngineConfig,
        completion: Arc<dyn CompletionPort>,
        translation: Arc<dyn TranslationPort>,
        world: Arc<dyn WorldStatePort>,
        log: Arc<dyn ConversationLogPort>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn ClockPort>,
    ) -> Arc<Self> {
        let locks = Arc::new(ActorLockRegistry::new());
        let pipeline_config = PipelineConfig {
            provider: config.completion.provider.clone(),
            model: config.completion.model.clone(),
            max_tokens: config.completion.max_tokens,
            fallback_reply: config.conversation.fallback_reply.clone(),
            max_history_len: config.conversation.max_history_len,
        };

        Arc::new_cyclic(|self_ref| Self {
            store: ConversationStore::new(),
            locks: Arc::clone(&locks),
            timeouts: ConversationTimeouts::new(),
            cooldowns: CooldownGate::new(Arc::clone(&clock)),
            context: ContextSnapshotCache::new(
                Arc::clone(&world),
                Arc::clone(&clock),
                config.conversation.context_ttl,
            ),
            pipeline: RequestPipeline::new(locks, completion, translation, pipeline_config),
            world,
            log,
            events,
            clock,
            self_ref: self_ref.clone(),
            config,
        })
    }

    /// Begin a conversation between an actor and an NPC.
    ///
    /// Fails with [`ConversationError::AlreadyActive`] if the actor is
    /// already in one. When `opener` is given, a one-shot greeting
    /// dispatch runs immediately so the NPC opens the exchange; a failed
    /// greeting tears the conversation down like any failed turn.
    pub async fn start_conversation(
        &self,
        actor: ActorId,
        npc: NpcProfile,
        opener: Option<String>,
    ) -> Result<(), ConversationError> {
        // Fast-path rejection before any cache writes; the atomic insert
        // below is what actually enforces the invariant.
        if self.store.is_active(actor) {
            return Err(ConversationError::AlreadyActive);
        }

        let snapshot = self.context.get(actor, &npc, RequestKind::Greeting);
        let state = ConversationState::new(
            npc.clone(),
            build_system_message(&npc, &snapshot),
            self.config.conversation.max_history_len,
            self.clock.now(),
        );

        if !self.store.insert_if_absent(actor, state) {
            return Err(ConversationError::AlreadyActive);
        }

        tracing::info!(actor = %actor, npc = %npc.name, "conversation started");
        self.arm_idle_timer(actor);
        self.events.emit(EngineEvent::ConversationStarted {
            actor,
            npc_name: npc.name.clone(),
        });
        self.events.emit(EngineEvent::VisualFeedbackStarted { actor });

        if let Some(opener) = opener {
            self.run_turn(actor, opener, RequestKind::Greeting).await?;
        }
        Ok(())
    }

    /// Process one chat message from the actor.
    ///
    /// Validation failures mutate nothing. A message inside the cooldown
    /// window is consumed silently; an accepted one is echoed outward,
    /// dispatched, and its reply applied if the conversation still exists
    /// when the completion returns.
    pub async fn process_message(
        &self,
        actor: ActorId,
        raw_message: &str,
    ) -> Result<MessageOutcome, ConversationError> {
        if !self.store.is_active(actor) {
            return Err(ConversationError::NotActive);
        }

        let message = raw_message.trim();
        let min = self.config.conversation.min_message_len;
        if message.chars().count() < min {
            return Err(ConversationError::MessageTooShort { min });
        }

        if !self
            .cooldowns
            .try_consume(actor, self.config.conversation.cooldown)
        {
            // Deliberately silent: consumed, no request issued, no
            // feedback to the actor.
            tracing::debug!(actor = %actor, "message dropped by cooldown gate");
            return Ok(MessageOutcome::DroppedByCooldown);
        }

        self.events.emit(EngineEvent::ActorMessageEchoed {
            actor,
            text: message.to_string(),
        });

        self.run_turn(actor, message.to_string(), RequestKind::Conversation)
            .await
    }

    /// End the actor's conversation. Idempotent: returns false when none
    /// exists. An in-flight completion for the actor is not aborted; its
    /// result will be discarded when it returns.
    pub fn end_conversation(&self, actor: ActorId, reason: EndReason) -> bool {
        // Cancel first so a timer never outlives its conversation state.
        self.timeouts.cancel(actor);

        if self.store.remove(actor).is_none() {
            return false;
        }
        self.context.invalidate(actor);

        tracing::info!(actor = %actor, reason = %reason, "conversation ended");
        self.events
            .emit(EngineEvent::ConversationEnded { actor, reason });
        self.events.emit(EngineEvent::VisualFeedbackStopped { actor });
        true
    }

    pub fn is_active(&self, actor: ActorId) -> bool {
        self.store.is_active(actor)
    }

    /// Clone the actor's conversation history, if one is active.
    pub fn history(&self, actor: ActorId) -> Option<Vec<ChatMessage>> {
        self.store.history_snapshot(actor)
    }

    pub fn active_conversations(&self) -> usize {
        self.store.active_count()
    }

    /// The context cache, exposed for collaborators that patch derived
    /// fields (e.g. a running conversation summary).
    pub fn context(&self) -> &ContextSnapshotCache {
        &self.context
    }

    /// The actor's session is gone: tear down their conversation and drop
    /// their per-actor bookkeeping. ActorIds are stable only within one
    /// session, so nothing here can be reused.
    pub fn handle_actor_disconnected(&self, actor: ActorId) {
        self.end_conversation(actor, EndReason::Disconnected);
        // Safe to discard only here: no new conversation can start for a
        // disconnected actor, so no waiter can race a fresh lock.
        self.locks.discard(actor);
        self.cooldowns.forget(actor);
    }

    /// Movement check: walking out of range ends the conversation.
    pub fn handle_actor_moved(&self, actor: ActorId, distance_from_npc: f32) {
        if !self.store.is_active(actor) {
            return;
        }
        if distance_from_npc > self.config.conversation.max_conversation_distance {
            self.end_conversation(actor, EndReason::WalkedAway);
        }
    }

    /// One completion round-trip: dispatch, then reconcile the result
    /// with whatever happened to the conversation in the meantime.
    async fn run_turn(
        &self,
        actor: ActorId,
        message: String,
        request_kind: RequestKind,
    ) -> Result<MessageOutcome, ConversationError> {
        let npc = self
            .store
            .read(actor, |state| state.npc().clone())
            .ok_or(ConversationError::NotActive)?;

        let request = DispatchRequest {
            actor,
            message,
            request_kind,
            snapshot: self.context.get(actor, &npc, request_kind),
            locale: self.world.actor_locale(actor),
        };

        let outcome = match self
            .pipeline
            .dispatch(request, || self.store.history_snapshot(actor))
            .await
        {
            Ok(outcome) => outcome,
            Err(PipelineError::InterruptedWait) => {
                tracing::debug!(actor = %actor, "conversation ended while queued, dropping turn");
                return Err(ConversationError::Pipeline(PipelineError::InterruptedWait));
            }
            Err(err) => {
                tracing::warn!(actor = %actor, error = %err, "completion failed, ending conversation");
                self.events.emit(EngineEvent::ConversationFailed {
                    actor,
                    detail: err.to_string(),
                });
                self.end_conversation(actor, EndReason::RequestFailed);
                return Err(err.into());
            }
        };

        // The completion has returned; apply it only if the conversation
        // still exists. A teardown that raced the remote call wins, and
        // the late result is discarded without resurrecting any state.
        let applied = self
            .store
            .mutate(actor, |state| {
                state.replace_history(outcome.updated_history.clone())
            })
            .is_some();
        if !applied {
            tracing::debug!(actor = %actor, "reply arrived after teardown, discarding");
            return Ok(MessageOutcome::DiscardedInactive);
        }

        self.arm_idle_timer(actor);
        self.events.emit(EngineEvent::NpcReplied {
            actor,
            npc_name: npc.name.clone(),
            text: outcome.reply_text.clone(),
        });
        self.persist_reply(actor, &npc.name, &outcome.reply_text);

        Ok(MessageOutcome::Replied(outcome.reply_text))
    }

    fn arm_idle_timer(&self, actor: ActorId) {
        let manager = self.self_ref.clone();
        self.timeouts.arm(
            actor,
            self.config.conversation.idle_timeout,
            async move {
                if let Some(manager) = manager.upgrade() {
                    tracing::info!(actor = %actor, "inactivity timeout fired");
                    manager.end_conversation(actor, EndReason::Inactivity);
                }
            },
        );
    }

    /// Hand the reply to the persistence collaborator, fire-and-forget.
    fn persist_reply(&self, actor: ActorId, npc_name: &str, text: &str) {
        if text.chars().count() < self.config.conversation.min_persisted_reply_len {
            return;
        }
        let record = ConversationRecord {
            actor,
            npc_name: npc_name.to_string(),
            text: text.to_string(),
            timestamp: self.clock.now(),
            from_npc: true,
        };
        let log = Arc::clone(&self.log);
        tokio::spawn(async move {
            if let Err(error) = log.save(&record).await {
                tracing::warn!(%error, "failed to persist conversation record");
            }
        });
    }
}

/// Seed the system message from the NPC's persona and the context
/// snapshot captured at conversation start.
fn build_system_message(npc: &NpcProfile, snapshot: &ContextSnapshot) -> ChatMessage {
    let mut prompt = format!("You are roleplaying as {}, {}.\n\n", npc.name, npc.persona);
    prompt.push_str(&format!("SURROUNDINGS: {}\n", snapshot.environment));
    prompt.push_str(&format!("SPEAKING WITH: {}\n", snapshot.actor));
    if let Some(summary) = &snapshot.summary {
        prompt.push_str(&format!("STORY SO FAR: {}\n", summary));
    }
    prompt.push_str("\nStay in character and keep replies short and conversational.");
    ChatMessage::system(prompt)
}
