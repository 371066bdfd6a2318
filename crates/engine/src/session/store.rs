//! Conversation state store.
//!
//! One [`ConversationState`] per actor, at most. Store membership is the
//! active flag: a conversation exists exactly while its state is present,
//! and removal is teardown. Every access is a per-key atomic operation;
//! no caller ever holds a lock across the whole store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use parleyr_domain::{ActorId, ChatMessage};

use super::state::ConversationState;

/// Shared store mapping actors to their active conversation.
#[derive(Default)]
pub struct ConversationStore {
    states: DashMap<ActorId, ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Insert a conversation if none exists for the actor.
    ///
    /// Returns false (leaving the existing state untouched) when one is
    /// already present. This is the single point that enforces
    /// at-most-one-conversation-per-actor.
    pub fn insert_if_absent(&self, actor: ActorId, state: ConversationState) -> bool {
        match self.states.entry(actor) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(state);
                true
            }
        }
    }

    /// Remove and return the actor's conversation, if any.
    pub fn remove(&self, actor: ActorId) -> Option<ConversationState> {
        self.states.remove(&actor).map(|(_, state)| state)
    }

    pub fn is_active(&self, actor: ActorId) -> bool {
        self.states.contains_key(&actor)
    }

    /// Run a read against the actor's state under its key lock.
    ///
    /// The closure must stay short and must not await: it runs while the
    /// key's shard is held.
    pub fn read<R>(&self, actor: ActorId, f: impl FnOnce(&ConversationState) -> R) -> Option<R> {
        self.states.get(&actor).map(|state| f(&state))
    }

    /// Run a mutation against the actor's state under its key lock.
    ///
    /// Returns `None` when the conversation no longer exists, which is how
    /// a completion that raced a teardown learns to discard its result.
    /// Same discipline as [`Self::read`]: short, no awaiting.
    pub fn mutate<R>(
        &self,
        actor: ActorId,
        f: impl FnOnce(&mut ConversationState) -> R,
    ) -> Option<R> {
        self.states.get_mut(&actor).map(|mut state| f(&mut state))
    }

    /// Clone the actor's history, or `None` if no conversation exists.
    pub fn history_snapshot(&self, actor: ActorId) -> Option<Vec<ChatMessage>> {
        self.read(actor, |state| state.history_snapshot())
    }

    pub fn active_count(&self) -> usize {
        self.states.len()
    }
}
