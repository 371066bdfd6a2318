//! Per-actor request mutex registry.
//!
//! Guarantees at most one in-flight completion request per actor: a second
//! dispatch for the same actor waits on the same mutex instead of being
//! rejected, since it represents the same user waiting for their own
//! answer to return.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use parleyr_domain::ActorId;

/// Lazily-created binary lock per actor.
#[derive(Default)]
pub struct ActorLockRegistry {
    locks: DashMap<ActorId, Arc<Mutex<()>>>,
}

impl ActorLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the actor's request slot, creating it on first use.
    ///
    /// Creation is insert-if-absent: concurrent first-use from different
    /// tasks resolves to a single shared mutex. The wait is unbounded.
    pub async fn lock(&self, actor: ActorId) -> OwnedMutexGuard<()> {
        let slot = {
            let entry = self
                .locks
                .entry(actor)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        slot.lock_owned().await
    }

    /// Drop the actor's slot entirely.
    ///
    /// Only safe once the actor's session is gone for good (disconnect):
    /// discarding while a waiter still holds the old `Arc` would let a
    /// fresh mutex coexist with it and break the one-in-flight guarantee.
    pub fn discard(&self, actor: ActorId) {
        self.locks.remove(&actor);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
