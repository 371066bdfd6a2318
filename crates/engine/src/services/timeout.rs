//! Inactivity timeout scheduler.
//!
//! One deferred teardown task per actor. Arming replaces any live timer
//! (never accumulates), cancelling is safe when idle, and a timer that
//! fires runs its action exactly once. Per actor the state machine is
//! Idle -> Armed -> (Fired | Canceled).

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use parleyr_domain::ActorId;

struct TimerSlot {
    /// Identity of the live timer; a stale task whose generation no
    /// longer matches must not fire.
    generation: u64,
    /// Present once the task is spawned and registered; `None` for the
    /// brief window between publishing the slot and spawning.
    handle: Option<JoinHandle<()>>,
}

/// Deferred per-actor timers driving inactivity teardown.
#[derive(Default)]
pub struct ConversationTimeouts {
    timers: Arc<DashMap<ActorId, TimerSlot>>,
    generation: AtomicU64,
}

impl ConversationTimeouts {
    pub fn new() -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Arm (or re-arm) the actor's timer; `on_fire` runs after `after`
    /// unless the timer is cancelled or replaced first.
    ///
    /// Replace semantics: the previous timer for the actor, if any, is
    /// invalidated before the new one exists, so two live timers for one
    /// actor can never coexist.
    pub fn arm<F>(&self, actor: ActorId, after: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // Publish the slot before spawning so even a zero-duration timer
        // finds its own registration when it wakes.
        if let Some(old) = self.timers.insert(
            actor,
            TimerSlot {
                generation,
                handle: None,
            },
        ) {
            if let Some(handle) = old.handle {
                handle.abort();
            }
        }

        let timers = Arc::clone(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Fire only while still the live timer for this actor. The
            // removal doubles as the Armed -> Fired transition, so a
            // concurrent cancel can win the race but never interrupt a
            // teardown that already started.
            if timers
                .remove_if(&actor, |_, slot| slot.generation == generation)
                .is_some()
            {
                on_fire.await;
            }
        });

        if let Some(mut slot) = self.timers.get_mut(&actor) {
            if slot.generation == generation {
                slot.handle = Some(handle);
            } else {
                // Superseded while spawning; this generation can never
                // fire, so the sleeper can be reaped early.
                handle.abort();
            }
        }
        // Slot absent: the timer fired or was cancelled already. Leave
        // the task alone; its generation check has already resolved.
    }

    /// Cancel the actor's timer. Safe to call when none is armed.
    ///
    /// Returns true if a live timer was cancelled.
    pub fn cancel(&self, actor: ActorId) -> bool {
        if let Some((_, slot)) = self.timers.remove(&actor) {
            if let Some(handle) = slot.handle {
                handle.abort();
            }
            true
        } else {
            false
        }
    }

    /// Number of currently armed timers, across all actors.
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }
}
