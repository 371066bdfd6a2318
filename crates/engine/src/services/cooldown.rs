//! Cooldown gate: minimum spacing between accepted messages per actor.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use parleyr_domain::ActorId;

use crate::infrastructure::ports::ClockPort;

/// Rate limiter over the actor's last accepted-message timestamp.
///
/// Single-field compare-and-set per actor: the check and the conditional
/// write happen under the key's entry lock. Exact tie ordering between
/// simultaneous calls for one actor is not load-bearing, because input
/// arrives from one client connection.
pub struct CooldownGate {
    clock: Arc<dyn ClockPort>,
    last_accepted: DashMap<ActorId, DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            last_accepted: DashMap::new(),
        }
    }

    /// Accept the message and record `now`, or reject it untouched.
    ///
    /// Returns false when the actor's last accepted message is within
    /// `cooldown`; the stored timestamp is not updated in that case, so a
    /// burst of rejected messages does not extend the window.
    pub fn try_consume(&self, actor: ActorId, cooldown: Duration) -> bool {
        let now = self.clock.now();
        let window = TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX);

        match self.last_accepted.entry(actor) {
            Entry::Occupied(mut entry) => {
                if now.signed_duration_since(*entry.get()) < window {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        }
    }

    /// Forget the actor's record (used when their session goes away).
    pub fn forget(&self, actor: ActorId) {
        self.last_accepted.remove(&actor);
    }
}
