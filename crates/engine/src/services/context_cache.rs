//! Context snapshot cache.
//!
//! Produces the time-boxed, read-mostly bundle of world/actor facts that
//! grounds prompt assembly. Snapshots are shared as `Arc`s across
//! concurrent lookups within their TTL window and replaced wholesale on
//! recompute or patch; nothing ever mutates a published snapshot in place.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use dashmap::DashMap;

use parleyr_domain::{ActorId, NpcProfile, RequestKind};

use crate::infrastructure::ports::{ClockPort, ContextSnapshot, WorldStatePort};

/// Snapshot fields a collaborator may patch after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    Environment,
    Actor,
    Npc,
    /// Derived running summary of the conversation so far
    Summary,
}

/// TTL cache of per-actor context snapshots.
pub struct ContextSnapshotCache {
    world: Arc<dyn WorldStatePort>,
    clock: Arc<dyn ClockPort>,
    ttl: TimeDelta,
    snapshots: DashMap<ActorId, Arc<ContextSnapshot>>,
}

impl ContextSnapshotCache {
    pub fn new(world: Arc<dyn WorldStatePort>, clock: Arc<dyn ClockPort>, ttl: Duration) -> Self {
        Self {
            world,
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            snapshots: DashMap::new(),
        }
    }

    /// Return a fresh-enough snapshot, recomputing from the world readers
    /// when the cached one has expired or was built for another request
    /// kind.
    ///
    /// Recompute is not deduplicated across concurrent callers: the reads
    /// are idempotent, the last write wins, and duplication is bounded by
    /// the cooldown-gated call rate.
    pub fn get(
        &self,
        actor: ActorId,
        npc: &NpcProfile,
        request_kind: RequestKind,
    ) -> Arc<ContextSnapshot> {
        let now = self.clock.now();

        let mut carried_summary = None;
        if let Some(cached) = self.snapshots.get(&actor) {
            let snapshot = Arc::clone(&cached);
            drop(cached);
            if snapshot.request_kind == request_kind
                && now.signed_duration_since(snapshot.captured_at) < self.ttl
            {
                return snapshot;
            }
            // The summary is derived from the conversation, not from the
            // TTL window; carry it into the replacement.
            carried_summary = snapshot.summary.clone();
        }

        let snapshot = Arc::new(ContextSnapshot {
            environment: self.world.environment_description(actor),
            actor: self.world.actor_description(actor),
            npc: npc.persona.clone(),
            request_kind,
            summary: carried_summary,
            captured_at: now,
        });
        self.snapshots.insert(actor, Arc::clone(&snapshot));
        snapshot
    }

    /// Drop the actor's cached snapshot.
    pub fn invalidate(&self, actor: ActorId) {
        self.snapshots.remove(&actor);
    }

    /// Replace the actor's snapshot with one field updated.
    ///
    /// Runs under the key's entry lock, so concurrent patches serialize
    /// instead of clobbering each other field-by-field. Returns false if
    /// no snapshot exists to patch.
    pub fn patch(&self, actor: ActorId, field: ContextField, value: String) -> bool {
        if let Some(mut entry) = self.snapshots.get_mut(&actor) {
            let mut updated = ContextSnapshot::clone(&entry);
            match field {
                ContextField::Environment => updated.environment = value,
                ContextField::Actor => updated.actor = value,
                ContextField::Npc => updated.npc = value,
                ContextField::Summary => updated.summary = Some(value),
            }
            *entry = Arc::new(updated);
            true
        } else {
            false
        }
    }
}
