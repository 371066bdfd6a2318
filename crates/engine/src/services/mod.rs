//! Orchestration services: the per-actor registries and the request
//! pipeline the conversation manager is wired from.

pub mod actor_locks;
pub mod context_cache;
pub mod cooldown;
pub mod pipeline;
pub mod timeout;

pub use actor_locks::ActorLockRegistry;
pub use context_cache::{ContextField, ContextSnapshotCache};
pub use cooldown::CooldownGate;
pub use pipeline::{
    DispatchOutcome, DispatchRequest, PipelineConfig, PipelineError, RequestPipeline,
};
pub use timeout::ConversationTimeouts;
