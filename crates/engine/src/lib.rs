//! Parleyr Engine: conversation orchestration for NPC dialogue backed by
//! a remote completion service.
//!
//! The engine owns conversation lifecycle (start, turns, teardown),
//! serializes completion requests per actor, keeps conversational memory
//! bounded, enforces cooldowns and inactivity timeouts, and reconciles
//! in-flight completion calls with game-world events that arrive while a
//! call is outstanding. The embedding application feeds triggers in
//! through [`manager::ConversationManager`] and drains outward
//! notifications from an [`events::EventSink`].

pub mod config;
pub mod events;
pub mod infrastructure;
pub mod manager;
pub mod services;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use events::{ChannelEventSink, EngineEvent, EventSink};
pub use manager::{ConversationError, ConversationManager, MessageOutcome};

/// Install the default tracing subscriber for embedding applications that
/// do not bring their own. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parleyr_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}
