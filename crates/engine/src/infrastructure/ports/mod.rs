//! Ports: the interface boundary between the orchestration core and its
//! external collaborators.

mod error;
mod external;
mod types;

pub use error::CompletionError;
pub use external::{
    ClockPort, CompletionPort, ConversationLogPort, TranslationPort, WorldStatePort,
};
pub use types::{
    CompletionReply, CompletionRequest, ContextSnapshot, ConversationRecord,
};

#[cfg(test)]
pub use external::{
    MockCompletionPort, MockConversationLogPort, MockTranslationPort, MockWorldStatePort,
};
