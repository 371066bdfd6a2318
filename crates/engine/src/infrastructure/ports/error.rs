//! Error types for port operations.

/// Completion service call failures.
///
/// There is no automatic retry at this layer: a broken backend ends the
/// conversation instead of leaving it silently stuck waiting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Transport-level failure (connect, DNS, timeout).
    #[error("completion service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status.
    #[error("completion service returned status {0}")]
    Status(u16),

    /// The body parsed but the expected field is missing or unreadable.
    /// Recovered upstream with a fixed fallback reply, never propagated
    /// to the actor.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Check if this error is recoverable with a fallback reply.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
