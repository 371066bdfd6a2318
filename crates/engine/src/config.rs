//! Engine configuration.
//!
//! Loaded from the process environment; every knob has a
//! `PARLEYR_`-prefixed variable. Values that fail to parse fall back to
//! their defaults rather than aborting startup.

use std::str::FromStr;
use std::time::Duration;

/// Completion service parameters.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    /// Base URL of the completion service
    pub base_url: String,
    /// Provider identifier forwarded verbatim in the payload
    pub provider: String,
    /// Model identifier forwarded verbatim in the payload
    pub model: String,
    pub max_tokens: u32,
    /// Per-request timeout; completions can be slow
    pub request_timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            request_timeout_secs: 60,
        }
    }
}

/// Conversation lifecycle limits.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Maximum messages kept per conversation, system message included.
    /// One system message plus N user/assistant pairs, so an odd cap
    /// trims to exactly this length.
    pub max_history_len: usize,
    /// Minimum characters for a message to be processed
    pub min_message_len: usize,
    /// Minimum spacing between accepted messages from one actor
    pub cooldown: Duration,
    /// Inactivity window after which a conversation is torn down
    pub idle_timeout: Duration,
    /// How long a context snapshot stays fresh
    pub context_ttl: Duration,
    /// Replies at least this long are handed to the persistence collaborator
    pub min_persisted_reply_len: usize,
    /// Walking further than this from the NPC ends the conversation
    pub max_conversation_distance: f32,
    /// Delivered when the completion body is unreadable
    pub fallback_reply: String,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_history_len: 21,
            min_message_len: 2,
            cooldown: Duration::from_millis(3000),
            idle_timeout: Duration::from_secs(120),
            context_ttl: Duration::from_secs(30),
            min_persisted_reply_len: 20,
            max_conversation_distance: 10.0,
            fallback_reply: "Hm. Give me a moment to gather my thoughts.".to_string(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub completion: CompletionSettings,
    pub conversation: ConversationSettings,
}

impl EngineConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let completion_defaults = CompletionSettings::default();
        let conversation_defaults = ConversationSettings::default();

        Self {
            completion: CompletionSettings {
                base_url: env_string("COMPLETION_BASE_URL", &completion_defaults.base_url),
                provider: env_string("PARLEYR_PROVIDER", &completion_defaults.provider),
                model: env_string("PARLEYR_MODEL", &completion_defaults.model),
                max_tokens: env_parse("PARLEYR_MAX_TOKENS", completion_defaults.max_tokens),
                request_timeout_secs: env_parse(
                    "PARLEYR_REQUEST_TIMEOUT_SECS",
                    completion_defaults.request_timeout_secs,
                ),
            },
            conversation: ConversationSettings {
                max_history_len: env_parse(
                    "PARLEYR_MAX_HISTORY_LEN",
                    conversation_defaults.max_history_len,
                ),
                min_message_len: env_parse(
                    "PARLEYR_MIN_MESSAGE_LEN",
                    conversation_defaults.min_message_len,
                ),
                cooldown: Duration::from_millis(env_parse(
                    "PARLEYR_COOLDOWN_MS",
                    conversation_defaults.cooldown.as_millis() as u64,
                )),
                idle_timeout: Duration::from_secs(env_parse(
                    "PARLEYR_IDLE_TIMEOUT_SECS",
                    conversation_defaults.idle_timeout.as_secs(),
                )),
                context_ttl: Duration::from_secs(env_parse(
                    "PARLEYR_CONTEXT_TTL_SECS",
                    conversation_defaults.context_ttl.as_secs(),
                )),
                min_persisted_reply_len: env_parse(
                    "PARLEYR_MIN_PERSISTED_REPLY_LEN",
                    conversation_defaults.min_persisted_reply_len,
                ),
                max_conversation_distance: env_parse(
                    "PARLEYR_MAX_CONVERSATION_DISTANCE",
                    conversation_defaults.max_conversation_distance,
                ),
                fallback_reply: env_string(
                    "PARLEYR_FALLBACK_REPLY",
                    &conversation_defaults.fallback_reply,
                ),
            },
        }
    }

    /// Load `.env` if present, then read configuration from the
    /// environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_history_cap_is_system_plus_pairs() {
        let config = ConversationSettings::default();
        // An odd cap: one system message plus whole user/assistant pairs
        assert_eq!(config.max_history_len % 2, 1);
    }

    #[test]
    fn test_defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.conversation.cooldown >= Duration::from_millis(1000));
        assert!(config.conversation.idle_timeout > config.conversation.cooldown);
        assert!(config.completion.max_tokens > 0);
        assert!(!config.conversation.fallback_reply.is_empty());
    }

    #[test]
    fn test_env_parse_ignores_garbage() {
        std::env::set_var("PARLEYR_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse("PARLEYR_TEST_GARBAGE", 42u32), 42);
        std::env::remove_var("PARLEYR_TEST_GARBAGE");
    }
}
