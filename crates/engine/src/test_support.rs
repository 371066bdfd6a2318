//! Shared test fixtures: deterministic clocks and scripted collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Notify;

use parleyr_domain::ActorId;

use crate::infrastructure::ports::{
    ClockPort, CompletionError, CompletionPort, CompletionReply, CompletionRequest,
    ConversationLogPort, ConversationRecord, TranslationPort, WorldStatePort,
};

/// Clock whose time only moves when the test advances it.
pub(crate) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("lock");
        *now = *now + TimeDelta::from_std(by).expect("duration");
    }
}

impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("lock")
    }
}

/// Completion stub with a scripted reply queue.
///
/// Records every request it receives, tracks how many calls overlap, and
/// can be gated or delayed to hold a call in flight while the test
/// exercises a race.
pub(crate) struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<CompletionReply, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedCompletion {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn push_ok(&self, output: &str) {
        self.replies.lock().expect("lock").push_back(Ok(CompletionReply {
            output: output.to_string(),
        }));
    }

    pub(crate) fn push_err(&self, error: CompletionError) {
        self.replies.lock().expect("lock").push_back(Err(error));
    }

    /// Hold every call until the notify is signalled.
    pub(crate) fn set_gate(&self, gate: Arc<Notify>) {
        *self.gate.lock().expect("lock") = Some(gate);
    }

    /// Sleep this long inside every call.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("lock") = Some(delay);
    }

    pub(crate) fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("lock").clone()
    }

    /// Highest number of calls that were ever in flight at once.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionPort for ScriptedCompletion {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReply, CompletionError> {
        self.requests.lock().expect("lock").push(request);

        let inside = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(inside, Ordering::SeqCst);

        let gate = self.gate.lock().expect("lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let delay = *self.delay.lock().expect("lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CompletionReply {
                    output: "As you say.".to_string(),
                })
            })
    }
}

/// Fixed world readers, optionally with a locale for translation tests.
#[derive(Default)]
pub(crate) struct StubWorld {
    locale: Option<String>,
}

impl StubWorld {
    pub(crate) fn with_locale(locale: &str) -> Self {
        Self {
            locale: Some(locale.to_string()),
        }
    }
}

impl WorldStatePort for StubWorld {
    fn environment_description(&self, _actor: ActorId) -> String {
        "Dusk settles over the market square".to_string()
    }

    fn actor_description(&self, _actor: ActorId) -> String {
        "A road-worn traveler".to_string()
    }

    fn actor_locale(&self, _actor: ActorId) -> Option<String> {
        self.locale.clone()
    }
}

/// Translator that records calls and always declines.
#[derive(Default)]
pub(crate) struct DecliningTranslator {
    calls: Mutex<Vec<(String, String)>>,
}

impl DecliningTranslator {
    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }
}

#[async_trait]
impl TranslationPort for DecliningTranslator {
    async fn translate(&self, text: &str, target_locale: &str) -> Option<String> {
        self.calls
            .lock()
            .expect("lock")
            .push((text.to_string(), target_locale.to_string()));
        None
    }
}

/// Persistence stub that records what it was asked to save.
#[derive(Default)]
pub(crate) struct RecordingLog {
    records: Mutex<Vec<ConversationRecord>>,
}

impl RecordingLog {
    pub(crate) fn saved_records(&self) -> Vec<ConversationRecord> {
        self.records.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ConversationLogPort for RecordingLog {
    async fn save(&self, record: &ConversationRecord) -> anyhow::Result<()> {
        self.records.lock().expect("lock").push(record.clone());
        Ok(())
    }
}
