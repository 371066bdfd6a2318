//! System clock implementation of [`ClockPort`].

use chrono::{DateTime, Utc};

use super::ports::ClockPort;

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
