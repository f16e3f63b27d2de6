//! Shared utilities for use cases.
//!
//! Contains the session deadline clock and the cancellation check used by
//! the executor, the council runner and the orchestrator.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Session-wide deadline shared by every phase of one request.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
    deadline: Instant,
}

impl SessionClock {
    pub fn start(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + budget,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Budget for one outbound call: the per-call cap, bounded by what is
    /// left of the session.
    pub fn call_budget(&self, per_call: Option<Duration>) -> Duration {
        let remaining = self.remaining();
        per_call.map_or(remaining, |cap| cap.min(remaining))
    }

    pub fn elapsed_ms(&self) -> u64 {
        millis(self.started.elapsed())
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Whether the optional token has been cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Resolves when the token is cancelled; never resolves without a token.
pub(crate) async fn cancelled(token: &Option<CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub(crate) fn unix_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
