//! Execution parameters - dispatch and deadline control.
//!
//! [`ExecutionParams`] groups the static parameters that control how agent
//! and reviewer calls are scheduled. These are application-layer concerns,
//! not domain policy.

use council_domain::QuorumFloor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatch control parameters.
///
/// One session deadline is shared by every phase: each outbound call gets
/// `min(agent_timeout, remaining session budget)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// End-to-end budget for one request.
    pub session_deadline: Duration,
    /// Upper bound for a single agent or reviewer call. `None` means the
    /// remaining session budget.
    pub agent_timeout: Option<Duration>,
    /// Size of the bounded worker pool. `None` means one worker per call.
    pub concurrency_cap: Option<usize>,
    pub quorum_floor: QuorumFloor,
    /// Whether a missed quorum triggers one retry pass for the failed subset.
    pub retry_failed: bool,
    /// Capacity of the calibration queue.
    pub calibration_queue_capacity: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            session_deadline: Duration::from_millis(8000),
            agent_timeout: None,
            concurrency_cap: None,
            quorum_floor: QuorumFloor::default(),
            retry_failed: true,
            calibration_queue_capacity: 64,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_session_deadline(mut self, deadline: Duration) -> Self {
        self.session_deadline = deadline;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_concurrency_cap(mut self, cap: Option<usize>) -> Self {
        self.concurrency_cap = cap;
        self
    }

    pub fn with_quorum_floor(mut self, floor: QuorumFloor) -> Self {
        self.quorum_floor = floor;
        self
    }

    pub fn without_retry(mut self) -> Self {
        self.retry_failed = false;
        self
    }

    pub fn with_calibration_queue_capacity(mut self, capacity: usize) -> Self {
        self.calibration_queue_capacity = capacity;
        self
    }

    /// Worker pool size for `calls` concurrent calls.
    pub fn pool_size(&self, calls: usize) -> usize {
        self.concurrency_cap.unwrap_or(calls).min(calls).max(1)
    }
}
