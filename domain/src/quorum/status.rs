//! Outcome of the quorum check after dispatch

use super::rule::QuorumFloor;
use serde::{Deserialize, Serialize};

/// Quorum bookkeeping recorded on every session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuorumStatus {
    pub successes: usize,
    pub total: usize,
    pub floor: f64,
    /// Whether the failed subset was dispatched a second time
    pub retried: bool,
    pub met: bool,
}

impl QuorumStatus {
    pub fn evaluate(floor: QuorumFloor, successes: usize, total: usize, retried: bool) -> Self {
        Self {
            successes,
            total,
            floor: floor.value(),
            retried,
            met: floor.is_satisfied(successes, total),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64
        }
    }
}

impl std::fmt::Display for QuorumStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} responded ({:.0}%, floor {:.0}%){}",
            self.successes,
            self.total,
            self.ratio() * 100.0,
            self.floor * 100.0,
            if self.retried { ", after retry" } else { "" }
        )
    }
}
