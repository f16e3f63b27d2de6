//! Council thresholds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouncilPolicy {
    /// Quality at or above which the loop stops with PASS
    pub pass_threshold: f64,
    /// Final quality at or above which an exhausted loop is CONDITIONAL
    pub conditional_threshold: f64,
    pub max_rounds: u32,
    /// Subtracted from a round's quality per missing non-quality reviewer
    pub reviewer_timeout_penalty: f64,
}

impl Default for CouncilPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: 0.95,
            conditional_threshold: 0.80,
            max_rounds: 4,
            reviewer_timeout_penalty: 0.05,
        }
    }
}

impl CouncilPolicy {
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_pass_threshold(mut self, threshold: f64) -> Self {
        self.pass_threshold = threshold;
        self
    }

    pub fn with_conditional_threshold(mut self, threshold: f64) -> Self {
        self.conditional_threshold = threshold;
        self
    }

    pub fn with_reviewer_timeout_penalty(mut self, penalty: f64) -> Self {
        self.reviewer_timeout_penalty = penalty;
        self
    }
}
