//! Orchestration domain entities

use serde::{Deserialize, Serialize};

/// Phase of an orchestrated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Choosing the roster
    Selection,
    /// Invoking every roster member concurrently
    Dispatch,
    /// Second dispatch of failed agents after a missed quorum
    Retry,
    Synthesis,
    /// One council review round
    Council,
    Audit,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Selection => "selection",
            Phase::Dispatch => "dispatch",
            Phase::Retry => "retry",
            Phase::Synthesis => "synthesis",
            Phase::Council => "council",
            Phase::Audit => "audit",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Selection => "Roster Selection",
            Phase::Dispatch => "Agent Dispatch",
            Phase::Retry => "Retry Pass",
            Phase::Synthesis => "Synthesis",
            Phase::Council => "Council Review",
            Phase::Audit => "Audit",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
