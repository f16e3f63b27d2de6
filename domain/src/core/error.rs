//! Domain error taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
///
/// Only [`InsufficientAgents`](CouncilError::InsufficientAgents),
/// [`RegistryCorruption`](CouncilError::RegistryCorruption) and
/// [`InvalidRequest`](CouncilError::InvalidRequest) abort a session. Every
/// other variant is recovered locally and surfaces as a status field or as a
/// recorded warning on the session outcome.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouncilError {
    #[error("Registry has {available} agents but the roster floor is {required}")]
    InsufficientAgents { available: usize, required: usize },

    #[error("Quorum not met: {successes}/{total} agents responded (floor {floor:.2})")]
    QuorumNotMet {
        successes: usize,
        total: usize,
        floor: f64,
    },

    #[error("Agent {agent} timed out after {elapsed_ms}ms")]
    AgentTimeout { agent: String, elapsed_ms: u64 },

    #[error("Agent {agent} failed: {message}")]
    AgentCall { agent: String, message: String },

    #[error("All responding agents reported zero effective weight; equal weighting applied")]
    DegenerateSynthesis,

    #[error("Weight registry is corrupted: {reason}")]
    RegistryCorruption { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Unknown agent: {agent}")]
    UnknownAgent { agent: String },
}

impl CouncilError {
    /// Whether this error must be surfaced to the caller instead of being
    /// folded into the session outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CouncilError::InsufficientAgents { .. }
                | CouncilError::RegistryCorruption { .. }
                | CouncilError::InvalidRequest { .. }
        )
    }

    pub fn corruption(reason: impl Into<String>) -> Self {
        CouncilError::RegistryCorruption {
            reason: reason.into(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        CouncilError::InvalidRequest {
            reason: reason.into(),
        }
    }
}
