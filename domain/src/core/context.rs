//! Read-only context shared with every agent of a session.

use serde::{Deserialize, Serialize};

/// Opaque context blob supplied by the context collaborator.
///
/// The orchestrator never interprets the contents; it only forwards the
/// snapshot to agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSnapshot(String);

impl ContextSnapshot {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
