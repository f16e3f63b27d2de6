//! Agent identifiers.
//!
//! - [`AgentId`] - Unique identifier of an agent in the registry
//! - [`ActionId`] - Identifier of an action an agent can recommend

use serde::{Deserialize, Serialize};

/// Unique identifier of a registered agent.
///
/// Ordered so that rosters, weight maps and vote tallies iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a recommended action (e.g. `"rotate-credentials"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ActionId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_ordering() {
        let mut ids = vec![AgentId::new("security"), AgentId::new("cost"), AgentId::new("infra")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "cost");
        assert_eq!(ids[2].as_str(), "security");
    }

    #[test]
    fn test_serializes_transparently() {
        let json = serde_json::to_string(&ActionId::new("rollback")).unwrap();
        assert_eq!(json, "\"rollback\"");
    }
}
