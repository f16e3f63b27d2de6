//! Static description of a registered agent.

use super::value_objects::AgentId;
use crate::core::request::normalize_token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Registry description of one agent.
///
/// `base_weight` values across the full registry always sum to 1.0; the
/// registry renormalizes after every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: AgentId,
    pub base_weight: f64,
    /// Normalized (lowercase) trigger tokens
    #[serde(default)]
    pub trigger_keywords: BTreeSet<String>,
    /// Agents that must join the roster whenever this one does
    #[serde(default)]
    pub dependency_edges: BTreeSet<AgentId>,
    /// Always included in every roster
    #[serde(default)]
    pub mandatory: bool,
}

impl AgentSpec {
    pub fn new(id: impl Into<AgentId>, base_weight: f64) -> Self {
        Self {
            id: id.into(),
            base_weight,
            trigger_keywords: BTreeSet::new(),
            dependency_edges: BTreeSet::new(),
            mandatory: false,
        }
    }

    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.trigger_keywords = triggers
            .into_iter()
            .map(|t| normalize_token(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn with_dependencies<I, A>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AgentId>,
    {
        self.dependency_edges = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Whether any trigger keyword appears in the token set.
    pub fn is_triggered_by(&self, tokens: &BTreeSet<String>) -> bool {
        !self.trigger_keywords.is_disjoint(tokens)
    }
}
