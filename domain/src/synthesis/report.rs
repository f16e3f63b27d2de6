//! Synthesis report value objects

use crate::agent::{ActionId, AgentId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One recommended action and the agents backing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAction {
    pub action_id: ActionId,
    /// Sum of the final weights of supporting agents
    pub score: f64,
    pub supporting_agents: BTreeSet<AgentId>,
    /// Whether any supporting agent is mandatory (first tie-breaker)
    #[serde(default)]
    pub mandatory_support: bool,
}

/// Output of the synthesis engine (Value Object)
///
/// `final_weights` sums to 1.0 over responding agents whenever at least one
/// agent responded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub final_weights: BTreeMap<AgentId, f64>,
    pub ranked_actions: Vec<RankedAction>,
    /// Equal weighting was applied, or nobody responded
    #[serde(default)]
    pub degraded: bool,
}

impl SynthesisReport {
    /// Report for a dispatch where no agent succeeded.
    pub fn empty() -> Self {
        Self {
            final_weights: BTreeMap::new(),
            ranked_actions: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.final_weights.is_empty()
    }

    pub fn responding_agents(&self) -> usize {
        self.final_weights.len()
    }

    pub fn final_weight(&self, agent: &AgentId) -> Option<f64> {
        self.final_weights.get(agent).copied()
    }

    pub fn weight_sum(&self) -> f64 {
        self.final_weights.values().sum()
    }

    pub fn top_actions(&self, k: usize) -> &[RankedAction] {
        &self.ranked_actions[..k.min(self.ranked_actions.len())]
    }
}
