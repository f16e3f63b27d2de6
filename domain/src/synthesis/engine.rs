//! Synthesis algorithm

use super::report::{RankedAction, SynthesisReport};
use crate::agent::{ActionId, AgentId, AgentResult};
use crate::registry::WeightRegistry;
use std::collections::{BTreeMap, BTreeSet};

/// Combine agent results into a weighted, ranked report.
///
/// Only successful results take part. Each responder's effective weight is
/// `base_weight × relevance` (a missing relevance counts as 0); weights are
/// normalized to sum to 1.0. When every effective weight is zero the engine
/// falls back to equal weights and marks the report degraded.
///
/// Actions are ranked by score descending, then by mandatory support, then
/// by action id. The computation iterates in agent-id order throughout, so
/// the same inputs always produce a bit-identical report.
pub fn synthesize(results: &[AgentResult], registry: &WeightRegistry) -> SynthesisReport {
    let responding: BTreeMap<&AgentId, &AgentResult> = results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| (&r.agent_id, r))
        .collect();

    if responding.is_empty() {
        return SynthesisReport::empty();
    }

    let effective: BTreeMap<&AgentId, f64> = responding
        .iter()
        .map(|(id, result)| {
            let relevance = result.relevance_score.unwrap_or(0.0);
            let weight = registry.base_weight(id) * relevance;
            (*id, if weight.is_finite() { weight.max(0.0) } else { 0.0 })
        })
        .collect();
    let total: f64 = effective.values().sum();

    let (final_weights, degraded) = if total > 0.0 && total.is_finite() {
        let weights = effective
            .into_iter()
            .map(|(id, w)| (id.clone(), w / total))
            .collect();
        (weights, false)
    } else {
        let equal = 1.0 / responding.len() as f64;
        let weights = responding.keys().map(|id| ((*id).clone(), equal)).collect();
        (weights, true)
    };

    let ranked_actions = rank_actions(&responding, &final_weights, registry);

    SynthesisReport {
        final_weights,
        ranked_actions,
        degraded,
    }
}

fn rank_actions(
    responding: &BTreeMap<&AgentId, &AgentResult>,
    final_weights: &BTreeMap<AgentId, f64>,
    registry: &WeightRegistry,
) -> Vec<RankedAction> {
    let mut tally: BTreeMap<&ActionId, RankedAction> = BTreeMap::new();

    for (id, result) in responding {
        let weight = final_weights.get(*id).copied().unwrap_or(0.0);
        let mandatory = registry.is_mandatory(id);
        // an agent votes once per action
        let actions: BTreeSet<&ActionId> = result.suggested_actions.iter().collect();

        for action in actions {
            let entry = tally.entry(action).or_insert_with(|| RankedAction {
                action_id: action.clone(),
                score: 0.0,
                supporting_agents: BTreeSet::new(),
                mandatory_support: false,
            });
            entry.score += weight;
            entry.supporting_agents.insert((*id).clone());
            entry.mandatory_support |= mandatory;
        }
    }

    let mut ranked: Vec<RankedAction> = tally.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.mandatory_support.cmp(&a.mandatory_support))
            .then_with(|| a.action_id.cmp(&b.action_id))
    });
    ranked
}
