//! Feedback signals derived from session outcomes

use super::policy::CalibrationPolicy;
use crate::agent::{ActionId, AgentId, AgentResult};
use crate::core::request::SessionId;
use crate::synthesis::SynthesisReport;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What the calibrator needs to know about a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub results: Vec<AgentResult>,
    pub report: SynthesisReport,
    /// Final council quality, 0 when the council was skipped
    pub quality: f64,
    /// Externally observed accuracy per agent, when available
    #[serde(default)]
    pub accuracy: BTreeMap<AgentId, f64>,
}

/// Normalized performance evidence for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSignal {
    pub agent_id: AgentId,
    /// Contribution to the final verdict; `None` for feedback that arrives
    /// after the session was calibrated
    pub contribution: Option<f64>,
    pub accuracy: Option<f64>,
}

impl FeedbackSignal {
    /// Signal used for the base-weight update.
    ///
    /// The mean of whichever components are present, or `None` if neither is.
    pub fn signal(&self) -> Option<f64> {
        match (self.contribution, self.accuracy) {
            (Some(c), Some(a)) => Some((c + a) / 2.0),
            (Some(c), None) => Some(c),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    /// Accuracy-only feedback for agents of an already calibrated session.
    pub fn accuracy_only(agent_id: AgentId, accuracy: f64) -> Self {
        Self {
            agent_id,
            contribution: None,
            accuracy: Some(unit(accuracy)),
        }
    }
}

/// Derive one signal per participating agent.
///
/// `contribution = quality × support`, where support is the fraction of
/// the agent's suggested actions found in the top-k ranked actions
/// (denominator `min(k, suggested)`). Agents that suggested nothing use
/// their relevance as support; failed agents contribute 0.
pub fn feedback_signals(outcome: &SessionOutcome, policy: &CalibrationPolicy) -> Vec<FeedbackSignal> {
    let top: BTreeSet<&ActionId> = outcome
        .report
        .top_actions(policy.top_k)
        .iter()
        .map(|a| &a.action_id)
        .collect();
    let quality = unit(outcome.quality);

    let mut seen = BTreeSet::new();
    outcome
        .results
        .iter()
        .filter(|r| seen.insert(&r.agent_id))
        .map(|result| {
            let contribution = if result.is_success() {
                quality * support(result, &top, policy.top_k)
            } else {
                0.0
            };
            FeedbackSignal {
                agent_id: result.agent_id.clone(),
                contribution: Some(unit(contribution)),
                accuracy: outcome.accuracy.get(&result.agent_id).copied().map(unit),
            }
        })
        .collect()
}

fn support(result: &AgentResult, top: &BTreeSet<&ActionId>, top_k: usize) -> f64 {
    let suggested: BTreeSet<&ActionId> = result.suggested_actions.iter().collect();
    if suggested.is_empty() {
        return result.relevance_score.unwrap_or(0.0);
    }
    let landed = suggested.iter().filter(|a| top.contains(*a)).count();
    let denominator = top_k.min(suggested.len()).max(1);
    landed as f64 / denominator as f64
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Keep late accuracy only for agents that took part in the session.
///
/// Returns the retained scores and the ids that were dropped.
pub fn retain_participants(
    accuracy: impl IntoIterator<Item = (AgentId, f64)>,
    participants: &BTreeSet<AgentId>,
) -> (BTreeMap<AgentId, f64>, Vec<AgentId>) {
    let mut kept = BTreeMap::new();
    let mut dropped = Vec::new();
    for (agent, value) in accuracy {
        if participants.contains(&agent) {
            kept.insert(agent, value);
        } else {
            dropped.push(agent);
        }
    }
    (kept, dropped)
}
