//! Roster selection algorithm

use super::entities::{InclusionReason, Roster};
use super::policy::{DOUBT_THRESHOLD, RosterPolicy};
use crate::agent::{AgentId, AgentSpec};
use crate::core::error::CouncilError;
use crate::core::request::Request;
use crate::registry::WeightRegistry;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Shortest shared prefix that counts as a partial trigger match.
const MIN_PREFIX_LEN: usize = 4;

/// Selects the agents that take part in one request.
///
/// Selection is deterministic: the same request, prior roster and registry
/// snapshot always produce the same roster.
#[derive(Debug, Clone, Default)]
pub struct RosterSelector {
    policy: RosterPolicy,
}

impl RosterSelector {
    pub fn new(policy: RosterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RosterPolicy {
        &self.policy
    }

    /// Select the roster for `request`.
    ///
    /// `prior` is the roster of the previous turn of the same session (empty
    /// on the first turn). Every prior member is kept, even ids the registry
    /// no longer knows about.
    ///
    /// # Errors
    ///
    /// [`CouncilError::InsufficientAgents`] when the registry itself holds
    /// fewer agents than the roster floor.
    pub fn select(
        &self,
        request: &Request,
        prior: &[AgentId],
        registry: &WeightRegistry,
    ) -> Result<Roster, CouncilError> {
        if registry.len() < self.policy.min_size {
            return Err(CouncilError::InsufficientAgents {
                available: registry.len(),
                required: self.policy.min_size,
            });
        }

        let tokens = request.tokens();
        let mut selected: BTreeMap<AgentId, InclusionReason> = BTreeMap::new();

        for spec in registry.specs().filter(|s| s.mandatory) {
            selected.insert(spec.id.clone(), InclusionReason::Mandatory);
        }
        for spec in registry.specs().filter(|s| s.is_triggered_by(&tokens)) {
            selected
                .entry(spec.id.clone())
                .or_insert(InclusionReason::Triggered);
        }

        expand_dependencies(&mut selected, registry);

        for id in prior {
            selected
                .entry(id.clone())
                .or_insert(InclusionReason::PriorTurn);
        }

        self.include_borderline(&mut selected, &tokens, registry);
        self.backfill(&mut selected, registry);

        let prior: BTreeSet<&AgentId> = prior.iter().collect();
        self.truncate(&mut selected, &prior, registry);

        Ok(Roster::new(selected, self.policy.max_size))
    }

    /// "Doubt = include": partially matching agents join while there is room.
    fn include_borderline(
        &self,
        selected: &mut BTreeMap<AgentId, InclusionReason>,
        tokens: &BTreeSet<String>,
        registry: &WeightRegistry,
    ) {
        let mut candidates: Vec<(&AgentSpec, f64)> = registry
            .specs()
            .filter(|s| !selected.contains_key(&s.id))
            .map(|s| (s, estimated_relevance(s, tokens)))
            .filter(|(_, relevance)| *relevance > DOUBT_THRESHOLD)
            .collect();

        candidates.sort_by(|(a, ra), (b, rb)| {
            rb.total_cmp(ra)
                .then_with(|| b.base_weight.total_cmp(&a.base_weight))
                .then_with(|| a.id.cmp(&b.id))
        });

        for (spec, _) in candidates {
            if selected.len() >= self.policy.max_size {
                break;
            }
            selected.insert(spec.id.clone(), InclusionReason::Borderline);
        }
    }

    /// Add the heaviest unselected agents until the floor is met.
    fn backfill(&self, selected: &mut BTreeMap<AgentId, InclusionReason>, registry: &WeightRegistry) {
        if selected.len() >= self.policy.min_size {
            return;
        }

        let mut candidates: Vec<&AgentSpec> = registry
            .specs()
            .filter(|s| !selected.contains_key(&s.id))
            .collect();
        candidates.sort_by(|a, b| heaviest_first(a, b));

        for spec in candidates {
            if selected.len() >= self.policy.min_size {
                break;
            }
            selected.insert(spec.id.clone(), InclusionReason::Backfill);
        }
    }

    /// Drop the lightest removable agents until the ceiling holds.
    ///
    /// Mandatory agents and prior-turn members are never removed, so the
    /// result can stay above the ceiling.
    fn truncate(
        &self,
        selected: &mut BTreeMap<AgentId, InclusionReason>,
        prior: &BTreeSet<&AgentId>,
        registry: &WeightRegistry,
    ) {
        if selected.len() <= self.policy.max_size {
            return;
        }

        let mut removable: Vec<AgentId> = selected
            .keys()
            .filter(|id| !registry.is_mandatory(id) && !prior.contains(id))
            .cloned()
            .collect();
        removable.sort_by(|a, b| {
            registry
                .base_weight(a)
                .total_cmp(&registry.base_weight(b))
                .then_with(|| b.cmp(a))
        });

        for id in removable {
            if selected.len() <= self.policy.max_size {
                break;
            }
            selected.remove(&id);
        }
    }
}

/// Add everything reachable over dependency edges from the current selection.
///
/// Each agent is visited once, so cycles terminate. Edges to agents the
/// registry does not know are skipped.
fn expand_dependencies(selected: &mut BTreeMap<AgentId, InclusionReason>, registry: &WeightRegistry) {
    let mut visited: BTreeSet<AgentId> = selected.keys().cloned().collect();
    let mut queue: VecDeque<AgentId> = selected.keys().cloned().collect();

    while let Some(id) = queue.pop_front() {
        let Some(spec) = registry.spec(&id) else {
            continue;
        };
        for dep in &spec.dependency_edges {
            if !registry.contains(dep) || !visited.insert(dep.clone()) {
                continue;
            }
            selected
                .entry(dep.clone())
                .or_insert(InclusionReason::Dependency);
            queue.push_back(dep.clone());
        }
    }
}

fn heaviest_first(a: &AgentSpec, b: &AgentSpec) -> Ordering {
    b.base_weight
        .total_cmp(&a.base_weight)
        .then_with(|| a.id.cmp(&b.id))
}

/// Fraction of an agent's triggers that partially match the request tokens.
///
/// A trigger partially matches a token when the shorter of the two is a
/// prefix of the longer and is at least four characters long.
pub fn estimated_relevance(spec: &AgentSpec, tokens: &BTreeSet<String>) -> f64 {
    if spec.trigger_keywords.is_empty() {
        return 0.0;
    }
    let matched = spec
        .trigger_keywords
        .iter()
        .filter(|trigger| tokens.iter().any(|token| is_prefix_match(trigger, token)))
        .count();
    matched as f64 / spec.trigger_keywords.len() as f64
}

fn is_prefix_match(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_PREFIX_LEN && long.starts_with(short)
}
