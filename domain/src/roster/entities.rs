//! Roster entity

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why an agent is on the roster. Earlier variants win when several apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionReason {
    Mandatory,
    Triggered,
    Dependency,
    PriorTurn,
    Borderline,
    Backfill,
}

impl InclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InclusionReason::Mandatory => "mandatory",
            InclusionReason::Triggered => "triggered",
            InclusionReason::Dependency => "dependency",
            InclusionReason::PriorTurn => "prior_turn",
            InclusionReason::Borderline => "borderline",
            InclusionReason::Backfill => "backfill",
        }
    }
}

impl std::fmt::Display for InclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Agents selected for one request, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    members: BTreeMap<AgentId, InclusionReason>,
    #[serde(default)]
    exceeds_ceiling: bool,
}

impl Roster {
    pub(crate) fn new(members: BTreeMap<AgentId, InclusionReason>, max_size: usize) -> Self {
        let exceeds_ceiling = members.len() > max_size;
        Self {
            members,
            exceeds_ceiling,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.members.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.members.keys()
    }

    pub fn to_ids(&self) -> Vec<AgentId> {
        self.members.keys().cloned().collect()
    }

    pub fn reason(&self, id: &AgentId) -> Option<InclusionReason> {
        self.members.get(id).copied()
    }

    pub fn members(&self) -> impl Iterator<Item = (&AgentId, InclusionReason)> {
        self.members.iter().map(|(id, reason)| (id, *reason))
    }

    /// True when prior-turn members alone forced the roster past the ceiling.
    pub fn exceeds_ceiling(&self) -> bool {
        self.exceeds_ceiling
    }

    pub fn is_superset_of<'a>(&self, other: impl IntoIterator<Item = &'a AgentId>) -> bool {
        other.into_iter().all(|id| self.contains(id))
    }
}
