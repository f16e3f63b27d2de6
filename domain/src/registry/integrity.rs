//! Reconciling a stored registry with the configured agent roster.

use super::entities::{RegistryEntry, WeightRegistry};
use crate::agent::{AgentId, AgentSpec};

/// Outcome of [`WeightRegistry::reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub registry: WeightRegistry,
    /// Agents that were configured but missing from the stored registry
    pub added: Vec<AgentId>,
    /// Whether any field differs from the stored registry
    pub changed: bool,
}

impl WeightRegistry {
    /// Merge configured specs into a stored registry.
    ///
    /// Stored weights and calibration statistics are kept. Triggers,
    /// dependency edges and the mandatory flag are refreshed from
    /// `configured`. Configured agents missing from the store join with the
    /// average stored weight and the registry is renormalized. Stored agents
    /// absent from `configured` are retained.
    pub fn reconcile(&self, configured: &[AgentSpec]) -> Reconciliation {
        let mut next = self.clone();
        let mut added = Vec::new();
        let mut changed = false;

        let average = if self.is_empty() {
            0.0
        } else {
            self.total_weight() / self.len() as f64
        };

        for spec in configured {
            match next.entry_mut(&spec.id) {
                Some(entry) => {
                    let stale = entry.spec.trigger_keywords != spec.trigger_keywords
                        || entry.spec.dependency_edges != spec.dependency_edges
                        || entry.spec.mandatory != spec.mandatory;
                    if stale {
                        entry.spec.trigger_keywords = spec.trigger_keywords.clone();
                        entry.spec.dependency_edges = spec.dependency_edges.clone();
                        entry.spec.mandatory = spec.mandatory;
                        changed = true;
                    }
                }
                None => {
                    let mut spec = spec.clone();
                    if !self.is_empty() {
                        spec.base_weight = average;
                    }
                    added.push(spec.id.clone());
                    next.insert(RegistryEntry::new(spec));
                }
            }
        }

        if !added.is_empty() {
            next = next.renormalized();
            changed = true;
        }

        Reconciliation {
            registry: next,
            added,
            changed,
        }
    }

    /// Force the registry back into a valid state.
    pub fn repaired(self) -> WeightRegistry {
        self.renormalized()
    }
}
