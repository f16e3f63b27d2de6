//! Registry entities

use crate::agent::{AgentId, AgentSpec};
use crate::core::error::CouncilError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Allowed drift of Σ base_weight from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Starting value for both calibration averages.
pub const INITIAL_EMA: f64 = 0.5;

/// One agent's registry row: its spec plus calibration statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub spec: AgentSpec,
    pub accuracy_ema: f64,
    pub contribution_ema: f64,
    /// Number of sessions this agent has been calibrated on
    #[serde(default)]
    pub sessions: u64,
}

impl RegistryEntry {
    pub fn new(spec: AgentSpec) -> Self {
        Self {
            spec,
            accuracy_ema: INITIAL_EMA,
            contribution_ema: INITIAL_EMA,
            sessions: 0,
        }
    }

    pub fn base_weight(&self) -> f64 {
        self.spec.base_weight
    }
}

/// Versioned snapshot of every registered agent and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRegistry {
    version: u64,
    entries: BTreeMap<AgentId, RegistryEntry>,
}

impl WeightRegistry {
    /// Build a registry from specs and renormalize their weights.
    ///
    /// A later spec with the same id replaces an earlier one.
    pub fn from_specs(specs: impl IntoIterator<Item = AgentSpec>) -> Self {
        let entries = specs
            .into_iter()
            .map(|spec| (spec.id.clone(), RegistryEntry::new(spec)))
            .collect();
        Self {
            version: 0,
            entries,
        }
        .renormalized()
    }

    /// Build a registry from raw entries without touching the weights.
    pub fn from_entries(version: u64, entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        Self {
            version,
            entries: entries
                .into_iter()
                .map(|e| (e.spec.id.clone(), e))
                .collect(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entry(&self, id: &AgentId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    pub fn spec(&self, id: &AgentId) -> Option<&AgentSpec> {
        self.entries.get(id).map(|e| &e.spec)
    }

    /// Base weight of an agent, or 0.0 if it is not registered.
    pub fn base_weight(&self, id: &AgentId) -> f64 {
        self.entries.get(id).map(|e| e.spec.base_weight).unwrap_or(0.0)
    }

    pub fn is_mandatory(&self, id: &AgentId) -> bool {
        self.entries.get(id).is_some_and(|e| e.spec.mandatory)
    }

    /// Entries in agent-id order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Specs in agent-id order.
    pub fn specs(&self) -> impl Iterator<Item = &AgentSpec> {
        self.entries.values().map(|e| &e.spec)
    }

    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.entries.keys()
    }

    pub fn mandatory_count(&self) -> usize {
        self.specs().filter(|s| s.mandatory).count()
    }

    pub fn total_weight(&self) -> f64 {
        self.specs().map(|s| s.base_weight).sum()
    }

    pub(crate) fn entry_mut(&mut self, id: &AgentId) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    pub(crate) fn insert(&mut self, entry: RegistryEntry) {
        self.entries.insert(entry.spec.id.clone(), entry);
    }

    /// Rescale weights so they sum to 1.0 across all registered agents.
    ///
    /// Negative or non-finite weights are treated as zero. If every weight
    /// is zero the registry falls back to equal weights.
    pub fn renormalized(mut self) -> Self {
        if self.entries.is_empty() {
            return self;
        }

        for entry in self.entries.values_mut() {
            let w = entry.spec.base_weight;
            if !w.is_finite() || w < 0.0 {
                entry.spec.base_weight = 0.0;
            }
        }

        let total = self.total_weight();
        if total > 0.0 {
            for entry in self.entries.values_mut() {
                entry.spec.base_weight /= total;
            }
        } else {
            let equal = 1.0 / self.entries.len() as f64;
            for entry in self.entries.values_mut() {
                entry.spec.base_weight = equal;
            }
        }
        self
    }

    /// Check the registry invariants (non-empty, weights in `[0, 1]`,
    /// Σ base_weight == 1.0 within [`WEIGHT_TOLERANCE`]).
    pub fn validate(&self) -> Result<(), CouncilError> {
        if self.entries.is_empty() {
            return Err(CouncilError::corruption("registry has no agents"));
        }

        for entry in self.entries.values() {
            let w = entry.spec.base_weight;
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(CouncilError::corruption(format!(
                    "agent {} has invalid base weight {}",
                    entry.spec.id, w
                )));
            }
        }

        let total = self.total_weight();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CouncilError::corruption(format!(
                "base weights sum to {:.6}, expected 1.0",
                total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WeightRegistry {
        WeightRegistry::from_specs([
            AgentSpec::new("a", 3.0),
            AgentSpec::new("b", 1.0),
            AgentSpec::new("c", 0.0).mandatory(),
        ])
    }

    #[test]
    fn test_from_specs_renormalizes() {
        let r = registry();
        assert!((r.total_weight() - 1.0).abs() < WEIGHT_TOLERANCE);
        assert!((r.base_weight(&AgentId::new("a")) - 0.75).abs() < 1e-12);
        assert!((r.base_weight(&AgentId::new("b")) - 0.25).abs() < 1e-12);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_equal() {
        let r = WeightRegistry::from_specs([AgentSpec::new("a", 0.0), AgentSpec::new("b", 0.0)]);
        assert_eq!(r.base_weight(&AgentId::new("a")), 0.5);
        assert_eq!(r.base_weight(&AgentId::new("b")), 0.5);
    }

    #[test]
    fn test_renormalize_sanitizes_invalid_weights() {
        let r = WeightRegistry::from_specs([
            AgentSpec::new("a", f64::NAN),
            AgentSpec::new("b", -2.0),
            AgentSpec::new("c", 0.4),
        ]);
        assert_eq!(r.base_weight(&AgentId::new("a")), 0.0);
        assert_eq!(r.base_weight(&AgentId::new("b")), 0.0);
        assert!((r.base_weight(&AgentId::new("c")) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_detects_bad_sum() {
        let r = WeightRegistry::from_entries(
            3,
            [
                RegistryEntry::new(AgentSpec::new("a", 0.7)),
                RegistryEntry::new(AgentSpec::new("b", 0.7)),
            ],
        );
        assert!(matches!(
            r.validate(),
            Err(CouncilError::RegistryCorruption { .. })
        ));
        assert!(r.renormalized().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let r = WeightRegistry::from_entries(0, []);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_mandatory_and_lookup() {
        let r = registry();
        assert_eq!(r.mandatory_count(), 1);
        assert!(r.is_mandatory(&AgentId::new("c")));
        assert!(!r.is_mandatory(&AgentId::new("zz")));
        assert_eq!(r.base_weight(&AgentId::new("zz")), 0.0);
        assert_eq!(r.ids().next().map(|id| id.as_str()), Some("a"));
    }

    #[test]
    fn test_serde_preserves_version() {
        let r = registry().with_version(7);
        let json = serde_json::to_string(&r).unwrap();
        let back: WeightRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version(), 7);
        assert_eq!(back, r);
    }
}
