//! Load Registry use case
//!
//! Resolves the registry a process starts with: the stored one when it
//! exists and is intact, reconciled with the configured agents; otherwise a
//! fresh registry seeded from configuration.

use crate::ports::registry_store::{RegistryStore, StoreError};
use council_domain::{AgentId, AgentSpec, CouncilError, WeightRegistry};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoadRegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Council(#[from] CouncilError),
}

/// Registry ready for use, with what loading did to the store.
#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: WeightRegistry,
    /// Nothing was stored; the registry was seeded from configuration
    pub seeded: bool,
    /// Configured agents that joined a stored registry
    pub added: Vec<AgentId>,
    /// The store was (re)written
    pub written: bool,
}

pub struct LoadRegistryUseCase {
    store: Arc<dyn RegistryStore>,
}

impl LoadRegistryUseCase {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Load, verify and reconcile the stored registry.
    ///
    /// A stored registry that fails validation is a fatal
    /// [`CouncilError::RegistryCorruption`]; it is never silently replaced.
    pub async fn execute(&self, configured: &[AgentSpec]) -> Result<LoadedRegistry, LoadRegistryError> {
        let Some(stored) = self.store.get().await? else {
            let registry = WeightRegistry::from_specs(configured.iter().cloned());
            registry.validate()?;
            self.store.put(&registry).await?;
            info!(agents = registry.len(), "Seeded registry from configuration");
            return Ok(LoadedRegistry {
                registry,
                seeded: true,
                added: Vec::new(),
                written: true,
            });
        };

        stored.validate()?;

        let reconciliation = stored.reconcile(configured);
        if !reconciliation.changed {
            info!(version = stored.version(), agents = stored.len(), "Loaded registry");
            return Ok(LoadedRegistry {
                registry: stored,
                seeded: false,
                added: Vec::new(),
                written: false,
            });
        }

        let registry = reconciliation.registry.with_version(stored.version() + 1);
        registry.validate()?;
        self.store.put(&registry).await?;
        if !reconciliation.added.is_empty() {
            info!(added = ?reconciliation.added, "New agents joined the registry");
        }
        info!(version = registry.version(), "Reconciled registry with configuration");

        Ok(LoadedRegistry {
            registry,
            seeded: false,
            added: reconciliation.added,
            written: true,
        })
    }

    /// Renormalize a corrupted stored registry and write it back.
    ///
    /// Falls back to seeding from configuration when nothing is stored.
    pub async fn repair(&self, configured: &[AgentSpec]) -> Result<WeightRegistry, LoadRegistryError> {
        let registry = match self.store.get().await? {
            Some(stored) => {
                let version = stored.version() + 1;
                if let Err(e) = stored.validate() {
                    warn!("Repairing registry: {}", e);
                }
                stored.repaired().with_version(version)
            }
            None => WeightRegistry::from_specs(configured.iter().cloned()),
        };
        registry.validate()?;
        self.store.put(&registry).await?;
        info!(version = registry.version(), "Registry repaired");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::registry_store::InMemoryRegistryStore;
    use council_domain::{RegistryEntry, WEIGHT_TOLERANCE};

    fn configured() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new("security", 2.0).mandatory(),
            AgentSpec::new("cost", 1.0).with_triggers(["budget"]),
            AgentSpec::new("infra", 1.0),
        ]
    }

    fn corrupted() -> WeightRegistry {
        WeightRegistry::from_entries(
            3,
            [
                RegistryEntry::new(AgentSpec::new("security", 0.9)),
                RegistryEntry::new(AgentSpec::new("cost", 0.6)),
            ],
        )
    }

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let store = Arc::new(InMemoryRegistryStore::new());
        let loaded = LoadRegistryUseCase::new(store.clone())
            .execute(&configured())
            .await
            .unwrap();

        assert!(loaded.seeded);
        assert!(loaded.written);
        assert_eq!(loaded.registry.version(), 0);
        assert!((loaded.registry.base_weight(&AgentId::new("security")) - 0.5).abs() < WEIGHT_TOLERANCE);
        assert_eq!(store.get().await.unwrap(), Some(loaded.registry));
    }

    #[tokio::test]
    async fn test_unchanged_store_is_not_rewritten() {
        let stored = WeightRegistry::from_specs(configured()).with_version(7);
        let store = Arc::new(InMemoryRegistryStore::with_registry(stored.clone()));

        let loaded = LoadRegistryUseCase::new(store).execute(&configured()).await.unwrap();

        assert!(!loaded.seeded);
        assert!(!loaded.written);
        assert_eq!(loaded.registry, stored);
    }

    #[tokio::test]
    async fn test_new_agent_is_reconciled_into_store() {
        let stored = WeightRegistry::from_specs(configured()).with_version(7);
        let store = Arc::new(InMemoryRegistryStore::with_registry(stored));
        let mut specs = configured();
        specs.push(AgentSpec::new("compliance", 1.0));

        let loaded = LoadRegistryUseCase::new(store.clone()).execute(&specs).await.unwrap();

        assert_eq!(loaded.added, vec![AgentId::new("compliance")]);
        assert_eq!(loaded.registry.version(), 8);
        assert_eq!(loaded.registry.len(), 4);
        assert!(loaded.registry.validate().is_ok());
        assert_eq!(store.get().await.unwrap().unwrap().version(), 8);
    }

    #[tokio::test]
    async fn test_corrupted_store_is_fatal() {
        let store = Arc::new(InMemoryRegistryStore::with_registry(corrupted()));

        let err = LoadRegistryUseCase::new(store).execute(&configured()).await.unwrap_err();

        assert!(matches!(
            err,
            LoadRegistryError::Council(CouncilError::RegistryCorruption { .. })
        ));
    }

    #[tokio::test]
    async fn test_repair_renormalizes_and_bumps_version() {
        let store = Arc::new(InMemoryRegistryStore::with_registry(corrupted()));
        let usecase = LoadRegistryUseCase::new(store.clone());

        let repaired = usecase.repair(&configured()).await.unwrap();

        assert_eq!(repaired.version(), 4);
        assert!((repaired.total_weight() - 1.0).abs() < WEIGHT_TOLERANCE);
        assert!(usecase.execute(&configured()).await.is_ok());
    }
}
