//! Shared, copy-on-write weight registry.
//!
//! Readers take an `Arc` snapshot and never block on writers. Writers are
//! serialized, persist the new value first, and then swap it in whole, so a
//! reader can only ever observe a complete, normalized registry.

use crate::ports::registry_store::{RegistryStore, StoreError};
use council_domain::{CouncilError, WeightRegistry};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Integrity(#[from] CouncilError),
}

pub struct SharedRegistry {
    current: RwLock<Arc<WeightRegistry>>,
    writer: Mutex<()>,
    store: Arc<dyn RegistryStore>,
}

impl SharedRegistry {
    pub fn new(initial: WeightRegistry, store: Arc<dyn RegistryStore>) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            writer: Mutex::new(()),
            store,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<WeightRegistry> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Apply `update` to the current snapshot and publish the result.
    ///
    /// The new registry gets the next version number and must pass
    /// validation; it is persisted before it becomes visible. On any error
    /// the current snapshot stays in place.
    pub async fn update<F>(&self, update: F) -> Result<Arc<WeightRegistry>, RegistryError>
    where
        F: FnOnce(&WeightRegistry) -> WeightRegistry,
    {
        let _writer = self.writer.lock().await;

        let base = self.snapshot();
        let next = update(&base).with_version(base.version() + 1);
        next.validate()?;

        self.store.put(&next).await?;

        let next = Arc::new(next);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Arc::clone(&next);
        info!(version = next.version(), agents = next.len(), "Registry swapped");
        Ok(next)
    }
}
