//! Registry persistence port
//!
//! The store is a single-key blob: `get` returns the last registry written
//! by `put`. Both are assumed durable and strongly consistent.

use async_trait::async_trait;
use council_domain::WeightRegistry;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from persistence collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Other(String),
}

#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load the stored registry, `None` if nothing was ever written.
    async fn get(&self) -> Result<Option<WeightRegistry>, StoreError>;

    async fn put(&self, registry: &WeightRegistry) -> Result<(), StoreError>;
}

/// Volatile store for tests and for running without a registry file.
#[derive(Default)]
pub struct InMemoryRegistryStore {
    registry: Mutex<Option<WeightRegistry>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: WeightRegistry) -> Self {
        Self {
            registry: Mutex::new(Some(registry)),
        }
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn get(&self) -> Result<Option<WeightRegistry>, StoreError> {
        Ok(self
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn put(&self, registry: &WeightRegistry) -> Result<(), StoreError> {
        *self.registry.lock().unwrap_or_else(|e| e.into_inner()) = Some(registry.clone());
        Ok(())
    }
}
