//! Weight registry stored as a single pretty-printed JSON file.
//!
//! Writes go to `<path>.tmp`, are fsynced, then renamed over the target so
//! a crash never leaves a half-written registry behind.

use async_trait::async_trait;
use council_application::{RegistryStore, StoreError};
use council_domain::WeightRegistry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct JsonFileRegistryStore {
    path: PathBuf,
}

impl JsonFileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl RegistryStore for JsonFileRegistryStore {
    async fn get(&self) -> Result<Option<WeightRegistry>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, registry: &WeightRegistry) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(registry)?;
        let temp = self.temp_path();

        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(&json).await?;
        file.write_all(b"\n").await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;
        debug!(
            path = %self.path.display(),
            version = registry.version(),
            "Registry written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::AgentSpec;

    fn registry() -> WeightRegistry {
        WeightRegistry::from_specs([
            AgentSpec::new("security", 0.6).mandatory(),
            AgentSpec::new("cost", 0.4).with_triggers(["budget"]),
        ])
        .with_version(3)
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRegistryStore::new(dir.path().join("registry.json"));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRegistryStore::new(dir.path().join("nested").join("registry.json"));

        store.put(&registry()).await.unwrap();
        let loaded = store.get().await.unwrap().unwrap();

        assert_eq!(loaded, registry());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_put_replaces_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRegistryStore::new(dir.path().join("registry.json"));

        store.put(&registry()).await.unwrap();
        store.put(&registry().with_version(4)).await.unwrap();

        assert_eq!(store.get().await.unwrap().unwrap().version(), 4);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileRegistryStore::new(path);
        assert!(matches!(
            store.get().await,
            Err(StoreError::Serialization(_))
        ));
    }
}
