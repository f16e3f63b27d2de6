//! File-backed context provider

use async_trait::async_trait;
use council_application::{ContextError, ContextProvider};
use council_domain::{ContextSnapshot, Request};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the whole file as the context snapshot.
///
/// The file is re-read for each request, so edits take effect on the next
/// session without a restart. A missing or unreadable file is reported as
/// [`ContextError::Unavailable`]; the orchestrator then continues with an
/// empty snapshot.
#[derive(Debug, Clone)]
pub struct FileContextProvider {
    path: PathBuf,
}

impl FileContextProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContextProvider for FileContextProvider {
    async fn snapshot(&self, request: &Request) -> Result<ContextSnapshot, ContextError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ContextError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(
            session_id = %request.session_id(),
            path = %self.path.display(),
            bytes = content.len(),
            "Loaded context snapshot"
        );
        Ok(ContextSnapshot::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new("deploy the billing service", "s-1").unwrap()
    }

    #[tokio::test]
    async fn test_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.md");
        std::fs::write(&path, "billing runs on k8s").unwrap();

        let provider = FileContextProvider::new(&path);
        let snapshot = provider.snapshot(&request()).await.unwrap();
        assert_eq!(snapshot.as_str(), "billing runs on k8s");

        std::fs::write(&path, "billing moved to ecs").unwrap();
        let snapshot = provider.snapshot(&request()).await.unwrap();
        assert_eq!(snapshot.as_str(), "billing moved to ecs");
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileContextProvider::new(dir.path().join("absent.md"));

        let err = provider.snapshot(&request()).await.unwrap_err();
        assert!(matches!(err, ContextError::Unavailable(ref m) if m.contains("absent.md")));
    }
}
