//! Port for the append-only audit log.
//!
//! One [`AuditEntry`] per orchestrated request. Entries are never rewritten.
//! A failed append is reported to the caller of the port; the orchestrator
//! logs it and marks the outcome `audit_recorded = false` instead of failing
//! the session.

use super::registry_store::StoreError;
use async_trait::async_trait;
use council_domain::AuditEntry;
use std::sync::Mutex;

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError>;
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

#[async_trait]
impl AuditLog for NoAuditLog {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Keeps every entry in memory.
#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }
}
