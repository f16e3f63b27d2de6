//! Context provider port
//!
//! Supplies the read-only context snapshot forwarded to every agent of a
//! session. The orchestrator never interprets it.

use async_trait::async_trait;
use council_domain::{ContextSnapshot, Request};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Context unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn snapshot(&self, request: &Request) -> Result<ContextSnapshot, ContextError>;
}

/// Provider that always returns an empty snapshot.
pub struct NoContext;

#[async_trait]
impl ContextProvider for NoContext {
    async fn snapshot(&self, _request: &Request) -> Result<ContextSnapshot, ContextError> {
        Ok(ContextSnapshot::empty())
    }
}
