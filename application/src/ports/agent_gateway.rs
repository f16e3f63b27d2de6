//! Agent gateway port
//!
//! Defines how the application layer invokes the black-box agents.

use async_trait::async_trait;
use council_domain::{AgentId, AgentReply, ContextSnapshot, Request};
use thiserror::Error;

/// Errors that can occur while calling an agent or reviewer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Not available: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the agents
///
/// Implementations (adapters) live in the infrastructure layer. A call must
/// either return or be cancellable by dropping its future; the executor
/// enforces the deadline.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn invoke(
        &self,
        agent: &AgentId,
        request: &Request,
        context: &ContextSnapshot,
    ) -> Result<AgentReply, GatewayError>;
}
