//! Reviewer gateway port

use super::agent_gateway::GatewayError;
use async_trait::async_trait;
use council_domain::{ReviewRequest, ReviewerReply, ReviewerRole};

/// Gateway to the council reviewers, one call per role per round.
#[async_trait]
pub trait ReviewerGateway: Send + Sync {
    async fn review(
        &self,
        role: ReviewerRole,
        request: &ReviewRequest,
    ) -> Result<ReviewerReply, GatewayError>;
}
