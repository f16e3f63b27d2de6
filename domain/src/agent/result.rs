//! Per-agent invocation results.
//!
//! - [`AgentReply`] - payload an agent returns on success
//! - [`AgentResult`] - immutable record of one invocation, including failures

use super::value_objects::{ActionId, AgentId};
use serde::{Deserialize, Serialize};

/// Terminal status of one agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Timeout,
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Success => "success",
            AgentStatus::Timeout => "timeout",
            AgentStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an agent returns when it answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentReply {
    pub relevance_score: Option<f64>,
    pub insights: Vec<String>,
    pub concerns: Vec<String>,
    pub suggested_actions: Vec<ActionId>,
}

impl AgentReply {
    pub fn new(relevance_score: f64) -> Self {
        Self {
            relevance_score: Some(relevance_score),
            ..Default::default()
        }
    }

    pub fn with_actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionId>,
    {
        self.suggested_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.insights.push(insight.into());
        self
    }

    pub fn with_concern(mut self, concern: impl Into<String>) -> Self {
        self.concerns.push(concern.into());
        self
    }
}

/// Result of invoking one agent (Value Object)
///
/// Created once per agent per invocation and never mutated afterwards.
/// Failed invocations carry `relevance_score = None` and no actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub suggested_actions: Vec<ActionId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    /// Record a successful reply. Relevance is clamped into `[0, 1]`.
    pub fn success(agent_id: impl Into<AgentId>, reply: AgentReply, latency_ms: u64) -> Self {
        Self {
            agent_id: agent_id.into(),
            status: AgentStatus::Success,
            relevance_score: reply
                .relevance_score
                .filter(|r| r.is_finite())
                .map(|r| r.clamp(0.0, 1.0)),
            insights: reply.insights,
            concerns: reply.concerns,
            suggested_actions: reply.suggested_actions,
            latency_ms,
            error: None,
        }
    }

    pub fn timeout(agent_id: impl Into<AgentId>, latency_ms: u64) -> Self {
        Self::failed(agent_id, AgentStatus::Timeout, None, latency_ms)
    }

    pub fn error(agent_id: impl Into<AgentId>, message: impl Into<String>, latency_ms: u64) -> Self {
        Self::failed(agent_id, AgentStatus::Error, Some(message.into()), latency_ms)
    }

    fn failed(
        agent_id: impl Into<AgentId>,
        status: AgentStatus,
        error: Option<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            status,
            relevance_score: None,
            insights: Vec::new(),
            concerns: Vec::new(),
            suggested_actions: Vec::new(),
            latency_ms,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_clamps_relevance() {
        let result = AgentResult::success("cost", AgentReply::new(1.7), 120);
        assert!(result.is_success());
        assert_eq!(result.relevance_score, Some(1.0));

        let nan = AgentResult::success("cost", AgentReply::new(f64::NAN), 120);
        assert_eq!(nan.relevance_score, None);
    }

    #[test]
    fn test_failures_carry_no_relevance() {
        let timeout = AgentResult::timeout("infra", 8000);
        assert_eq!(timeout.status, AgentStatus::Timeout);
        assert!(timeout.relevance_score.is_none());

        let error = AgentResult::error("infra", "exit code 2", 15);
        assert_eq!(error.status, AgentStatus::Error);
        assert_eq!(error.error.as_deref(), Some("exit code 2"));
    }

    #[test]
    fn test_reply_deserializes_with_missing_fields() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"relevance_score": 0.4, "suggested_actions": ["scale-up"]}"#)
                .unwrap();
        assert_eq!(reply.relevance_score, Some(0.4));
        assert_eq!(reply.suggested_actions, vec![ActionId::new("scale-up")]);
        assert!(reply.insights.is_empty());
    }
}
