//! Reviewer inputs and outputs

use super::role::ReviewerRole;
use super::round::CouncilRound;
use crate::core::request::Request;
use crate::synthesis::SynthesisReport;
use serde::{Deserialize, Serialize};

/// Everything a reviewer sees in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub round_number: u32,
    pub request: Request,
    pub report: SynthesisReport,
    /// Outputs of every earlier round, oldest first
    pub prior_rounds: Vec<CouncilRound>,
}

/// Payload returned by a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerReply {
    /// Quality estimate in `[0, 1]`; only read from the self-correction role
    pub score: Option<f64>,
    pub findings: Vec<String>,
}

impl ReviewerReply {
    pub fn scored(score: f64) -> Self {
        Self {
            score: Some(score),
            findings: Vec::new(),
        }
    }

    pub fn with_finding(mut self, finding: impl Into<String>) -> Self {
        self.findings.push(finding.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Completed,
    Timeout,
    Error,
}

/// One reviewer's output for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerVerdict {
    pub role: ReviewerRole,
    pub status: ReviewStatus,
    pub score: Option<f64>,
    #[serde(default)]
    pub findings: Vec<String>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewerVerdict {
    pub fn completed(role: ReviewerRole, reply: ReviewerReply, latency_ms: u64) -> Self {
        Self {
            role,
            status: ReviewStatus::Completed,
            score: reply
                .score
                .filter(|s| s.is_finite())
                .map(|s| s.clamp(0.0, 1.0)),
            findings: reply.findings,
            latency_ms,
            error: None,
        }
    }

    pub fn timeout(role: ReviewerRole, latency_ms: u64) -> Self {
        Self {
            role,
            status: ReviewStatus::Timeout,
            score: None,
            findings: Vec::new(),
            latency_ms,
            error: None,
        }
    }

    pub fn error(role: ReviewerRole, message: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            role,
            status: ReviewStatus::Error,
            score: None,
            findings: Vec::new(),
            latency_ms,
            error: Some(message.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReviewStatus::Completed
    }
}
