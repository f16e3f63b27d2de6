//! Orchestration value objects

use crate::agent::{AgentResult, AgentStatus};
use crate::core::error::CouncilError;
use crate::core::request::SessionId;
use crate::council::{CouncilSession, FinalVerdict};
use crate::quorum::QuorumStatus;
use crate::roster::Roster;
use crate::synthesis::{RankedAction, SynthesisReport};
use serde::{Deserialize, Serialize};

/// Everything the caller gets back for one request.
///
/// Always a structured verdict: recoverable failures show up as
/// `degraded`, per-agent statuses and `warnings` rather than as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    pub session_id: SessionId,
    /// 1-based turn number within the session
    pub turn: u32,
    pub verdict: FinalVerdict,
    pub roster: Roster,
    pub results: Vec<AgentResult>,
    pub synthesis_report: SynthesisReport,
    pub council_session: CouncilSession,
    pub quorum: QuorumStatus,
    pub degraded: bool,
    /// Recovered errors, in the order they occurred
    #[serde(default)]
    pub warnings: Vec<CouncilError>,
    /// Registry snapshot the session was computed against
    pub registry_version: u64,
    pub audit_recorded: bool,
    pub elapsed_ms: u64,
}

impl OrchestrationOutcome {
    pub fn ranked_actions(&self) -> &[RankedAction] {
        &self.synthesis_report.ranked_actions
    }

    pub fn successful_agents(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn agents_with_status(&self, status: AgentStatus) -> impl Iterator<Item = &AgentResult> {
        self.results.iter().filter(move |r| r.status == status)
    }

    pub fn final_quality(&self) -> Option<f64> {
        self.council_session.final_quality()
    }
}
