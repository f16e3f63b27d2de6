//! Audit entry

use crate::agent::{AgentId, AgentResult};
use crate::core::error::CouncilError;
use crate::core::request::SessionId;
use crate::council::{CouncilSession, FinalVerdict};
use crate::orchestration::OrchestrationOutcome;
use crate::quorum::QuorumStatus;
use crate::roster::Roster;
use crate::synthesis::SynthesisReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Complete record of one orchestrated request.
///
/// Written once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub session_id: SessionId,
    pub turn: u32,
    /// Unix epoch milliseconds
    pub recorded_at_ms: u64,
    pub request: String,
    pub registry_version: u64,
    pub roster: Roster,
    pub results: Vec<AgentResult>,
    pub synthesis_report: SynthesisReport,
    pub council_session: CouncilSession,
    pub quorum: QuorumStatus,
    pub verdict: FinalVerdict,
    pub degraded: bool,
    #[serde(default)]
    pub warnings: Vec<CouncilError>,
    pub elapsed_ms: u64,
}

impl AuditEntry {
    pub fn from_outcome(request: &str, outcome: &OrchestrationOutcome, recorded_at_ms: u64) -> Self {
        Self {
            session_id: outcome.session_id.clone(),
            turn: outcome.turn,
            recorded_at_ms,
            request: request.to_string(),
            registry_version: outcome.registry_version,
            roster: outcome.roster.clone(),
            results: outcome.results.clone(),
            synthesis_report: outcome.synthesis_report.clone(),
            council_session: outcome.council_session.clone(),
            quorum: outcome.quorum,
            verdict: outcome.verdict,
            degraded: outcome.degraded,
            warnings: outcome.warnings.clone(),
            elapsed_ms: outcome.elapsed_ms,
        }
    }
}

/// Agents that sat on the roster of any recorded turn of `session`.
pub fn session_participants<'a>(
    entries: impl IntoIterator<Item = &'a AuditEntry>,
    session: &SessionId,
) -> BTreeSet<AgentId> {
    entries
        .into_iter()
        .filter(|entry| &entry.session_id == session)
        .flat_map(|entry| entry.roster.ids().cloned())
        .collect()
}
