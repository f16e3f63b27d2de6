//! Subprocess gateway: one short-lived process per call
//!
//! Each agent and reviewer is an external program. The gateway writes a
//! single JSON document to the program's stdin, closes it, and reads one
//! JSON reply from stdout:
//!
//! ```text
//! agent    stdin  {"agent": "security", "request": {...}, "context": "..."}
//!          stdout {"relevance_score": 0.8, "suggested_actions": ["rotate-keys"], ...}
//! reviewer stdin  {"role": "red_flag", "review": {...}}
//!          stdout {"score": 0.9, "findings": ["..."]}
//! ```
//!
//! A non-zero exit status is a failed call; stderr is kept in the error.
//! Children are spawned with `kill_on_drop`, so a call abandoned by the
//! executor's deadline takes its process down with it.

use super::error::ProcessError;
use crate::config::{FileConfig, agent_commands};
use async_trait::async_trait;
use council_application::{AgentGateway, GatewayError, ReviewerGateway};
use council_domain::{
    AgentId, AgentReply, ContextSnapshot, Request, ReviewRequest, ReviewerReply, ReviewerRole,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Raw replies longer than this are cut in error messages
const MAX_RAW_IN_ERROR: usize = 512;

#[derive(Serialize)]
struct AgentPayload<'a> {
    agent: &'a AgentId,
    request: &'a Request,
    context: &'a ContextSnapshot,
}

#[derive(Serialize)]
struct ReviewPayload<'a> {
    role: ReviewerRole,
    review: &'a ReviewRequest,
}

/// Gateway that runs configured commands for agents and reviewers
#[derive(Debug, Clone, Default)]
pub struct ProcessGateway {
    agents: BTreeMap<AgentId, Vec<String>>,
    reviewers: BTreeMap<ReviewerRole, Vec<String>>,
}

impl ProcessGateway {
    pub fn new(
        agents: BTreeMap<AgentId, Vec<String>>,
        reviewers: BTreeMap<ReviewerRole, Vec<String>>,
    ) -> Self {
        Self { agents, reviewers }
    }

    /// Build from the `[[agents]]` commands and the `[reviewers]` table.
    pub fn from_config(config: &FileConfig) -> Self {
        let (reviewers, _) = config.reviewers.parse_commands();
        Self::new(agent_commands(&config.agents), reviewers)
    }

    pub fn with_agent(mut self, id: impl Into<AgentId>, command: Vec<String>) -> Self {
        self.agents.insert(id.into(), command);
        self
    }

    pub fn with_reviewer(mut self, role: ReviewerRole, command: Vec<String>) -> Self {
        self.reviewers.insert(role, command);
        self
    }

    pub fn has_agent(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// Run `command` with `payload` on stdin and parse stdout as `R`.
    async fn call<P, R>(&self, command: &[String], payload: &P) -> Result<R, ProcessError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let Some((program, args)) = command.split_first() else {
            return Err(ProcessError::NoCommand("empty command".to_string()));
        };

        let input = serde_json::to_vec(payload)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProcessError::Io(std::io::Error::other("Failed to capture stdin")))?;

        // Write and read concurrently so a chatty child cannot fill its
        // stdout pipe while we are still blocked on stdin.
        let write = async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            match result {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(ProcessError::ExitStatus {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(program = %program, bytes = stdout.len(), "Subprocess replied");
        serde_json::from_str(stdout.trim()).map_err(|e| ProcessError::Parse {
            error: e.to_string(),
            raw: truncate(&stdout, MAX_RAW_IN_ERROR),
        })
    }
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    let mut end = max;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}

#[async_trait]
impl AgentGateway for ProcessGateway {
    async fn invoke(
        &self,
        agent: &AgentId,
        request: &Request,
        context: &ContextSnapshot,
    ) -> Result<AgentReply, GatewayError> {
        let command = self
            .agents
            .get(agent)
            .ok_or_else(|| ProcessError::NoCommand(format!("agent '{}'", agent)))?;

        let payload = AgentPayload {
            agent,
            request,
            context,
        };
        self.call(command, &payload).await.map_err(|e| {
            warn!(agent = %agent, error = %e, "Agent subprocess failed");
            e.into()
        })
    }
}

#[async_trait]
impl ReviewerGateway for ProcessGateway {
    async fn review(
        &self,
        role: ReviewerRole,
        request: &ReviewRequest,
    ) -> Result<ReviewerReply, GatewayError> {
        let command = self
            .reviewers
            .get(&role)
            .ok_or_else(|| ProcessError::NoCommand(format!("reviewer '{}'", role.as_str())))?;

        let payload = ReviewPayload {
            role,
            review: request,
        };
        self.call(command, &payload).await.map_err(|e| {
            warn!(role = role.as_str(), round = request.round_number, error = %e, "Reviewer subprocess failed");
            e.into()
        })
    }
}
