//! Scripted gateways shared by the use case tests.

use crate::ports::agent_gateway::{AgentGateway, GatewayError};
use crate::ports::reviewer_gateway::ReviewerGateway;
use async_trait::async_trait;
use council_domain::{
    AgentId, AgentReply, AgentSpec, ContextSnapshot, Request, ReviewRequest, ReviewerReply,
    ReviewerRole, WeightRegistry,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
pub(crate) enum Behavior {
    Reply(AgentReply),
    Fail(String),
    /// Reply after sleeping
    Slow(Duration, AgentReply),
    /// Fail on the first call, reply afterwards
    FailFirst(AgentReply),
}

#[derive(Default)]
pub(crate) struct ScriptedAgents {
    behaviors: HashMap<AgentId, Behavior>,
    calls: Mutex<HashMap<AgentId, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedAgents {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, agent: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(AgentId::new(agent), behavior);
        self
    }

    pub(crate) fn calls(&self, agent: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&AgentId::new(agent))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentGateway for ScriptedAgents {
    async fn invoke(
        &self,
        agent: &AgentId,
        _request: &Request,
        _context: &ContextSnapshot,
    ) -> Result<AgentReply, GatewayError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(agent.clone()).or_insert(0);
            *n += 1;
            *n
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let behavior = self
            .behaviors
            .get(agent)
            .cloned()
            .unwrap_or_else(|| Behavior::Reply(AgentReply::new(0.5)));
        let result = match behavior {
            Behavior::Reply(reply) => Ok(reply),
            Behavior::Fail(message) => Err(GatewayError::RequestFailed(message)),
            Behavior::Slow(delay, reply) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Behavior::FailFirst(reply) if call > 1 => Ok(reply),
            Behavior::FailFirst(_) => Err(GatewayError::Unavailable("warming up".to_string())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Reviewers whose self-correction score follows a script, one value per round.
pub(crate) struct ScriptedReviewers {
    qualities: Vec<f64>,
    failing: BTreeSet<ReviewerRole>,
    delay: Option<Duration>,
    rounds_seen: Mutex<Vec<(u32, usize)>>,
}

impl ScriptedReviewers {
    pub(crate) fn new(qualities: &[f64]) -> Self {
        Self {
            qualities: qualities.to_vec(),
            failing: BTreeSet::new(),
            delay: None,
            rounds_seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self, role: ReviewerRole) -> Self {
        self.failing.insert(role);
        self
    }

    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(round_number, prior_rounds.len())` for each self-correction call.
    pub(crate) fn rounds_seen(&self) -> Vec<(u32, usize)> {
        self.rounds_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewerGateway for ScriptedReviewers {
    async fn review(
        &self,
        role: ReviewerRole,
        request: &ReviewRequest,
    ) -> Result<ReviewerReply, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&role) {
            return Err(GatewayError::RequestFailed(format!("{} crashed", role)));
        }
        if !role.produces_quality() {
            return Ok(ReviewerReply::default().with_finding(format!("{} ok", role)));
        }

        self.rounds_seen
            .lock()
            .unwrap()
            .push((request.round_number, request.prior_rounds.len()));
        let index = (request.round_number as usize).saturating_sub(1);
        let quality = self
            .qualities
            .get(index)
            .or(self.qualities.last())
            .copied()
            .unwrap_or(0.0);
        Ok(ReviewerReply::scored(quality))
    }
}

/// Registry of `n` equally weighted agents named `agent-0`, `agent-1`, ...
pub(crate) fn equal_registry(n: usize) -> WeightRegistry {
    WeightRegistry::from_specs((0..n).map(|i| AgentSpec::new(format!("agent-{i}"), 1.0)))
}

pub(crate) fn ids(registry: &WeightRegistry) -> Vec<AgentId> {
    registry.ids().cloned().collect()
}
