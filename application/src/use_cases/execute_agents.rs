//! Execute Agents use case
//!
//! Dispatches one call per roster member through a bounded worker pool,
//! then checks the quorum and retries the failed subset once if needed.

use crate::config::ExecutionParams;
use crate::ports::agent_gateway::{AgentGateway, GatewayError};
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::shared::{SessionClock, cancelled, is_cancelled, millis};
use council_domain::{
    AgentId, AgentResult, AgentStatus, ContextSnapshot, CouncilError, Phase, QuorumStatus,
    Request, WeightRegistry,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Settled results of one dispatch, one per roster member, in agent-id order.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub results: Vec<AgentResult>,
    pub quorum: QuorumStatus,
    /// Recovered per-agent failures and a missed quorum, if any
    pub warnings: Vec<CouncilError>,
}

/// Use case for running the roster's agents concurrently
pub struct AgentExecutor<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> AgentExecutor<G> {
    pub fn new(gateway: Arc<G>, params: ExecutionParams) -> Self {
        Self {
            gateway,
            params,
            cancellation_token: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Invoke every agent in `agents` and settle all results.
    ///
    /// Never fails: timeouts, errors, cancellation and deadline expiry all
    /// become per-agent statuses. Agents the registry does not know are
    /// recorded as errors without being called.
    pub async fn execute(
        &self,
        agents: &[AgentId],
        registry: &WeightRegistry,
        request: &Arc<Request>,
        context: &Arc<ContextSnapshot>,
        clock: &SessionClock,
        progress: &dyn ProgressNotifier,
    ) -> DispatchOutcome {
        info!("Dispatching {} agents", agents.len());
        progress.on_phase_start(&Phase::Dispatch, agents.len());

        let mut results: BTreeMap<AgentId, AgentResult> = BTreeMap::new();
        let mut known = Vec::with_capacity(agents.len());
        for agent in agents {
            if registry.contains(agent) {
                known.push(agent.clone());
            } else {
                warn!(agent = %agent, "Agent is not in the registry");
                progress.on_task_complete(&Phase::Dispatch, agent.as_str(), false);
                let error = CouncilError::UnknownAgent {
                    agent: agent.to_string(),
                };
                results.insert(agent.clone(), AgentResult::error(agent.clone(), error.to_string(), 0));
            }
        }

        for result in self
            .dispatch(&known, request, context, clock, Phase::Dispatch, progress)
            .await
        {
            results.insert(result.agent_id.clone(), result);
        }
        progress.on_phase_complete(&Phase::Dispatch);

        let floor = self.params.quorum_floor;
        let total = results.len();
        let mut retried = false;

        if !floor.is_satisfied(count_successes(&results), total) && self.params.retry_failed {
            let failed: Vec<AgentId> = results
                .values()
                .filter(|r| !r.is_success() && registry.contains(&r.agent_id))
                .map(|r| r.agent_id.clone())
                .collect();

            if !failed.is_empty() && !clock.is_expired() && !is_cancelled(&self.cancellation_token) {
                info!(
                    "Quorum missed ({}/{}), retrying {} failed agents",
                    count_successes(&results),
                    total,
                    failed.len()
                );
                progress.on_phase_start(&Phase::Retry, failed.len());
                for result in self
                    .dispatch(&failed, request, context, clock, Phase::Retry, progress)
                    .await
                {
                    results.insert(result.agent_id.clone(), result);
                }
                progress.on_phase_complete(&Phase::Retry);
                retried = true;
            }
        }

        let results: Vec<AgentResult> = results.into_values().collect();
        let successes = results.iter().filter(|r| r.is_success()).count();
        let quorum = QuorumStatus::evaluate(floor, successes, total, retried);

        let mut warnings: Vec<CouncilError> = results
            .iter()
            .filter_map(|r| match r.status {
                AgentStatus::Success => None,
                AgentStatus::Timeout => Some(CouncilError::AgentTimeout {
                    agent: r.agent_id.to_string(),
                    elapsed_ms: r.latency_ms,
                }),
                AgentStatus::Error => Some(CouncilError::AgentCall {
                    agent: r.agent_id.to_string(),
                    message: r.error.clone().unwrap_or_default(),
                }),
            })
            .collect();

        if !quorum.met {
            warn!("Quorum not met: {}", quorum);
            warnings.push(CouncilError::QuorumNotMet {
                successes,
                total,
                floor: floor.value(),
            });
        }

        DispatchOutcome {
            results,
            quorum,
            warnings,
        }
    }

    /// One concurrent pass over `agents`.
    ///
    /// Returns exactly one result per agent. On cancellation or deadline
    /// expiry outstanding calls are aborted and recorded as timeouts.
    async fn dispatch(
        &self,
        agents: &[AgentId],
        request: &Arc<Request>,
        context: &Arc<ContextSnapshot>,
        clock: &SessionClock,
        phase: Phase,
        progress: &dyn ProgressNotifier,
    ) -> Vec<AgentResult> {
        if agents.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let pool = Arc::new(Semaphore::new(self.params.pool_size(agents.len())));
        let mut join_set = JoinSet::new();
        let mut pending: BTreeSet<AgentId> = agents.iter().cloned().collect();

        for agent in agents {
            let gateway = Arc::clone(&self.gateway);
            let pool = Arc::clone(&pool);
            let request = Arc::clone(request);
            let context = Arc::clone(context);
            let agent = agent.clone();
            let clock = *clock;
            let per_call = self.params.agent_timeout;

            join_set.spawn(async move {
                invoke_agent(gateway, pool, agent, request, context, clock, per_call).await
            });
        }

        let mut results = Vec::with_capacity(agents.len());
        let mut aborted = false;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(&self.cancellation_token) => {
                    warn!("Dispatch cancelled with {} agents outstanding", pending.len());
                    join_set.abort_all();
                    aborted = true;
                    break;
                }
                _ = tokio::time::sleep_until(clock.deadline()) => {
                    warn!("Session deadline reached with {} agents outstanding", pending.len());
                    join_set.abort_all();
                    aborted = true;
                    break;
                }
                joined = join_set.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(result) => {
                    match result.status {
                        AgentStatus::Success => debug!(
                            agent = %result.agent_id,
                            latency_ms = result.latency_ms,
                            "Agent responded"
                        ),
                        status => warn!(
                            agent = %result.agent_id,
                            status = %status,
                            error = result.error.as_deref().unwrap_or(""),
                            "Agent failed"
                        ),
                    }
                    progress.on_task_complete(&phase, result.agent_id.as_str(), result.is_success());
                    pending.remove(&result.agent_id);
                    results.push(result);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        let latency = millis(started.elapsed());
        for agent in pending {
            progress.on_task_complete(&phase, agent.as_str(), false);
            results.push(if aborted {
                AgentResult::timeout(agent, latency)
            } else {
                AgentResult::error(agent, "agent task failed", latency)
            });
        }
        results
    }
}

async fn invoke_agent<G: AgentGateway>(
    gateway: Arc<G>,
    pool: Arc<Semaphore>,
    agent: AgentId,
    request: Arc<Request>,
    context: Arc<ContextSnapshot>,
    clock: SessionClock,
    per_call: Option<Duration>,
) -> AgentResult {
    let Ok(_permit) = pool.acquire_owned().await else {
        return AgentResult::error(agent, "worker pool closed", 0);
    };

    let started = Instant::now();
    let budget = clock.call_budget(per_call);
    if budget.is_zero() {
        return AgentResult::timeout(agent, 0);
    }

    let outcome = tokio::time::timeout(budget, gateway.invoke(&agent, &request, &context)).await;
    let latency = millis(started.elapsed());
    match outcome {
        Ok(Ok(reply)) => AgentResult::success(agent, reply, latency),
        Ok(Err(GatewayError::Timeout)) | Err(_) => AgentResult::timeout(agent, latency),
        Ok(Err(e)) => AgentResult::error(agent, e.to_string(), latency),
    }
}

fn count_successes(results: &BTreeMap<AgentId, AgentResult>) -> usize {
    results.values().filter(|r| r.is_success()).count()
}
