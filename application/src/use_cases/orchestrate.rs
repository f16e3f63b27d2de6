//! Orchestrate use case
//!
//! Runs one request end to end: roster selection, parallel agent dispatch
//! with quorum handling, weighted synthesis, the council review loop and
//! the audit record. Calibration is handed off to a background worker.

use crate::config::OrchestratorConfig;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::audit_log::{AuditLog, NoAuditLog};
use crate::ports::context_provider::{ContextProvider, NoContext};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reviewer_gateway::ReviewerGateway;
use crate::registry::SharedRegistry;
use crate::session_cache::SessionRosterCache;
use crate::use_cases::calibrate::CalibrationHandle;
use crate::use_cases::execute_agents::AgentExecutor;
use crate::use_cases::run_council::CouncilRunner;
use crate::use_cases::shared::{SessionClock, cancelled, unix_millis};
use council_domain::{
    AgentId, AuditEntry, ContextSnapshot, CouncilError, CouncilSession, OrchestrationOutcome,
    Phase, Request, RosterSelector, SessionOutcome, synthesize,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that abort a session before any verdict is produced
#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error(transparent)]
    Council(#[from] CouncilError),
}

impl OrchestrateError {
    pub fn council_error(&self) -> &CouncilError {
        match self {
            OrchestrateError::Council(e) => e,
        }
    }
}

/// Input for the Orchestrate use case
#[derive(Debug, Clone)]
pub struct OrchestrateInput {
    pub request: Request,
    /// Externally observed accuracy per agent, forwarded to calibration
    pub accuracy: BTreeMap<AgentId, f64>,
}

impl OrchestrateInput {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            accuracy: BTreeMap::new(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: BTreeMap<AgentId, f64>) -> Self {
        self.accuracy = accuracy;
        self
    }
}

/// Use case for orchestrating one request through the council
pub struct OrchestrateUseCase<G: AgentGateway + 'static, R: ReviewerGateway + 'static> {
    gateway: Arc<G>,
    reviewers: Arc<R>,
    registry: Arc<SharedRegistry>,
    context: Arc<dyn ContextProvider>,
    audit: Arc<dyn AuditLog>,
    sessions: Arc<SessionRosterCache>,
    calibration: Option<CalibrationHandle>,
    config: OrchestratorConfig,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static, R: ReviewerGateway + 'static> OrchestrateUseCase<G, R> {
    pub fn new(
        gateway: Arc<G>,
        reviewers: Arc<R>,
        registry: Arc<SharedRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            reviewers,
            registry,
            context: Arc::new(NoContext),
            audit: Arc::new(NoAuditLog),
            sessions: Arc::new(SessionRosterCache::new()),
            calibration: None,
            config,
            cancellation_token: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_context_provider(mut self, context: Arc<dyn ContextProvider>) -> Self {
        self.context = context;
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Share a roster cache between several use case instances.
    pub fn with_session_cache(mut self, sessions: Arc<SessionRosterCache>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_calibration(mut self, handle: CalibrationHandle) -> Self {
        self.calibration = Some(handle);
        self
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: OrchestrateInput,
    ) -> Result<OrchestrationOutcome, OrchestrateError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// Fails only on fatal conditions (corrupted registry, registry smaller
    /// than the roster floor). Everything else degrades into the outcome.
    pub async fn execute_with_progress(
        &self,
        input: OrchestrateInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<OrchestrationOutcome, OrchestrateError> {
        let execution = self.config.execution();
        let clock = SessionClock::start(execution.session_deadline);
        let OrchestrateInput { request, accuracy } = input;
        let session_id = request.session_id().clone();

        let registry = self.registry.snapshot();
        registry.validate()?;

        // Selection
        progress.on_phase_start(&Phase::Selection, 1);
        let prior = self.sessions.prior(&session_id, request.prior_roster());
        let selector = RosterSelector::new(*self.config.roster());
        let roster = selector.select(&request, &prior.roster, &registry)?;
        progress.on_phase_complete(&Phase::Selection);

        info!(
            session = %session_id,
            turn = prior.turn,
            roster = roster.len(),
            registry_version = registry.version(),
            "Roster selected"
        );
        if roster.exceeds_ceiling() {
            warn!(
                session = %session_id,
                size = roster.len(),
                max = selector.policy().max_size,
                "Roster exceeds the ceiling to keep prior-turn members"
            );
        }

        // The fetch spends session budget like any outbound call
        let context = tokio::select! {
            fetched = tokio::time::timeout(clock.remaining(), self.context.snapshot(&request)) => {
                match fetched {
                    Ok(Ok(snapshot)) => snapshot,
                    Ok(Err(e)) => {
                        warn!(session = %session_id, "Context unavailable, continuing without: {}", e);
                        ContextSnapshot::empty()
                    }
                    Err(_) => {
                        warn!(session = %session_id, "Context fetch hit the session deadline, continuing without");
                        ContextSnapshot::empty()
                    }
                }
            }
            _ = cancelled(&self.cancellation_token) => {
                warn!(session = %session_id, "Cancelled while fetching context, continuing without");
                ContextSnapshot::empty()
            }
        };

        // Dispatch (and retry)
        let request = Arc::new(request);
        let mut executor = AgentExecutor::new(Arc::clone(&self.gateway), execution.clone());
        if let Some(token) = &self.cancellation_token {
            executor = executor.with_cancellation(token.clone());
        }
        let dispatch = executor
            .execute(
                &roster.to_ids(),
                &registry,
                &request,
                &Arc::new(context),
                &clock,
                progress,
            )
            .await;
        let mut warnings = dispatch.warnings;

        // Synthesis
        progress.on_phase_start(&Phase::Synthesis, 1);
        let report = synthesize(&dispatch.results, &registry);
        progress.on_phase_complete(&Phase::Synthesis);
        if report.degraded && !report.is_empty() {
            warn!(session = %session_id, "Degenerate synthesis, equal weights applied");
            warnings.push(CouncilError::DegenerateSynthesis);
        }
        debug!(
            session = %session_id,
            responding = report.responding_agents(),
            actions = report.ranked_actions.len(),
            "Synthesis complete"
        );

        // Council
        let council = if report.is_empty() {
            warn!(session = %session_id, "No agent responded, skipping council");
            CouncilSession::skipped()
        } else {
            let mut runner = CouncilRunner::new(
                Arc::clone(&self.reviewers),
                *self.config.council(),
                execution,
            );
            if let Some(token) = &self.cancellation_token {
                runner = runner.with_cancellation(token.clone());
            }
            runner.execute(&request, &report, &clock, progress).await
        };

        let verdict = council.verdict(self.config.council());
        let degraded = !dispatch.quorum.met
            || report.degraded
            || council.skipped
            || council.deadline_exceeded;

        let mut outcome = OrchestrationOutcome {
            session_id: session_id.clone(),
            turn: prior.turn,
            verdict,
            roster,
            results: dispatch.results,
            synthesis_report: report,
            council_session: council,
            quorum: dispatch.quorum,
            degraded,
            warnings,
            registry_version: registry.version(),
            audit_recorded: false,
            elapsed_ms: clock.elapsed_ms(),
        };

        // Audit
        progress.on_phase_start(&Phase::Audit, 1);
        let entry = AuditEntry::from_outcome(request.text(), &outcome, unix_millis());
        match self.audit.append(&entry).await {
            Ok(()) => outcome.audit_recorded = true,
            Err(e) => error!(session = %session_id, "Failed to append audit entry: {}", e),
        }
        progress.on_task_complete(&Phase::Audit, session_id.as_str(), outcome.audit_recorded);
        progress.on_phase_complete(&Phase::Audit);

        self.sessions.record(&session_id, &outcome.roster);

        if let Some(calibration) = &self.calibration {
            let quality = if outcome.council_session.skipped {
                0.0
            } else {
                outcome.final_quality().unwrap_or(0.0)
            };
            calibration.submit(SessionOutcome {
                session_id: session_id.clone(),
                results: outcome.results.clone(),
                report: outcome.synthesis_report.clone(),
                quality,
                accuracy,
            });
        }

        info!(
            session = %session_id,
            verdict = %outcome.verdict,
            degraded = outcome.degraded,
            elapsed_ms = outcome.elapsed_ms,
            "Session complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionParams;
    use crate::ports::audit_log::InMemoryAuditLog;
    use crate::ports::context_provider::ContextError;
    use crate::ports::registry_store::{InMemoryRegistryStore, StoreError};
    use crate::use_cases::calibrate::CalibrateUseCase;
    use crate::use_cases::test_support::{Behavior, ScriptedAgents, ScriptedReviewers};
    use async_trait::async_trait;
    use council_domain::{
        AgentReply, AgentSpec, AgentStatus, CalibrationPolicy, CouncilState, FinalVerdict,
        RegistryEntry, WeightRegistry,
    };
    use std::time::Duration;

    struct FailingAuditLog;

    #[async_trait]
    impl AuditLog for FailingAuditLog {
        async fn append(&self, _entry: &AuditEntry) -> Result<(), StoreError> {
            Err(StoreError::Other("disk full".to_string()))
        }
    }

    struct SlowContext(Duration);

    #[async_trait]
    impl ContextProvider for SlowContext {
        async fn snapshot(&self, _request: &Request) -> Result<ContextSnapshot, ContextError> {
            tokio::time::sleep(self.0).await;
            Ok(ContextSnapshot::empty())
        }
    }

    fn with_deadline(deadline: Duration) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_execution(ExecutionParams::default().with_session_deadline(deadline))
    }

    fn specs() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new("security", 1.0).mandatory(),
            AgentSpec::new("cost", 1.0).with_triggers(["budget"]),
            AgentSpec::new("infra", 1.0).with_triggers(["deploy"]),
            AgentSpec::new("compliance", 1.0).with_triggers(["gdpr"]),
            AgentSpec::new("perf", 1.0).with_triggers(["latency"]),
            AgentSpec::new("data", 1.0).with_triggers(["schema"]),
        ]
    }

    fn shared(registry: WeightRegistry) -> Arc<SharedRegistry> {
        Arc::new(SharedRegistry::new(
            registry,
            Arc::new(InMemoryRegistryStore::new()),
        ))
    }

    fn usecase(
        agents: ScriptedAgents,
        qualities: &[f64],
    ) -> OrchestrateUseCase<ScriptedAgents, ScriptedReviewers> {
        OrchestrateUseCase::new(
            Arc::new(agents),
            Arc::new(ScriptedReviewers::new(qualities)),
            shared(WeightRegistry::from_specs(specs())),
            OrchestratorConfig::default(),
        )
    }

    fn input(text: &str) -> OrchestrateInput {
        OrchestrateInput::new(Request::new(text, "s-1").unwrap())
    }

    #[tokio::test]
    async fn test_full_session_passes_and_is_audited() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let usecase = usecase(
            ScriptedAgents::new().with(
                "cost",
                Behavior::Reply(AgentReply::new(0.9).with_actions(["trim-reserved-instances"])),
            ),
            &[0.97],
        )
        .with_audit_log(audit.clone());

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert_eq!(outcome.verdict, FinalVerdict::Pass);
        assert!(!outcome.degraded);
        assert_eq!(outcome.turn, 1);
        assert_eq!(outcome.roster.len(), 4);
        assert!(outcome.roster.contains(&AgentId::new("security")));
        assert!(outcome.roster.contains(&AgentId::new("cost")));
        assert_eq!(outcome.ranked_actions()[0].action_id.as_str(), "trim-reserved-instances");
        assert!(outcome.audit_recorded);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].request, "cut the budget");
        assert_eq!(entries[0].verdict, FinalVerdict::Pass);
    }

    #[tokio::test]
    async fn test_roster_grows_monotonically_across_turns() {
        let usecase = usecase(ScriptedAgents::new(), &[0.97]);

        let first = usecase.execute(input("cut the budget")).await.unwrap();
        let second = usecase.execute(input("deploy on friday")).await.unwrap();

        assert_eq!(second.turn, 2);
        assert!(second.roster.is_superset_of(first.roster.ids()));
        assert!(second.roster.contains(&AgentId::new("infra")));
    }

    #[tokio::test]
    async fn test_insufficient_agents_is_fatal() {
        let usecase = OrchestrateUseCase::new(
            Arc::new(ScriptedAgents::new()),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            shared(WeightRegistry::from_specs(specs().into_iter().take(2))),
            OrchestratorConfig::default(),
        );

        let err = usecase.execute(input("anything")).await.unwrap_err();
        assert!(matches!(
            err.council_error(),
            CouncilError::InsufficientAgents {
                available: 2,
                required: 4
            }
        ));
        assert!(err.council_error().is_fatal());
    }

    #[tokio::test]
    async fn test_corrupted_registry_is_fatal() {
        let corrupted = WeightRegistry::from_entries(
            1,
            specs().into_iter().map(RegistryEntry::new),
        );
        let usecase = OrchestrateUseCase::new(
            Arc::new(ScriptedAgents::new()),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            shared(corrupted),
            OrchestratorConfig::default(),
        );

        let err = usecase.execute(input("anything")).await.unwrap_err();
        assert!(matches!(
            err.council_error(),
            CouncilError::RegistryCorruption { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_responses_skips_council_and_fails() {
        let mut agents = ScriptedAgents::new();
        for spec in specs() {
            agents = agents.with(spec.id.as_str(), Behavior::Fail("offline".to_string()));
        }
        let reviewers = Arc::new(ScriptedReviewers::new(&[1.0]));
        let usecase = OrchestrateUseCase::new(
            Arc::new(agents),
            Arc::clone(&reviewers),
            shared(WeightRegistry::from_specs(specs())),
            OrchestratorConfig::default(),
        );

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert_eq!(outcome.verdict, FinalVerdict::Fail);
        assert!(outcome.degraded);
        assert!(outcome.council_session.skipped);
        assert_eq!(outcome.council_session.state, CouncilState::Exhausted);
        assert!(outcome.synthesis_report.is_empty());
        assert!(reviewers.rounds_seen().is_empty());
        assert!(outcome.quorum.retried);
        assert_eq!(
            outcome.agents_with_status(AgentStatus::Error).count(),
            outcome.roster.len()
        );
    }

    #[tokio::test]
    async fn test_zero_relevance_is_degraded_with_equal_weights() {
        let mut agents = ScriptedAgents::new();
        for spec in specs() {
            agents = agents.with(spec.id.as_str(), Behavior::Reply(AgentReply::new(0.0)));
        }
        let usecase = usecase(agents, &[0.97]);

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert!(outcome.degraded);
        assert!(outcome.warnings.contains(&CouncilError::DegenerateSynthesis));
        let weights: Vec<f64> = outcome.synthesis_report.final_weights.values().copied().collect();
        assert!(weights.iter().all(|w| (w - 0.25).abs() < 1e-9));
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_session() {
        let usecase = usecase(ScriptedAgents::new(), &[0.97]).with_audit_log(Arc::new(FailingAuditLog));

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert!(!outcome.audit_recorded);
        assert_eq!(outcome.verdict, FinalVerdict::Pass);
    }

    #[tokio::test]
    async fn test_outcome_is_calibrated_in_background() {
        let registry = shared(WeightRegistry::from_specs(specs()));
        let calibrate = CalibrateUseCase::new(Arc::clone(&registry), CalibrationPolicy::default());
        let (handle, worker) = calibrate.spawn(4);

        let usecase = OrchestrateUseCase::new(
            Arc::new(ScriptedAgents::new().with("cost", Behavior::Reply(AgentReply::new(1.0)))),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            Arc::clone(&registry),
            OrchestratorConfig::default(),
        )
        .with_calibration(handle);

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();
        assert_eq!(outcome.registry_version, 0);

        drop(usecase);
        worker.await.unwrap();

        let after = registry.snapshot();
        assert_eq!(after.version(), 1);
        assert!(after.base_weight(&AgentId::new("cost")) > after.base_weight(&AgentId::new("perf")));
    }

    #[tokio::test]
    async fn test_partial_quorum_still_reaches_council() {
        let agents = ScriptedAgents::new()
            .with("security", Behavior::Fail("offline".to_string()))
            .with(
                "cost",
                Behavior::Reply(AgentReply::new(0.9).with_actions(["trim-reserved-instances"])),
            );
        let audit = Arc::new(InMemoryAuditLog::new());
        let reviewers = Arc::new(ScriptedReviewers::new(&[0.97]));
        let agents = Arc::new(agents);
        let usecase = OrchestrateUseCase::new(
            Arc::clone(&agents),
            Arc::clone(&reviewers),
            shared(WeightRegistry::from_specs(specs())),
            OrchestratorConfig::default(),
        )
        .with_audit_log(audit.clone());

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        // 3 of 4 is below the 0.8 floor; the failed agent is retried once
        assert!(!outcome.quorum.met);
        assert!(outcome.quorum.retried);
        assert_eq!(outcome.quorum.successes, 3);
        assert_eq!(agents.calls("security"), 2);

        assert_eq!(outcome.synthesis_report.responding_agents(), 3);
        assert!(!outcome.synthesis_report.final_weights.contains_key(&AgentId::new("security")));
        assert_eq!(outcome.ranked_actions()[0].action_id.as_str(), "trim-reserved-instances");

        assert!(!outcome.council_session.skipped);
        assert_eq!(reviewers.rounds_seen().len(), 1);
        assert_eq!(outcome.verdict, FinalVerdict::Pass);
        assert!(outcome.degraded);
        assert!(outcome.audit_recorded);
        assert_eq!(audit.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_mid_dispatch_returns_partial_outcome() {
        let token = CancellationToken::new();
        let agents = Arc::new(ScriptedAgents::new().with(
            "cost",
            Behavior::Slow(Duration::from_secs(5), AgentReply::new(0.9)),
        ));
        let audit = Arc::new(InMemoryAuditLog::new());
        let usecase = OrchestrateUseCase::new(
            Arc::clone(&agents),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            shared(WeightRegistry::from_specs(specs())),
            OrchestratorConfig::default(),
        )
        .with_audit_log(audit.clone())
        .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        let started = tokio::time::Instant::now();
        let outcome = usecase.execute(input("cut the budget")).await.unwrap();
        canceller.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        let cost = outcome
            .results
            .iter()
            .find(|r| r.agent_id.as_str() == "cost")
            .unwrap();
        assert_eq!(cost.status, AgentStatus::Timeout);
        assert_eq!(agents.calls("cost"), 1);
        assert_eq!(outcome.synthesis_report.responding_agents(), 3);
        assert!(outcome.council_session.deadline_exceeded);
        assert_eq!(outcome.verdict, FinalVerdict::Fail);
        assert!(outcome.degraded);
        assert!(outcome.audit_recorded);
        assert_eq!(audit.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_session_deadline_mid_dispatch_returns_partial_outcome() {
        let usecase = OrchestrateUseCase::new(
            Arc::new(ScriptedAgents::new().with(
                "cost",
                Behavior::Slow(Duration::from_secs(5), AgentReply::new(0.9)),
            )),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            shared(WeightRegistry::from_specs(specs())),
            with_deadline(Duration::from_millis(200)),
        );

        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert!(outcome.elapsed_ms < 1000);
        assert_eq!(outcome.agents_with_status(AgentStatus::Timeout).count(), 1);
        assert_eq!(outcome.synthesis_report.responding_agents(), 3);
        assert!(outcome.council_session.deadline_exceeded);
        assert!(outcome.degraded);
        assert!(outcome.audit_recorded);
    }

    #[tokio::test]
    async fn test_slow_context_is_bounded_by_session_deadline() {
        let usecase = OrchestrateUseCase::new(
            Arc::new(ScriptedAgents::new()),
            Arc::new(ScriptedReviewers::new(&[1.0])),
            shared(WeightRegistry::from_specs(specs())),
            with_deadline(Duration::from_millis(200)),
        )
        .with_context_provider(Arc::new(SlowContext(Duration::from_secs(3))));

        let started = tokio::time::Instant::now();
        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(outcome.elapsed_ms < 1000);
        assert!(outcome.degraded);
        assert_eq!(outcome.verdict, FinalVerdict::Fail);
        assert!(outcome.audit_recorded);
    }

    #[tokio::test]
    async fn test_cancellation_during_context_fetch_is_prompt() {
        let token = CancellationToken::new();
        token.cancel();
        let usecase = usecase(ScriptedAgents::new(), &[1.0])
            .with_context_provider(Arc::new(SlowContext(Duration::from_secs(3))))
            .with_cancellation(token);

        let started = tokio::time::Instant::now();
        let outcome = usecase.execute(input("cut the budget")).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(outcome.degraded);
    }
}
