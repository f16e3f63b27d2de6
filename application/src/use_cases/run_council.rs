//! Run Council use case
//!
//! Drives the review loop over a synthesis report: every round fans out to
//! all reviewer roles, waits for each of them to settle, scores the round
//! and advances the [`CouncilSession`] state machine until it passes, runs
//! out of rounds, or the session deadline closes it.

use crate::config::ExecutionParams;
use crate::ports::agent_gateway::GatewayError;
use crate::ports::progress::ProgressNotifier;
use crate::ports::reviewer_gateway::ReviewerGateway;
use crate::use_cases::shared::{SessionClock, cancelled, is_cancelled, millis};
use council_domain::{
    CouncilPolicy, CouncilRound, CouncilSession, Phase, Request, ReviewRequest, ReviewerRole,
    ReviewerVerdict, SynthesisReport,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for the iterative review loop
pub struct CouncilRunner<R: ReviewerGateway + 'static> {
    reviewers: Arc<R>,
    policy: CouncilPolicy,
    reviewer_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl<R: ReviewerGateway + 'static> CouncilRunner<R> {
    pub fn new(reviewers: Arc<R>, policy: CouncilPolicy, params: &ExecutionParams) -> Self {
        Self {
            reviewers,
            policy,
            reviewer_timeout: params.agent_timeout,
            cancellation_token: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run rounds until the session reaches a terminal state.
    pub async fn execute(
        &self,
        request: &Request,
        report: &SynthesisReport,
        clock: &SessionClock,
        progress: &dyn ProgressNotifier,
    ) -> CouncilSession {
        let mut session = CouncilSession::new();

        while let Some(round_number) = session.current_round() {
            if clock.is_expired() || is_cancelled(&self.cancellation_token) {
                warn!(round = round_number, "No budget left to start council round");
                session.close_on_deadline(None);
                break;
            }

            info!(round = round_number, "Council round starting");
            progress.on_phase_start(&Phase::Council, ReviewerRole::ALL.len());

            let review = Arc::new(ReviewRequest {
                round_number,
                request: request.clone(),
                report: report.clone(),
                prior_rounds: session.rounds.clone(),
            });

            let (verdicts, interrupted) = self.review_round(&review, clock, progress).await;
            let round = CouncilRound::score(round_number, verdicts, &self.policy);
            progress.on_phase_complete(&Phase::Council);
            progress.on_council_round(&round);

            info!(
                round = round_number,
                quality = round.quality_score,
                completed = round.completed_reviewers(),
                "Council round scored"
            );

            if interrupted {
                session.close_on_deadline(Some(round));
            } else {
                session.record_round(round, &self.policy);
            }
        }

        info!(
            rounds = session.rounds.len(),
            state = ?session.state,
            deadline_exceeded = session.deadline_exceeded,
            "Council finished"
        );
        session
    }

    /// Ask every role once and wait for all of them (or the deadline).
    ///
    /// Returns one verdict per role and whether the round was cut short.
    async fn review_round(
        &self,
        review: &Arc<ReviewRequest>,
        clock: &SessionClock,
        progress: &dyn ProgressNotifier,
    ) -> (Vec<ReviewerVerdict>, bool) {
        let started = Instant::now();
        let mut join_set = JoinSet::new();

        for role in ReviewerRole::ALL {
            let reviewers = Arc::clone(&self.reviewers);
            let review = Arc::clone(review);
            let budget = clock.call_budget(self.reviewer_timeout);

            join_set.spawn(async move {
                let call_started = Instant::now();
                if budget.is_zero() {
                    return ReviewerVerdict::timeout(role, 0);
                }
                let outcome = tokio::time::timeout(budget, reviewers.review(role, &review)).await;
                let latency = millis(call_started.elapsed());
                match outcome {
                    Ok(Ok(reply)) => ReviewerVerdict::completed(role, reply, latency),
                    Ok(Err(GatewayError::Timeout)) | Err(_) => ReviewerVerdict::timeout(role, latency),
                    Ok(Err(e)) => ReviewerVerdict::error(role, e.to_string(), latency),
                }
            });
        }

        let mut settled: BTreeMap<ReviewerRole, ReviewerVerdict> = BTreeMap::new();
        let mut interrupted = false;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(&self.cancellation_token) => {
                    join_set.abort_all();
                    interrupted = true;
                    break;
                }
                _ = tokio::time::sleep_until(clock.deadline()) => {
                    join_set.abort_all();
                    interrupted = true;
                    break;
                }
                joined = join_set.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(verdict) => {
                    debug!(
                        role = verdict.role.as_str(),
                        status = ?verdict.status,
                        latency_ms = verdict.latency_ms,
                        "Reviewer settled"
                    );
                    progress.on_task_complete(&Phase::Council, verdict.role.as_str(), verdict.is_completed());
                    settled.insert(verdict.role, verdict);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        let latency = millis(started.elapsed());
        for role in ReviewerRole::ALL {
            if settled.contains_key(&role) {
                continue;
            }
            progress.on_task_complete(&Phase::Council, role.as_str(), false);
            let verdict = if interrupted {
                ReviewerVerdict::timeout(role, latency)
            } else {
                ReviewerVerdict::error(role, "reviewer task failed", latency)
            };
            settled.insert(role, verdict);
        }

        if interrupted {
            warn!(round = review.round_number, "Council round cut short");
        }
        (settled.into_values().collect(), interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::test_support::ScriptedReviewers;
    use council_domain::{CouncilState, FinalVerdict, ReviewStatus};

    fn request() -> Request {
        Request::new("review the rollout plan", "s-1").unwrap()
    }

    fn runner(reviewers: ScriptedReviewers) -> (Arc<ScriptedReviewers>, CouncilRunner<ScriptedReviewers>) {
        let reviewers = Arc::new(reviewers);
        let runner = CouncilRunner::new(
            Arc::clone(&reviewers),
            CouncilPolicy::default(),
            &ExecutionParams::default(),
        );
        (reviewers, runner)
    }

    async fn run(runner: &CouncilRunner<ScriptedReviewers>, budget: Duration) -> CouncilSession {
        let clock = SessionClock::start(budget);
        runner
            .execute(&request(), &SynthesisReport::default(), &clock, &NoProgress)
            .await
    }

    #[tokio::test]
    async fn test_scenario_c_passes_in_round_two() {
        let (reviewers, runner) = runner(ScriptedReviewers::new(&[0.70, 0.96]));

        let session = run(&runner, Duration::from_secs(5)).await;

        assert_eq!(session.state, CouncilState::Passed);
        assert_eq!(session.rounds.len(), 2);
        assert_eq!(session.verdict(&CouncilPolicy::default()), FinalVerdict::Pass);
        assert_eq!(reviewers.rounds_seen(), vec![(1, 0), (2, 1)]);
    }

    #[tokio::test]
    async fn test_exhausts_after_max_rounds() {
        let (_, runner) = runner(ScriptedReviewers::new(&[0.85]));

        let session = run(&runner, Duration::from_secs(5)).await;

        assert_eq!(session.state, CouncilState::Exhausted);
        assert_eq!(session.rounds.len(), 4);
        assert!(!session.deadline_exceeded);
        assert_eq!(
            session.verdict(&CouncilPolicy::default()),
            FinalVerdict::Conditional
        );
    }

    #[tokio::test]
    async fn test_failed_reviewer_costs_penalty() {
        let (_, runner) = runner(ScriptedReviewers::new(&[0.97]).failing(ReviewerRole::RedFlag));

        let session = run(&runner, Duration::from_secs(5)).await;

        let first = &session.rounds[0];
        assert!((first.quality_score - 0.92).abs() < 1e-9);
        assert_eq!(
            first.reviewer_outputs[&ReviewerRole::RedFlag].status,
            ReviewStatus::Error
        );
        assert_eq!(first.reviewer_outputs.len(), ReviewerRole::ALL.len());
        assert_eq!(session.state, CouncilState::Exhausted);
    }

    #[tokio::test]
    async fn test_deadline_closes_loop_with_partial_round() {
        let (_, runner) = runner(ScriptedReviewers::new(&[1.0]).slow(Duration::from_secs(10)));

        let started = std::time::Instant::now();
        let session = run(&runner, Duration::from_millis(100)).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(session.deadline_exceeded);
        assert_eq!(session.state, CouncilState::Exhausted);
        assert_eq!(session.rounds.len(), 1);
        assert!(session.rounds[0]
            .reviewer_outputs
            .values()
            .all(|v| v.status == ReviewStatus::Timeout));
        assert_eq!(session.verdict(&CouncilPolicy::default()), FinalVerdict::Fail);
    }

    #[tokio::test]
    async fn test_expired_clock_runs_no_round() {
        let (reviewers, runner) = runner(ScriptedReviewers::new(&[1.0]));

        let session = run(&runner, Duration::ZERO).await;

        assert!(session.rounds.is_empty());
        assert!(session.deadline_exceeded);
        assert!(reviewers.rounds_seen().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let token = CancellationToken::new();
        token.cancel();
        let (_, runner) = runner(ScriptedReviewers::new(&[0.5]));
        let runner = runner.with_cancellation(token);

        let session = run(&runner, Duration::from_secs(5)).await;
        assert!(session.is_terminal());
        assert!(session.rounds.is_empty());
    }
}
