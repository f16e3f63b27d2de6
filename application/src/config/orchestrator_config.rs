//! Orchestrator configuration container.
//!
//! [`OrchestratorConfig`] groups the domain policies and execution
//! parameters a session needs. Use cases receive only the slices they use;
//! the container exists for wiring and for load-time validation.

use crate::config::ExecutionParams;
use council_domain::config::{ConfigIssue, ConfigIssueCode, Severity};
use council_domain::{AgentId, AgentSpec, CalibrationPolicy, CouncilPolicy, RosterPolicy};
use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration rejected at load time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    roster: RosterPolicy,
    council: CouncilPolicy,
    calibration: CalibrationPolicy,
    execution: ExecutionParams,
}

impl OrchestratorConfig {
    pub fn new(
        roster: RosterPolicy,
        council: CouncilPolicy,
        calibration: CalibrationPolicy,
        execution: ExecutionParams,
    ) -> Self {
        Self {
            roster,
            council,
            calibration,
            execution,
        }
    }

    // ==================== Accessors ====================

    pub fn roster(&self) -> &RosterPolicy {
        &self.roster
    }

    pub fn council(&self) -> &CouncilPolicy {
        &self.council
    }

    pub fn calibration(&self) -> &CalibrationPolicy {
        &self.calibration
    }

    pub fn execution(&self) -> &ExecutionParams {
        &self.execution
    }

    // ==================== Builder Methods ====================

    pub fn with_roster(mut self, roster: RosterPolicy) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_council(mut self, council: CouncilPolicy) -> Self {
        self.council = council;
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationPolicy) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionParams) -> Self {
        self.execution = execution;
        self
    }

    // ==================== Validation ====================

    /// Validate every parameter and the configured agents.
    ///
    /// Returns all issues found; an empty list means the configuration is
    /// usable as is.
    pub fn validate(&self, agents: &[AgentSpec]) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        self.validate_policies(&mut issues);
        validate_agents(agents, &mut issues);

        let mandatory = agents.iter().filter(|a| a.mandatory).count();
        if mandatory > self.roster.min_size {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::FloorBelowMandatory,
                format!(
                    "roster.min_size ({}) is below the number of mandatory agents ({})",
                    self.roster.min_size, mandatory
                ),
            ));
        }
        issues
    }

    fn validate_policies(&self, issues: &mut Vec<ConfigIssue>) {
        let roster = &self.roster;
        if roster.min_size == 0 || roster.min_size > roster.max_size {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::RosterBounds,
                format!(
                    "roster sizes must satisfy 1 <= min_size <= max_size (got {}..{})",
                    roster.min_size, roster.max_size
                ),
            ));
        }

        let council = &self.council;
        let ordered = council.conditional_threshold > 0.0
            && council.conditional_threshold <= council.pass_threshold
            && council.pass_threshold <= 1.0;
        if !ordered {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOrder,
                format!(
                    "council thresholds must satisfy 0 < conditional ({}) <= pass ({}) <= 1",
                    council.conditional_threshold, council.pass_threshold
                ),
            ));
        }
        if council.max_rounds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MaxRoundsZero,
                "council.max_rounds must be >= 1",
            ));
        }
        if !(0.0..=1.0).contains(&council.reviewer_timeout_penalty) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::PenaltyRange,
                format!(
                    "council.reviewer_timeout_penalty must be in [0, 1] (got {})",
                    council.reviewer_timeout_penalty
                ),
            ));
        }

        let decay = self.calibration.ema_decay;
        if !(0.0..1.0).contains(&decay) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmaDecayRange,
                format!("calibration.ema_decay must be in [0, 1) (got {})", decay),
            ));
        }

        let execution = &self.execution;
        if execution.session_deadline.is_zero() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DeadlineZero,
                "execution.session_deadline_ms must be > 0",
            ));
        }
        if execution.concurrency_cap == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ConcurrencyCapZero,
                "execution.concurrency_cap must be >= 1",
            ));
        }
        if execution.calibration_queue_capacity == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::QueueCapacityZero,
                "calibration.queue_capacity must be >= 1",
            ));
        }
        if let Some(timeout) = execution.agent_timeout
            && timeout > execution.session_deadline
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::AgentTimeoutExceedsDeadline,
                format!(
                    "execution.agent_timeout_ms ({}) exceeds the session deadline ({}); the deadline wins",
                    timeout.as_millis(),
                    execution.session_deadline.as_millis()
                ),
            ));
        }
    }

    /// Check whether any issues are errors (i.e. fatal).
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Validate and split the result: errors reject the configuration,
    /// warnings are handed back for logging.
    ///
    /// `upstream` carries issues found before this config existed (parse
    /// and conversion problems) so every issue is reported together.
    pub fn ensure_valid(
        &self,
        agents: &[AgentSpec],
        upstream: Vec<ConfigIssue>,
    ) -> Result<Vec<ConfigIssue>, ConfigError> {
        let mut issues = upstream;
        issues.extend(self.validate(agents));
        if Self::has_errors(&issues) {
            return Err(ConfigError::Invalid(
                issues.into_iter().filter(|i| i.is_error()).collect(),
            ));
        }
        Ok(issues)
    }
}

fn validate_agents(agents: &[AgentSpec], issues: &mut Vec<ConfigIssue>) {
    let mut seen: BTreeSet<&AgentId> = BTreeSet::new();
    for agent in agents {
        if agent.id.as_str().trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyAgentId,
                "agent id cannot be empty",
            ));
            continue;
        }
        if !seen.insert(&agent.id) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgent,
                format!("agent '{}' is configured more than once", agent.id),
            ));
        }
    }

    for agent in agents {
        let w = agent.base_weight;
        if !w.is_finite() || w < 0.0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidWeight,
                format!("agent '{}' has invalid weight {}", agent.id, w),
            ));
        } else if w == 0.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroWeightAgent,
                format!("agent '{}' has zero initial weight", agent.id),
            ));
        }

        for dep in agent.dependency_edges.iter().filter(|d| !seen.contains(d)) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownDependency,
                format!("agent '{}' depends on unknown agent '{}'", agent.id, dep),
            ));
        }

        if !agent.mandatory && agent.trigger_keywords.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UntriggerableAgent,
                format!(
                    "agent '{}' has no triggers and is not mandatory; it only joins as backfill",
                    agent.id
                ),
            ));
        }
    }
}
