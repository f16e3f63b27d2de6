//! Configuration issues detected at load time.
//!
//! Validation never stops at the first problem: every issue is collected so
//! the operator can fix the configuration in one pass. Any
//! [`Severity::Error`] issue rejects the configuration before a session runs.

use serde::Serialize;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssueCode {
    /// `min_size` is zero or above `max_size`.
    RosterBounds,
    /// More mandatory agents than the roster floor allows.
    FloorBelowMandatory,
    QuorumFloorRange,
    EmaDecayRange,
    /// Thresholds violate `0 < conditional ≤ pass ≤ 1`.
    ThresholdOrder,
    MaxRoundsZero,
    DeadlineZero,
    ConcurrencyCapZero,
    PenaltyRange,
    QueueCapacityZero,
    DuplicateAgent,
    EmptyAgentId,
    InvalidWeight,
    /// `depends_on` names an agent that is not configured.
    UnknownDependency,
    /// A reviewer role has no command configured.
    MissingReviewer,
    /// `[reviewers]` names a role that does not exist.
    UnknownReviewerRole,
    /// Agent has zero initial weight.
    ZeroWeightAgent,
    /// Agent is neither mandatory nor triggerable; only backfill reaches it.
    UntriggerableAgent,
    /// Per-agent timeout is longer than the whole session deadline.
    AgentTimeoutExceedsDeadline,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let issue = ConfigIssue::error(ConfigIssueCode::MaxRoundsZero, "council.max_rounds must be >= 1");
        assert!(issue.is_error());
        assert_eq!(issue.to_string(), "error: council.max_rounds must be >= 1");

        let issue = ConfigIssue::warning(ConfigIssueCode::ZeroWeightAgent, "agent 'x' has weight 0");
        assert!(!issue.is_error());
    }
}
