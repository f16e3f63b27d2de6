//! Session policy sections from TOML
//!
//! `[roster]`, `[council]`, `[execution]` and `[calibration]`.
//!
//! ```toml
//! [roster]
//! min_size = 4
//! max_size = 12
//!
//! [council]
//! pass_threshold = 0.95
//! conditional_threshold = 0.80
//! max_rounds = 4
//! reviewer_timeout_penalty = 0.05
//!
//! [execution]
//! session_deadline_ms = 8000
//! agent_timeout_ms = 3000
//! concurrency_cap = 8
//! quorum_floor = 0.8
//!
//! [calibration]
//! ema_decay = 0.9
//! queue_capacity = 64
//! ```

use council_application::ExecutionParams;
use council_domain::{
    CalibrationPolicy, ConfigIssue, ConfigIssueCode, CouncilPolicy, QuorumFloor, RosterPolicy,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRosterConfig {
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for FileRosterConfig {
    fn default() -> Self {
        let policy = RosterPolicy::default();
        Self {
            min_size: policy.min_size,
            max_size: policy.max_size,
        }
    }
}

impl FileRosterConfig {
    pub fn to_policy(&self) -> RosterPolicy {
        RosterPolicy::new(self.min_size, self.max_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    pub pass_threshold: f64,
    pub conditional_threshold: f64,
    pub max_rounds: u32,
    pub reviewer_timeout_penalty: f64,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        let policy = CouncilPolicy::default();
        Self {
            pass_threshold: policy.pass_threshold,
            conditional_threshold: policy.conditional_threshold,
            max_rounds: policy.max_rounds,
            reviewer_timeout_penalty: policy.reviewer_timeout_penalty,
        }
    }
}

impl FileCouncilConfig {
    pub fn to_policy(&self) -> CouncilPolicy {
        CouncilPolicy::default()
            .with_pass_threshold(self.pass_threshold)
            .with_conditional_threshold(self.conditional_threshold)
            .with_max_rounds(self.max_rounds)
            .with_reviewer_timeout_penalty(self.reviewer_timeout_penalty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub session_deadline_ms: u64,
    /// Per-call cap; unset means the remaining session budget
    pub agent_timeout_ms: Option<u64>,
    /// Worker pool size; unset means one worker per call
    pub concurrency_cap: Option<usize>,
    pub quorum_floor: f64,
    pub retry_failed: bool,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            session_deadline_ms: 8000,
            agent_timeout_ms: None,
            concurrency_cap: None,
            quorum_floor: QuorumFloor::default().value(),
            retry_failed: true,
        }
    }
}

impl FileExecutionConfig {
    /// Parse the quorum floor, falling back to the default with an error
    /// issue when it is out of range.
    pub fn parse_quorum_floor(&self) -> (QuorumFloor, Vec<ConfigIssue>) {
        match QuorumFloor::new(self.quorum_floor) {
            Ok(floor) => (floor, vec![]),
            Err(reason) => (
                QuorumFloor::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::QuorumFloorRange,
                    format!("execution.quorum_floor: {}", reason),
                )],
            ),
        }
    }

    pub fn to_params(&self, queue_capacity: usize) -> (ExecutionParams, Vec<ConfigIssue>) {
        let (floor, issues) = self.parse_quorum_floor();
        let mut params = ExecutionParams::default()
            .with_session_deadline(Duration::from_millis(self.session_deadline_ms))
            .with_agent_timeout(self.agent_timeout_ms.map(Duration::from_millis))
            .with_concurrency_cap(self.concurrency_cap)
            .with_quorum_floor(floor)
            .with_calibration_queue_capacity(queue_capacity);
        if !self.retry_failed {
            params = params.without_retry();
        }
        (params, issues)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCalibrationConfig {
    pub ema_decay: f64,
    pub top_k: usize,
    pub queue_capacity: usize,
}

impl Default for FileCalibrationConfig {
    fn default() -> Self {
        let policy = CalibrationPolicy::default();
        Self {
            ema_decay: policy.ema_decay,
            top_k: policy.top_k,
            queue_capacity: ExecutionParams::default().calibration_queue_capacity,
        }
    }
}

impl FileCalibrationConfig {
    pub fn to_policy(&self) -> CalibrationPolicy {
        CalibrationPolicy {
            ema_decay: self.ema_decay,
            top_k: self.top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_policies() {
        assert_eq!(FileRosterConfig::default().to_policy(), RosterPolicy::default());
        assert_eq!(FileCouncilConfig::default().to_policy(), CouncilPolicy::default());
        assert_eq!(
            FileCalibrationConfig::default().to_policy(),
            CalibrationPolicy::default()
        );

        let (params, issues) = FileExecutionConfig::default().to_params(64);
        assert!(issues.is_empty());
        assert_eq!(params.session_deadline, Duration::from_secs(8));
        assert!(params.retry_failed);
    }

    #[test]
    fn test_execution_deserialize() {
        let toml_str = r#"
[execution]
session_deadline_ms = 2500
agent_timeout_ms = 800
concurrency_cap = 3
quorum_floor = 0.75
retry_failed = false
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (params, issues) = config.execution.to_params(16);

        assert!(issues.is_empty());
        assert_eq!(params.session_deadline, Duration::from_millis(2500));
        assert_eq!(params.agent_timeout, Some(Duration::from_millis(800)));
        assert_eq!(params.concurrency_cap, Some(3));
        assert_eq!(params.quorum_floor.value(), 0.75);
        assert!(!params.retry_failed);
        assert_eq!(params.calibration_queue_capacity, 16);
    }

    #[test]
    fn test_quorum_floor_out_of_range() {
        let config = FileExecutionConfig {
            quorum_floor: 1.5,
            ..Default::default()
        };
        let (floor, issues) = config.parse_quorum_floor();
        assert_eq!(floor, QuorumFloor::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::QuorumFloorRange);
        assert!(issues[0].is_error());
    }
}
