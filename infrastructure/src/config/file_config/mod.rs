//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain policies and
//! application parameters by [`FileConfig::resolve`].

mod agents;
mod output;
mod policies;
mod storage;

pub use agents::{FileAgentConfig, FileReviewersConfig, agent_commands};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use policies::{
    FileCalibrationConfig, FileCouncilConfig, FileExecutionConfig, FileRosterConfig,
};
pub use storage::{FileLoggingConfig, FileStorageConfig};

use council_application::{ConfigError, OrchestratorConfig};
use council_domain::{AgentSpec, ConfigIssue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading or validation failure
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub roster: FileRosterConfig,
    pub council: FileCouncilConfig,
    pub execution: FileExecutionConfig,
    pub calibration: FileCalibrationConfig,
    pub storage: FileStorageConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
    pub agents: Vec<FileAgentConfig>,
    pub reviewers: FileReviewersConfig,
}

/// Validated configuration ready for wiring
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub orchestrator: OrchestratorConfig,
    pub agents: Vec<AgentSpec>,
    /// Non-fatal issues to report at startup
    pub warnings: Vec<ConfigIssue>,
}

impl FileConfig {
    pub fn agent_specs(&self) -> Vec<AgentSpec> {
        self.agents.iter().map(FileAgentConfig::to_spec).collect()
    }

    /// Whether agents are reached through subprocess commands.
    pub fn uses_subprocess_agents(&self) -> bool {
        self.agents.iter().any(|a| !a.command.is_empty())
    }

    /// Convert into application configuration, collecting conversion issues.
    pub fn to_orchestrator_config(&self) -> (OrchestratorConfig, Vec<ConfigIssue>) {
        let (execution, issues) = self
            .execution
            .to_params(self.calibration.queue_capacity);
        let config = OrchestratorConfig::new(
            self.roster.to_policy(),
            self.council.to_policy(),
            self.calibration.to_policy(),
            execution,
        );
        (config, issues)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Values that cannot be converted (quorum floor range)
    /// 2. Policy ranges and the agent roster
    /// 3. Reviewer commands (all six roles when agents run as subprocesses)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (config, mut issues) = self.to_orchestrator_config();
        issues.extend(config.validate(&self.agent_specs()));
        issues.extend(self.reviewer_issues());
        issues
    }

    fn reviewer_issues(&self) -> Vec<ConfigIssue> {
        let (_, mut issues) = self.reviewers.parse_commands();
        if self.uses_subprocess_agents() || !self.reviewers.is_empty() {
            issues.extend(self.reviewers.missing_roles());
        }
        issues
    }

    /// Validate and convert; any error-level issue rejects the configuration.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigValidationError> {
        let (orchestrator, mut upstream) = self.to_orchestrator_config();
        upstream.extend(self.reviewer_issues());
        let agents = self.agent_specs();
        let warnings = orchestrator.ensure_valid(&agents, upstream)?;
        Ok(ResolvedConfig {
            orchestrator,
            agents,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ConfigIssueCode;

    const FULL: &str = r#"
[roster]
min_size = 2
max_size = 6

[council]
pass_threshold = 0.9
max_rounds = 3

[execution]
session_deadline_ms = 5000

[calibration]
ema_decay = 0.8

[[agents]]
id = "security"
mandatory = true
command = ["sec"]

[[agents]]
id = "cost"
triggers = ["budget"]
command = ["cost"]

[reviewers]
research = ["r"]
critique = ["c"]
consensus = ["n"]
pros_cons = ["p"]
red_flag = ["f"]
self_correction = ["s"]
"#;

    #[test]
    fn test_deserialize_full_config() {
        let config: FileConfig = toml::from_str(FULL).unwrap();
        let resolved = config.resolve().unwrap();

        assert_eq!(resolved.orchestrator.roster().min_size, 2);
        assert_eq!(resolved.orchestrator.council().pass_threshold, 0.9);
        assert_eq!(resolved.orchestrator.council().conditional_threshold, 0.80);
        assert_eq!(resolved.orchestrator.calibration().ema_decay, 0.8);
        assert_eq!(resolved.agents.len(), 2);
        assert!(resolved.warnings.is_empty(), "{:?}", resolved.warnings);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.agents.is_empty());
        assert!(config.output.color);
        assert!(!config.uses_subprocess_agents());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_subprocess_agents_require_every_reviewer() {
        let config: FileConfig = toml::from_str(
            r#"
[roster]
min_size = 1

[[agents]]
id = "security"
mandatory = true
command = ["sec"]

[reviewers]
self_correction = ["s"]
"#,
        )
        .unwrap();

        let Err(ConfigValidationError::Invalid(ConfigError::Invalid(errors))) = config.resolve()
        else {
            panic!("missing reviewers must be rejected");
        };
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().all(|i| i.code == ConfigIssueCode::MissingReviewer));
    }

    #[test]
    fn test_every_issue_is_reported() {
        let config: FileConfig = toml::from_str(
            r#"
[roster]
min_size = 0

[execution]
quorum_floor = 0.0

[calibration]
ema_decay = 1.0
"#,
        )
        .unwrap();

        let codes: Vec<ConfigIssueCode> = config.validate().iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::QuorumFloorRange));
        assert!(codes.contains(&ConfigIssueCode::RosterBounds));
        assert!(codes.contains(&ConfigIssueCode::EmaDecayRange));
        assert!(config.resolve().is_err());
    }
}
