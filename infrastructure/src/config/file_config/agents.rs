//! Agent roster and reviewer commands from TOML (`[[agents]]`, `[reviewers]`)
//!
//! ```toml
//! [[agents]]
//! id = "security"
//! weight = 2.0
//! triggers = ["auth", "credentials", "secrets"]
//! depends_on = ["compliance"]
//! mandatory = true
//! command = ["python3", "agents/security.py"]
//!
//! [reviewers]
//! research = ["python3", "reviewers/research.py"]
//! self_correction = ["python3", "reviewers/self_correction.py"]
//! ```
//!
//! Weights are relative; they are renormalized to sum to 1 when the
//! registry is seeded.

use council_domain::{AgentId, AgentSpec, ConfigIssue, ConfigIssueCode, ReviewerRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `[[agents]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAgentConfig {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub mandatory: bool,
    /// Program and arguments; the agent is not callable when empty
    #[serde(default)]
    pub command: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl FileAgentConfig {
    pub fn to_spec(&self) -> AgentSpec {
        let spec = AgentSpec::new(self.id.trim(), self.weight)
            .with_triggers(self.triggers.iter().map(String::as_str))
            .with_dependencies(self.depends_on.iter().map(|d| d.trim()));
        if self.mandatory { spec.mandatory() } else { spec }
    }
}

/// `[reviewers]` table: role name → command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReviewersConfig(BTreeMap<String, Vec<String>>);

impl FileReviewersConfig {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse role names, reporting unknown roles.
    pub fn parse_commands(&self) -> (BTreeMap<ReviewerRole, Vec<String>>, Vec<ConfigIssue>) {
        let mut commands = BTreeMap::new();
        let mut issues = Vec::new();
        for (name, command) in &self.0 {
            match name.parse::<ReviewerRole>() {
                Ok(role) if !command.is_empty() => {
                    commands.insert(role, command.clone());
                }
                Ok(_) => {}
                Err(reason) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownReviewerRole,
                    format!("reviewers: {}", reason),
                )),
            }
        }
        (commands, issues)
    }

    /// Every role without a command, as errors.
    pub fn missing_roles(&self) -> Vec<ConfigIssue> {
        let (commands, _) = self.parse_commands();
        ReviewerRole::ALL
            .into_iter()
            .filter(|role| !commands.contains_key(role))
            .map(|role| {
                ConfigIssue::error(
                    ConfigIssueCode::MissingReviewer,
                    format!("reviewers.{} has no command configured", role.as_str()),
                )
            })
            .collect()
    }
}

impl<const N: usize> From<[(&str, Vec<String>); N]> for FileReviewersConfig {
    fn from(entries: [(&str, Vec<String>); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(role, command)| (role.to_string(), command))
                .collect(),
        )
    }
}

/// Agent commands keyed by id, skipping agents without one.
pub fn agent_commands(agents: &[FileAgentConfig]) -> BTreeMap<AgentId, Vec<String>> {
    agents
        .iter()
        .filter(|a| !a.command.is_empty())
        .map(|a| (AgentId::new(a.id.trim()), a.command.clone()))
        .collect()
}
