//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use council_domain::AgentId;
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Roster, agent results, council rounds and verdict
    Full,
    /// Verdict and top actions only
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Summary => council_domain::OutputFormat::Summary,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "Route requests to specialist agents and review their consensus")]
#[command(long_about = r#"
Agent Council routes a request to a roster of specialist agents, merges their
answers into weighted, ranked actions and has a fixed council of reviewers
score the result.

Each request goes through:
1. Selection: mandatory, triggered, dependent and prior-turn agents
2. Dispatch: agents run in parallel under one session deadline
3. Synthesis: relevance-weighted ranking of suggested actions
4. Council: up to N review rounds until the quality threshold is met

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/agent-council/config.toml   Global config

Example:
  agent-council run "rotate the leaked database credentials"
  agent-council run --session ops-42 --prior-roster security,infra "now redeploy"
  agent-council registry show
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Orchestrate one request, or one per stdin line when none is given
    Run(RunArgs),

    /// Inspect or repair the weight registry
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },

    /// Submit accuracy feedback for a finished session
    Feedback(FeedbackArgs),

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The request text; reads successive turns from stdin when omitted
    pub request: Option<String>,

    /// Session id shared by every turn of a conversation
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Roster used on the previous turn (comma separated)
    #[arg(long, value_name = "AGENTS", value_delimiter = ',')]
    pub prior_roster: Vec<AgentId>,

    /// External accuracy for an agent, e.g. security=0.8 (repeatable)
    #[arg(long, value_name = "AGENT=SCORE", value_parser = parse_accuracy)]
    pub feedback_accuracy: Vec<(AgentId, f64)>,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Session the feedback belongs to
    #[arg(short, long, value_name = "ID")]
    pub session: String,

    /// Accuracy per agent, e.g. security=0.8
    #[arg(required = true, value_name = "AGENT=SCORE", value_parser = parse_accuracy)]
    pub accuracy: Vec<(AgentId, f64)>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryAction {
    /// Print the current registry snapshot
    Show,
    /// Renormalize a corrupted registry and write it back
    Repair,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print config sources and effective values
    Show,
}

/// Parse `agent=score` with the score in `[0, 1]`.
pub fn parse_accuracy(raw: &str) -> Result<(AgentId, f64), String> {
    let (agent, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected AGENT=SCORE, got '{}'", raw))?;
    let agent = agent.trim();
    if agent.is_empty() {
        return Err(format!("missing agent id in '{}'", raw));
    }
    let score: f64 = score
        .trim()
        .parse()
        .map_err(|_| format!("invalid score in '{}'", raw))?;
    if !(0.0..=1.0).contains(&score) {
        return Err(format!("score must be within [0, 1], got {}", score));
    }
    Ok((AgentId::new(agent), score))
}
