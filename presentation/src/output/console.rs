//! Console output formatter for orchestration outcomes

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use council_domain::{
    AgentStatus, CouncilSession, FinalVerdict, OrchestrationOutcome, ReviewStatus, WeightRegistry,
};

/// Number of ranked actions shown in the summary
const SUMMARY_ACTIONS: usize = 3;

/// Formats orchestration outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(outcome: &OrchestrationOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Agent Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} (turn {})\n",
            "Session:".cyan().bold(),
            outcome.session_id,
            outcome.turn
        ));
        output.push_str(&format!(
            "{} {}   {} v{}   {} {}ms\n\n",
            "Verdict:".cyan().bold(),
            Self::verdict(outcome.verdict),
            "Registry:".dimmed(),
            outcome.registry_version,
            "Elapsed:".dimmed(),
            outcome.elapsed_ms
        ));

        // Roster
        output.push_str(&Self::section_header("Roster"));
        for (id, reason) in outcome.roster.members() {
            output.push_str(&format!("  {:<20} {}\n", id, reason.to_string().dimmed()));
        }
        if outcome.roster.exceeds_ceiling() {
            output.push_str(&format!(
                "  {}\n",
                "roster exceeds the configured ceiling".yellow()
            ));
        }

        // Agents
        output.push_str(&Self::section_header("Agent Results"));
        output.push_str(&format!("  {}\n", outcome.quorum));
        for result in &outcome.results {
            let relevance = result
                .relevance_score
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {} {:<20} relevance {:>5}  {:>6}ms\n",
                Self::status_mark(result.status),
                result.agent_id,
                relevance,
                result.latency_ms
            ));
            if let Some(error) = &result.error {
                output.push_str(&format!("      {}\n", error.red()));
            }
            for concern in &result.concerns {
                output.push_str(&format!("      ! {}\n", concern));
            }
        }

        // Synthesis
        output.push_str(&Self::section_header("Ranked Actions"));
        if outcome.ranked_actions().is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for (rank, action) in outcome.ranked_actions().iter().enumerate() {
            let supporters: Vec<&str> =
                action.supporting_agents.iter().map(|a| a.as_str()).collect();
            let marker = if action.mandatory_support { " *" } else { "" };
            output.push_str(&format!(
                "  {:>2}. {:<28} {:.3}{}  {}\n",
                rank + 1,
                action.action_id,
                action.score,
                marker,
                supporters.join(", ").dimmed()
            ));
        }

        // Council
        output.push_str(&Self::section_header("Council Review"));
        output.push_str(&Self::council(&outcome.council_session));

        // Warnings
        if !outcome.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "Warnings:".yellow().bold()));
            for warning in &outcome.warnings {
                output.push_str(&format!("  * {}\n", warning));
            }
        }
        if !outcome.audit_recorded {
            output.push_str(&format!("\n{}\n", "Audit entry was not recorded".red()));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &OrchestrationOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Verdict and the top actions (concise output)
    pub fn format_summary(outcome: &OrchestrationOutcome) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}",
            "Verdict:".bold(),
            Self::verdict(outcome.verdict)
        ));
        if let Some(quality) = outcome.final_quality() {
            output.push_str(&format!("  (quality {:.2})", quality));
        }
        if outcome.degraded {
            output.push_str(&format!("  {}", "[degraded]".yellow()));
        }
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Agents consulted:".dimmed(),
            outcome
                .roster
                .ids()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        for action in outcome.synthesis_report.top_actions(SUMMARY_ACTIONS) {
            output.push_str(&format!("  * {} ({:.3})\n", action.action_id, action.score));
        }

        output
    }

    /// Format a registry snapshot as a table
    pub fn format_registry(registry: &WeightRegistry) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} v{} ({} agents, total weight {:.6})\n\n",
            "Weight registry".cyan().bold(),
            registry.version(),
            registry.len(),
            registry.total_weight()
        ));
        output.push_str(&format!(
            "  {:<20} {:>8} {:>9} {:>9} {:>8}  {}\n",
            "agent", "weight", "accuracy", "contrib", "sessions", "triggers"
        ));
        for entry in registry.entries() {
            let id = if entry.spec.mandatory {
                format!("{} *", entry.spec.id)
            } else {
                entry.spec.id.to_string()
            };
            let triggers: Vec<&str> = entry.spec.trigger_keywords.iter().map(String::as_str).collect();
            output.push_str(&format!(
                "  {:<20} {:>8.4} {:>9.3} {:>9.3} {:>8}  {}\n",
                id,
                entry.base_weight(),
                entry.accuracy_ema,
                entry.contribution_ema,
                entry.sessions,
                triggers.join(", ").dimmed()
            ));
        }
        output
    }

    /// Format configuration sources (label, location, found) and the
    /// effective values.
    pub fn format_config<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str, bool)>,
        effective: &str,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Configuration sources (highest first):".bold()));
        for (label, location, found) in sources {
            let mark = if found { "v".green() } else { "-".dimmed() };
            output.push_str(&format!("  {} {:<9} {}\n", mark, label, location));
        }
        output.push_str(&format!("\n{}\n", "Effective configuration:".bold()));
        output.push_str(effective);
        output
    }

    fn council(session: &CouncilSession) -> String {
        if session.skipped {
            return format!("  {}\n", "skipped: no agent responded".yellow());
        }
        let mut output = String::new();
        for round in &session.rounds {
            output.push_str(&format!(
                "  Round {} quality {:.2} ({}/{} reviewers)\n",
                round.round_number,
                round.quality_score,
                round.completed_reviewers(),
                round.reviewer_outputs.len()
            ));
            for verdict in round.reviewer_outputs.values() {
                let mark = match verdict.status {
                    ReviewStatus::Completed => "v".green(),
                    ReviewStatus::Timeout => "t".yellow(),
                    ReviewStatus::Error => "x".red(),
                };
                output.push_str(&format!("    {} {}\n", mark, verdict.role.display_name()));
                for finding in &verdict.findings {
                    output.push_str(&format!("        {}\n", finding));
                }
            }
        }
        if session.deadline_exceeded {
            output.push_str(&format!("  {}\n", "closed by the session deadline".yellow()));
        }
        output
    }

    fn verdict(verdict: FinalVerdict) -> ColoredString {
        match verdict {
            FinalVerdict::Pass => verdict.as_str().green().bold(),
            FinalVerdict::Conditional => verdict.as_str().yellow().bold(),
            FinalVerdict::Fail => verdict.as_str().red().bold(),
        }
    }

    fn status_mark(status: AgentStatus) -> ColoredString {
        match status {
            AgentStatus::Success => "v".green(),
            AgentStatus::Timeout => "t".yellow(),
            AgentStatus::Error => "x".red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_summary(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format_summary(outcome)
    }
}
