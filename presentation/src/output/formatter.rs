//! Output formatter trait

use council_domain::{OrchestrationOutcome, OutputFormat};

/// Trait for formatting orchestration outcomes
pub trait OutputFormatter {
    /// Roster, agent results, council rounds and verdict
    fn format(&self, outcome: &OrchestrationOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &OrchestrationOutcome) -> String;

    /// Verdict and top actions only (concise output)
    fn format_summary(&self, outcome: &OrchestrationOutcome) -> String;

    fn render(&self, outcome: &OrchestrationOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(outcome),
            OutputFormat::Summary => self.format_summary(outcome),
            OutputFormat::Json => self.format_json(outcome),
        }
    }
}
