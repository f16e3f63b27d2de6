//! Progress notification port
//!
//! Defines the interface for reporting progress while a request is
//! orchestrated.

use council_domain::{CouncilRound, Phase};

/// Callback for progress updates during orchestration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize);

    /// Called when a task (an agent or a reviewer call) completes within a phase
    fn on_task_complete(&self, phase: &Phase, task: &str, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &Phase);

    /// Called after each council round has been scored.
    fn on_council_round(&self, _round: &CouncilRound) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: &Phase, _task: &str, _success: bool) {}
    fn on_phase_complete(&self, _phase: &Phase) {}
}
