//! Progress reporting for orchestration

use colored::Colorize;
use council_application::ProgressNotifier;
use council_domain::{CouncilRound, Phase};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during orchestration with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut bar) = self.phase_bar.lock() {
            f(&mut bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.display_name().to_string());
        pb.set_message("Starting...");

        self.with_bar(|bar| *bar = Some(pb));
    }

    fn on_task_complete(&self, _phase: &Phase, task: &str, success: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.as_ref() {
                let status = if success {
                    format!("{} {}", "v".green(), task)
                } else {
                    format!("{} {}", "x".red(), task)
                };
                pb.set_message(status);
                pb.inc(1);
            }
        });
    }

    fn on_phase_complete(&self, phase: &Phase) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(format!("{} complete", phase.as_str().green()));
            }
        });
    }

    fn on_council_round(&self, round: &CouncilRound) {
        let line = format!(
            "  round {} quality {:.2}",
            round.round_number, round.quality_score
        );
        // println would tear the bars
        let _ = self.multi.println(line);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            phase.display_name().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _phase: &Phase, task: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), task);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), task);
        }
    }

    fn on_phase_complete(&self, _phase: &Phase) {}

    fn on_council_round(&self, round: &CouncilRound) {
        eprintln!(
            "  {} round {} quality {:.2}",
            "=".cyan(),
            round.round_number,
            round.quality_score
        );
    }
}
