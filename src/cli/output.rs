//! CLI output formatting

use crate::core::ResumeDecision;
use crate::execution::RunEvent;
use crate::persistence::RunSummary;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static GATE: Emoji<'_, '_> = Emoji("🚧 ", "| ");

/// Create a progress bar sized to the pipeline's step count
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted {
            run_id,
            workflow,
            total_steps,
        } => format!(
            "{} Starting {} ({}, {} steps)",
            ROCKET,
            style(workflow).bold(),
            style(&run_id.to_string()[..8]).dim(),
            total_steps
        ),
        RunEvent::StepStarted { step, index, total } => format!(
            "{} {} ({}/{})",
            SPINNER,
            style(step).cyan(),
            index + 1,
            total
        ),
        RunEvent::StepCompleted { step, artifacts } => {
            if *artifacts > 0 {
                format!(
                    "{} {} ({} artifact{})",
                    CHECK,
                    style(step).green(),
                    artifacts,
                    if *artifacts == 1 { "" } else { "s" }
                )
            } else {
                format!("{} {}", CHECK, style(step).green())
            }
        }
        RunEvent::StepFailed { step, error } => {
            format!("{} {}: {}", CROSS, style(step).red(), style(error).dim())
        }
        RunEvent::BreakpointRaised { title, question } => format!(
            "{} {}\n   {}",
            GATE,
            style(title).bold().yellow(),
            question
        ),
        RunEvent::BreakpointResolved { decision } => match decision {
            ResumeDecision::Approve => format!("{} Approved, resuming", CHECK),
            ResumeDecision::Reject { reason } => {
                format!("{} Rejected: {}", CROSS, style(reason).red())
            }
            ResumeDecision::Modify { .. } => {
                format!("{} Configuration modified, resuming", WARN)
            }
        },
        RunEvent::RunCompleted { run_id, success } => {
            if *success {
                format!(
                    "{} Run {} completed",
                    CHECK,
                    style(&run_id.to_string()[..8]).dim()
                )
            } else {
                format!(
                    "{} Run {} aborted",
                    CROSS,
                    style(&run_id.to_string()[..8]).dim()
                )
            }
        }
    }
}

/// Format a run outcome for display
pub fn format_outcome(success: bool) -> String {
    if success {
        style("COMPLETED").green().to_string()
    } else {
        style("ABORTED").red().to_string()
    }
}

/// Format a run summary for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = if summary.success { CHECK } else { CROSS };

    format!(
        "{} {} - {} - {} - {}ms, {} artifacts",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(&summary.workflow).bold(),
        format_outcome(summary.success),
        summary.duration_ms,
        summary.artifact_count
    )
}
