//! Command-line orchestration.
//!
//! The shell around the core: loads and overrides configuration, runs the
//! planners, presents the proposed plan, executes it, and renders the final
//! summary. All fatal errors are mapped to strings at this boundary; partial
//! failures are reported per entry and do not fail the run.

use crate::config::OrganizeConfig;
use crate::executor::{self, ExecutionResult, MoveOutcome};
use crate::output::OutputFormatter;
use crate::plan::{self, MovePlan};
use crate::progress::{Phase, ProgressSink};
use std::path::Path;

/// The operation to run.
#[derive(Debug, Clone, Copy)]
pub enum RunCommand {
    /// Group the directory's files into similarity-based subdirectories.
    Organize {
        /// If true, preview the plan without making changes.
        dry_run: bool,
    },
    /// Flatten the directory tree back into a single level.
    Flatten {
        /// If true, preview the plan without making changes.
        dry_run: bool,
    },
}

/// Grouping tunables given on the command line, overriding file config.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub similarity_threshold: Option<f64>,
    pub min_pattern_length: Option<usize>,
    pub max_groups: Option<usize>,
    pub min_files_per_group: Option<usize>,
}

impl CliOverrides {
    fn apply(&self, config: &mut OrganizeConfig) {
        if let Some(threshold) = self.similarity_threshold {
            config.grouping.similarity_threshold = threshold;
        }
        if let Some(length) = self.min_pattern_length {
            config.grouping.min_pattern_length = length;
        }
        if let Some(max) = self.max_groups {
            config.grouping.max_groups = max;
        }
        if let Some(min) = self.min_files_per_group {
            config.grouping.min_files_per_group = min;
        }
    }
}

/// Runs one command against a directory.
///
/// This is the entry point used by `main`. Configuration is loaded from the
/// usual locations (or `config_path` when given), CLI overrides are applied
/// on top, and the chosen operation is planned and executed.
///
/// # Errors
///
/// Returns an error string for fatal conditions only: unreadable directory or
/// invalid configuration. Per-entry move failures are reported and counted
/// but do not fail the run.
pub fn run_cli(
    command: RunCommand,
    dir: &Path,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    verbose: bool,
) -> Result<(), String> {
    let mut config =
        OrganizeConfig::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))?;
    overrides.apply(&mut config);

    let plan_sink = if verbose {
        ProgressSink::new(|phase, message, current, total| {
            if total > 0 {
                OutputFormatter::info(&format!("[{}] {} ({}/{})", phase.label(), message, current, total));
            } else {
                OutputFormatter::info(&format!("[{}] {}", phase.label(), message));
            }
        })
    } else {
        ProgressSink::none()
    };

    match command {
        RunCommand::Organize { dry_run } => {
            OutputFormatter::plain(&format!("Organizing contents of: {}", dir.display()));

            let (partition, plan) = plan::plan_organize(dir, &config, &plan_sink)
                .map_err(|e| format!("Error: {}", e))?;

            OutputFormatter::partition_summary(&partition);

            if plan.is_empty() {
                OutputFormatter::info("Nothing to do.");
                return Ok(());
            }

            let result = run_plan(&plan, dry_run, verbose);
            report_result(&result, dry_run, false);
            Ok(())
        }
        RunCommand::Flatten { dry_run } => {
            OutputFormatter::plain(&format!("Flattening contents of: {}", dir.display()));

            let plan = plan::plan_flatten(dir, &plan_sink).map_err(|e| format!("Error: {}", e))?;

            if plan.is_empty() {
                OutputFormatter::info("Directory is already flat. Nothing to do.");
                return Ok(());
            }

            let result = run_plan(&plan, dry_run, verbose);
            report_result(&result, dry_run, true);
            Ok(())
        }
    }
}

/// Executes the plan, driving a progress bar when verbose.
fn run_plan(plan: &MovePlan, dry_run: bool, verbose: bool) -> ExecutionResult {
    if !verbose {
        return executor::execute(plan, dry_run, &ProgressSink::none());
    }

    let progress_bar = OutputFormatter::create_progress_bar(plan.len() as u64);
    let bar = progress_bar.clone();
    let sink = ProgressSink::new(move |phase, message, current, _total| {
        if phase == Phase::Execute {
            bar.set_position(current);
            bar.set_message(message.to_string());
        }
    });

    let result = executor::execute(plan, dry_run, &sink);
    progress_bar.finish_and_clear();
    result
}

/// Renders the per-entry outcomes and the final summary counts.
fn report_result(result: &ExecutionResult, dry_run: bool, flatten: bool) {
    for record in &result.records {
        match &record.outcome {
            MoveOutcome::WouldMove => {
                OutputFormatter::dry_run_notice(&format!(
                    "would move {} → {}",
                    record.source.display(),
                    record.dest.display()
                ));
            }
            MoveOutcome::Failed(reason) => {
                OutputFormatter::error(reason);
            }
            MoveOutcome::Moved | MoveOutcome::Skipped => {}
        }
    }

    if dry_run {
        OutputFormatter::success(&format!(
            "Dry run complete: {} would be moved, {} skipped. No files were modified.",
            result.would_move, result.skipped
        ));
        return;
    }

    let summary = format!(
        "Moved {}, skipped {}, failed {}",
        result.moved, result.skipped, result.failed
    );
    if result.is_complete_success() {
        OutputFormatter::success(&summary);
    } else {
        OutputFormatter::warning(&summary);
        OutputFormatter::warning("Some files could not be moved. Please review errors above.");
    }

    if flatten {
        OutputFormatter::plain(&format!(
            "Removed {} empty {}",
            result.removed_dirs,
            if result.removed_dirs == 1 { "directory" } else { "directories" }
        ));
    }
}
