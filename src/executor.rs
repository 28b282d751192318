//! Applying (or previewing) a move plan.
//!
//! Execution is best-effort: every entry is attempted independently, and a
//! failure (permission denied, vanished source, full disk) is recorded for
//! that entry without aborting the rest. In dry-run mode nothing on the
//! filesystem is touched; every pending move is reported as "would move".
//!
//! After a live flatten run the plan's cleanup root is swept bottom-up and
//! subdirectories that ended up empty are removed. Directories that cannot be
//! removed are skipped and reported through the sink, never treated as fatal.

use crate::plan::{MovePlan, PlanAction};
use crate::progress::{Phase, ProgressSink};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of a single planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file was moved.
    Moved,
    /// Dry run: the file would have been moved.
    WouldMove,
    /// Source and destination were identical; nothing was done.
    Skipped,
    /// The move failed with the recorded reason.
    Failed(String),
}

/// One executed (or previewed) entry of the plan.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub outcome: MoveOutcome,
}

/// Aggregate result of executing a plan.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Per-entry records in plan order.
    pub records: Vec<MoveRecord>,
    /// Files actually moved.
    pub moved: usize,
    /// Files that would be moved (dry run only).
    pub would_move: usize,
    /// Entries skipped because no move was required.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Emptied directories removed during cleanup.
    pub removed_dirs: usize,
}

impl ExecutionResult {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            moved: 0,
            would_move: 0,
            skipped: 0,
            failed: 0,
            removed_dirs: 0,
        }
    }

    /// The failed entries with their reasons.
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.records
            .iter()
            .filter_map(|record| match &record.outcome {
                MoveOutcome::Failed(reason) => Some((record.source.as_path(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// True when every entry succeeded or was a planned skip.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

/// Applies the plan, or previews it when `dry_run` is set.
///
/// Mutates nothing in dry-run mode. In live mode each entry is attempted
/// independently and the run continues past failures. When the plan carries a
/// cleanup root (flatten direction), emptied subdirectories are removed after
/// all moves, in live mode only.
pub fn execute(plan: &MovePlan, dry_run: bool, sink: &ProgressSink) -> ExecutionResult {
    let mut result = ExecutionResult::new();
    let total = plan.len() as u64;

    for (index, planned) in plan.moves.iter().enumerate() {
        let outcome = match planned.action {
            PlanAction::Skip => {
                result.skipped += 1;
                MoveOutcome::Skipped
            }
            PlanAction::Move if dry_run => {
                result.would_move += 1;
                MoveOutcome::WouldMove
            }
            PlanAction::Move => match try_move(&planned.source, &planned.dest) {
                Ok(()) => {
                    result.moved += 1;
                    MoveOutcome::Moved
                }
                Err(reason) => {
                    result.failed += 1;
                    MoveOutcome::Failed(reason)
                }
            },
        };

        sink.report(
            Phase::Execute,
            &planned.source.file_name().unwrap_or_default().to_string_lossy(),
            (index + 1) as u64,
            total,
        );

        result.records.push(MoveRecord {
            source: planned.source.clone(),
            dest: planned.dest.clone(),
            outcome,
        });
    }

    if let Some(root) = &plan.cleanup_root
        && !dry_run
    {
        result.removed_dirs = remove_empty_dirs(root, sink);
    }

    result
}

/// Moves a single file, creating the destination directory if needed.
fn try_move(source: &Path, dest: &Path) -> Result<(), String> {
    if let Some(parent) = dest.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("could not create {}: {}", parent.display(), e))?;
    }

    fs::rename(source, dest).map_err(|e| {
        format!(
            "could not move {} to {}: {}",
            source.display(),
            dest.display(),
            e
        )
    })
}

/// Removes empty directories below `root`, bottom-up.
///
/// The walk visits contents first, so a chain of nested directories that
/// became empty collapses in a single pass. Directories that cannot be read
/// or removed are left in place and reported through the sink.
fn remove_empty_dirs(root: &Path, sink: &ProgressSink) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
    {
        let path = entry.path();
        let is_empty = fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                removed += 1;
                sink.report(
                    Phase::Cleanup,
                    &format!("removed empty directory {}", path.display()),
                    removed as u64,
                    0,
                );
            }
            Err(e) => {
                sink.report(
                    Phase::Cleanup,
                    &format!("could not remove {}: {}", path.display(), e),
                    removed as u64,
                    0,
                );
            }
        }
    }

    removed
}
