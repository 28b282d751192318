//! Move planning with collision-safe destinations.
//!
//! Planning never touches the filesystem beyond reading it: both planners
//! snapshot the directory, decide every destination up front, and hand the
//! executor a plan whose destinations are pairwise distinct. Name collisions
//! (against the disk or against earlier entries of the same plan) are resolved
//! by appending `_1`, `_2`, ... before the extension until a free slot is
//! found, so no file is ever silently dropped.

use crate::config::{ConfigError, OrganizeConfig};
use crate::grouping::{self, Partition};
use crate::progress::{Phase, ProgressSink};
use crate::scan::{self, ScanError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What the executor should do with a planned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Move the source to the destination.
    Move,
    /// Source and destination are the same path; nothing to do.
    Skip,
}

/// A single source-to-destination move.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    /// Current location of the file.
    pub source: PathBuf,
    /// Where the file ends up. Unique within the plan.
    pub dest: PathBuf,
    /// Whether an actual move is required.
    pub action: PlanAction,
}

/// The concrete, collision-free sequence of moves for one run.
#[derive(Debug, Clone)]
pub struct MovePlan {
    /// Planned moves, in snapshot order.
    pub moves: Vec<PlannedMove>,
    /// Root under which emptied subdirectories are removed after execution.
    /// Set by the flatten planner only.
    pub cleanup_root: Option<PathBuf>,
}

impl MovePlan {
    /// True when the plan contains no entries at all.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of planned entries.
    pub fn len(&self) -> usize {
        self.moves.len()
    }
}

/// Fatal errors that abort planning before any plan is built.
#[derive(Debug)]
pub enum PlanningError {
    /// The directory could not be scanned.
    Scan(ScanError),
    /// The configuration failed validation or compilation.
    Config(ConfigError),
}

impl std::fmt::Display for PlanningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanningError::Scan(e) => write!(f, "{}", e),
            PlanningError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PlanningError {}

impl From<ScanError> for PlanningError {
    fn from(e: ScanError) -> Self {
        PlanningError::Scan(e)
    }
}

impl From<ConfigError> for PlanningError {
    fn from(e: ConfigError) -> Self {
        PlanningError::Config(e)
    }
}

/// Plans the grouping of `dir`'s top-level files into group subdirectories.
///
/// Grouped files are planned to `dir/<group_name>/<original_filename>`;
/// ungrouped files get no plan entry and stay untouched. Returns the
/// partition alongside the plan so callers can present the proposed groups.
///
/// # Errors
///
/// Fails when the configuration is out of range or the directory cannot be
/// read. Nothing has been planned or moved when an error is returned.
pub fn plan_organize(
    dir: &Path,
    config: &OrganizeConfig,
    sink: &ProgressSink,
) -> Result<(Partition, MovePlan), PlanningError> {
    config.validate()?;
    let filters = config.compile_filters()?;

    sink.report(Phase::Scan, "scanning directory", 0, 0);
    let files = scan::scan_top_level(dir, &filters)?;

    let partition = grouping::partition(&files, &config.grouping, sink);

    sink.report(
        Phase::Plan,
        "planning moves",
        0,
        partition.groups.iter().map(|g| g.files.len()).sum::<usize>() as u64,
    );

    let mut reserved = HashSet::new();
    let mut moves = Vec::new();
    for group in &partition.groups {
        let group_dir = dir.join(&group.name);
        for file in &group.files {
            let dest = unique_destination(group_dir.join(&file.name), &reserved);
            let action = if dest == file.path {
                PlanAction::Skip
            } else {
                PlanAction::Move
            };
            reserved.insert(dest.clone());
            moves.push(PlannedMove {
                source: file.path.clone(),
                dest,
                action,
            });
        }
    }

    Ok((
        partition,
        MovePlan {
            moves,
            cleanup_root: None,
        },
    ))
}

/// Plans the flattening of every file below `dir`'s top level into `dir`.
///
/// Files already at the top level are untouched, so a second flatten of an
/// already-flat directory yields an empty plan. The returned plan carries
/// `dir` as its cleanup root: emptied subdirectories are removed after a live
/// execution.
///
/// # Errors
///
/// Fails when the directory cannot be read.
pub fn plan_flatten(dir: &Path, sink: &ProgressSink) -> Result<MovePlan, PlanningError> {
    sink.report(Phase::Scan, "scanning directory tree", 0, 0);
    let files = scan::scan_tree(dir)?;

    sink.report(Phase::Plan, "planning moves", 0, files.len() as u64);

    let mut reserved = HashSet::new();
    let mut moves = Vec::new();
    for file in &files {
        let dest = unique_destination(dir.join(&file.name), &reserved);
        let action = if dest == file.path {
            PlanAction::Skip
        } else {
            PlanAction::Move
        };
        reserved.insert(dest.clone());
        moves.push(PlannedMove {
            source: file.path.clone(),
            dest,
            action,
        });
    }

    Ok(MovePlan {
        moves,
        cleanup_root: Some(dir.to_path_buf()),
    })
}

/// Resolves `candidate` to a destination that exists neither on disk nor
/// earlier in the plan, suffixing `_1`, `_2`, ... before the extension.
fn unique_destination(candidate: PathBuf, reserved: &HashSet<PathBuf>) -> PathBuf {
    if !candidate.exists() && !reserved.contains(&candidate) {
        return candidate;
    }

    let parent = candidate.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
        _ => (file_name, String::new()),
    };

    for n in 1u64.. {
        let next = parent.join(format!("{}_{}{}", stem, n, extension));
        if !next.exists() && !reserved.contains(&next) {
            return next;
        }
    }
    unreachable!("suffix search is exhaustive");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn test_unique_destination_prefers_unsuffixed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let candidate = temp_dir.path().join("file.txt");
        let result = unique_destination(candidate.clone(), &HashSet::new());
        assert_eq!(result, candidate);
    }

    #[test]
    fn test_unique_destination_suffixes_on_disk_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("file.txt")).expect("Failed to create file");

        let result = unique_destination(temp_dir.path().join("file.txt"), &HashSet::new());
        assert_eq!(result, temp_dir.path().join("file_1.txt"));
    }

    #[test]
    fn test_unique_destination_suffixes_on_reserved_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut reserved = HashSet::new();
        reserved.insert(temp_dir.path().join("file.txt"));
        reserved.insert(temp_dir.path().join("file_1.txt"));

        let result = unique_destination(temp_dir.path().join("file.txt"), &reserved);
        assert_eq!(result, temp_dir.path().join("file_2.txt"));
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("README")).expect("Failed to create file");

        let result = unique_destination(temp_dir.path().join("README"), &HashSet::new());
        assert_eq!(result, temp_dir.path().join("README_1"));
    }

    #[test]
    fn test_plan_organize_places_groups_in_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["a1.txt", "a2.txt", "a3.txt", "b.png"] {
            File::create(temp_dir.path().join(name)).expect("Failed to create file");
        }

        let mut config = OrganizeConfig::default();
        config.grouping.min_pattern_length = 1;

        let (partition, plan) =
            plan_organize(temp_dir.path(), &config, &ProgressSink::none()).expect("Plan failed");

        assert_eq!(partition.groups.len(), 1);
        assert_eq!(plan.len(), 3);
        assert!(plan.cleanup_root.is_none());
        for planned in &plan.moves {
            assert_eq!(planned.action, PlanAction::Move);
            assert_eq!(
                planned.dest.parent(),
                Some(temp_dir.path().join("a").as_path())
            );
        }
        // Ungrouped b.png has no entry.
        assert!(!plan.moves.iter().any(|m| m.source.ends_with("b.png")));
    }

    #[test]
    fn test_plan_organize_rejects_invalid_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut config = OrganizeConfig::default();
        config.grouping.similarity_threshold = 2.0;

        let result = plan_organize(temp_dir.path(), &config, &ProgressSink::none());
        assert!(matches!(result, Err(PlanningError::Config(_))));
    }

    #[test]
    fn test_plan_destinations_are_pairwise_distinct() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("x")).expect("Failed to create dir");
        fs::create_dir(temp_dir.path().join("y")).expect("Failed to create dir");
        fs::create_dir(temp_dir.path().join("z")).expect("Failed to create dir");
        for sub in ["x", "y", "z"] {
            File::create(temp_dir.path().join(sub).join("same.txt"))
                .expect("Failed to create file");
        }

        let plan = plan_flatten(temp_dir.path(), &ProgressSink::none()).expect("Plan failed");

        let mut dests: Vec<_> = plan.moves.iter().map(|m| m.dest.clone()).collect();
        let total = dests.len();
        dests.sort();
        dests.dedup();
        assert_eq!(dests.len(), total);
    }

    #[test]
    fn test_plan_flatten_resolves_collisions_in_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("x")).expect("Failed to create dir");
        fs::create_dir(temp_dir.path().join("y")).expect("Failed to create dir");
        File::create(temp_dir.path().join("x").join("1.txt")).expect("Failed to create file");
        File::create(temp_dir.path().join("y").join("1.txt")).expect("Failed to create file");

        let plan = plan_flatten(temp_dir.path(), &ProgressSink::none()).expect("Plan failed");

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.moves[0].dest, temp_dir.path().join("1.txt"));
        assert_eq!(plan.moves[1].dest, temp_dir.path().join("1_1.txt"));
        assert_eq!(plan.cleanup_root.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_plan_flatten_on_flat_directory_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("already_here.txt")).expect("Failed to create file");

        let plan = plan_flatten(temp_dir.path(), &ProgressSink::none()).expect("Plan failed");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_flatten_avoids_existing_top_level_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("1.txt")).expect("Failed to create file");
        fs::create_dir(temp_dir.path().join("x")).expect("Failed to create dir");
        File::create(temp_dir.path().join("x").join("1.txt")).expect("Failed to create file");

        let plan = plan_flatten(temp_dir.path(), &ProgressSink::none()).expect("Plan failed");

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.moves[0].dest, temp_dir.path().join("1_1.txt"));
    }

    #[test]
    fn test_plan_missing_directory_fails() {
        let missing = Path::new("/no/such/dir");
        assert!(matches!(
            plan_flatten(missing, &ProgressSink::none()),
            Err(PlanningError::Scan(_))
        ));
        assert!(matches!(
            plan_organize(missing, &OrganizeConfig::default(), &ProgressSink::none()),
            Err(PlanningError::Scan(_))
        ));
    }
}
