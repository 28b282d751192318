//! simsort - organize a directory by filename similarity
//!
//! This library groups the files of a single directory by textual filename
//! similarity and shared name patterns, plans collision-free moves into group
//! subdirectories, and can flatten a nested tree back into one level. All
//! planning is side-effect free; only [`executor::execute`] touches the
//! filesystem, and only outside dry-run mode.

pub mod cli;
pub mod config;
pub mod executor;
pub mod grouping;
pub mod output;
pub mod pattern;
pub mod plan;
pub mod progress;
pub mod scan;
pub mod similarity;

pub use config::{ConfigError, GroupingLimits, OrganizeConfig};
pub use executor::{ExecutionResult, MoveOutcome, execute};
pub use grouping::{Group, GroupOrigin, Partition};
pub use plan::{MovePlan, PlanningError, plan_flatten, plan_organize};
pub use progress::{Phase, ProgressSink};
pub use scan::{FileEntry, ScanError};

pub use cli::{CliOverrides, RunCommand, run_cli};
