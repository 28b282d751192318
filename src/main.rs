use clap::Parser;
use simsort::cli::{CliOverrides, RunCommand, run_cli};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "simsort",
    version,
    about = "Group files into similarity-based subdirectories, or flatten a nested tree back to one level"
)]
struct Args {
    /// Directory to operate on
    #[arg(value_hint = clap::ValueHint::DirPath)]
    directory: PathBuf,

    /// Flatten the directory tree instead of grouping
    #[arg(short = 'f', long)]
    flatten: bool,

    /// Show planned moves without touching the filesystem
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Similarity threshold in (0, 1]
    #[arg(short = 's', long, value_name = "SCORE")]
    similarity: Option<f64>,

    /// Minimum informative pattern length for pattern-based groups
    #[arg(long, value_name = "N")]
    min_pattern_length: Option<usize>,

    /// Maximum number of groups to create
    #[arg(long, value_name = "N")]
    max_groups: Option<usize>,

    /// Minimum files required to form a group
    #[arg(long, value_name = "N")]
    min_files: Option<usize>,

    /// Path to a configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print verbose progress output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let command = if args.flatten {
        RunCommand::Flatten {
            dry_run: args.dry_run,
        }
    } else {
        RunCommand::Organize {
            dry_run: args.dry_run,
        }
    };

    let overrides = CliOverrides {
        similarity_threshold: args.similarity,
        min_pattern_length: args.min_pattern_length,
        max_groups: args.max_groups,
        min_files_per_group: args.min_files,
    };

    if let Err(e) = run_cli(
        command,
        &args.directory,
        args.config.as_deref(),
        &overrides,
        args.verbose,
    ) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
