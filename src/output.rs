//! Output formatting and styling.
//!
//! Centralizes all CLI output: colored status lines, progress bars, and the
//! group summary table. The core library never prints; everything the user
//! sees goes through here.

use crate::grouping::Partition;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for file operations.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/white}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the proposed partition: each group with a sample of members,
    /// then the ungrouped count.
    pub fn partition_summary(partition: &Partition) {
        Self::header("Proposed groups");

        if partition.groups.is_empty() {
            Self::plain("(no groups found)");
        }

        for group in &partition.groups {
            let count = group.files.len();
            println!(
                "{} ({} {})",
                group.name.green().bold(),
                count,
                if count == 1 { "file" } else { "files" }
            );
            for file in group.files.iter().take(3) {
                println!("  - {}", file.name);
            }
            if count > 3 {
                println!("  ... and {} more", count - 3);
            }
        }

        if !partition.ungrouped.is_empty() {
            println!(
                "{} {} left ungrouped",
                partition.ungrouped.len(),
                if partition.ungrouped.len() == 1 { "file" } else { "files" }
            );
        }
    }
}
