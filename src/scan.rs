//! Directory snapshotting.
//!
//! Both planners work from a snapshot taken once at the start of a run. The
//! snapshot is sorted by path so that every later phase (bucketing, ranking
//! tie-breaks, collision suffixing) is deterministic regardless of the
//! platform's directory iteration order.

use crate::config::CompiledFilters;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file captured by a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file's name.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
}

/// The scanned directory could not be read. Fatal: no plan is built.
#[derive(Debug)]
pub struct ScanError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to read directory {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for ScanError {}

/// Snapshots the files at the top level of `dir`, applying the filter rules.
///
/// Subdirectories are not entered. Entries that disappear or error mid-scan
/// are skipped; only an unreadable `dir` itself is fatal.
pub fn scan_top_level(dir: &Path, filters: &CompiledFilters) -> Result<Vec<FileEntry>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            let path = entry.path();
            if filters.should_include(&path) {
                files.push(FileEntry {
                    name: entry.file_name().to_string_lossy().to_string(),
                    path,
                });
            }
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Snapshots every file strictly below the top level of `dir`.
///
/// Used by the flatten planner: files already at the top level are not
/// included, so flattening an already-flat directory plans nothing.
pub fn scan_tree(dir: &Path) -> Result<Vec<FileEntry>, ScanError> {
    // Probe the root first so an unreadable directory is a hard error rather
    // than a silently empty walk.
    fs::read_dir(dir).map_err(|e| ScanError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<FileEntry> = WalkDir::new(dir)
        .min_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| FileEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_path_buf(),
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrganizeConfig;
    use std::fs::File;
    use tempfile::TempDir;

    fn default_filters() -> CompiledFilters {
        OrganizeConfig::default()
            .compile_filters()
            .expect("default filters should compile")
    }

    #[test]
    fn test_scan_top_level_skips_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("a.txt")).expect("Failed to create file");
        fs::create_dir(temp_dir.path().join("sub")).expect("Failed to create subdir");
        File::create(temp_dir.path().join("sub").join("b.txt")).expect("Failed to create file");

        let files = scan_top_level(temp_dir.path(), &default_filters()).expect("Scan failed");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[test]
    fn test_scan_top_level_is_sorted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["c.txt", "a.txt", "b.txt"] {
            File::create(temp_dir.path().join(name)).expect("Failed to create file");
        }

        let files = scan_top_level(temp_dir.path(), &default_filters()).expect("Scan failed");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_scan_top_level_excludes_hidden_by_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join(".DS_Store")).expect("Failed to create file");
        File::create(temp_dir.path().join("visible.txt")).expect("Failed to create file");

        let files = scan_top_level(temp_dir.path(), &default_filters()).expect("Scan failed");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["visible.txt"]);
    }

    #[test]
    fn test_scan_tree_only_returns_nested_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("top.txt")).expect("Failed to create file");
        fs::create_dir_all(temp_dir.path().join("x").join("deep")).expect("Failed to create dirs");
        File::create(temp_dir.path().join("x").join("one.txt")).expect("Failed to create file");
        File::create(temp_dir.path().join("x").join("deep").join("two.txt"))
            .expect("Failed to create file");

        let files = scan_tree(temp_dir.path()).expect("Scan failed");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["two.txt", "one.txt"]);
    }

    #[test]
    fn test_scan_tree_of_flat_directory_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("only.txt")).expect("Failed to create file");

        let files = scan_tree(temp_dir.path()).expect("Scan failed");
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_fatal() {
        let missing = Path::new("/non/existent/path");
        assert!(scan_top_level(missing, &default_filters()).is_err());
        assert!(scan_tree(missing).is_err());
    }
}
