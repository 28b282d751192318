//! Run configuration: grouping thresholds and file filtering rules.
//!
//! Configuration is stored in TOML format:
//!
//! ```toml
//! [grouping]
//! similarity_threshold = 0.7
//! min_pattern_length = 3
//! max_groups = 50
//! min_files_per_group = 2
//!
//! [filters]
//! include_hidden = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.tmp", "*.part"]
//! ```
//!
//! All values are optional and default sensibly. Out-of-range values are
//! rejected by [`OrganizeConfig::validate`] before any work begins.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern in the filter rules.
    InvalidGlobPattern(String),
    /// A tunable value is outside its documented range.
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::OutOfRange { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeConfig {
    /// Thresholds steering the grouping engine.
    #[serde(default)]
    pub grouping: GroupingLimits,

    /// Rules deciding which files take part in a run at all.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Tunable thresholds for the grouping engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingLimits {
    /// Minimum pairwise similarity for two files to be linked, in `(0, 1]`.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Minimum informative length a pattern key needs to bucket files.
    #[serde(default = "default_min_pattern_length")]
    pub min_pattern_length: usize,

    /// Maximum number of groups kept; excess groups dissolve into ungrouped.
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,

    /// Minimum members for a group to survive.
    #[serde(default = "default_min_files_per_group")]
    pub min_files_per_group: usize,
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_min_pattern_length() -> usize {
    3
}

fn default_max_groups() -> usize {
    50
}

fn default_min_files_per_group() -> usize {
    2
}

impl Default for GroupingLimits {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_pattern_length: default_min_pattern_length(),
            max_groups: default_max_groups(),
            min_files_per_group: default_min_files_per_group(),
        }
    }
}

/// Rules deciding which files are scanned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether hidden files (leading `.`) take part. Defaults to false.
    #[serde(default)]
    pub include_hidden: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Exclusion rules within [`FilterRules`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl OrganizeConfig {
    /// Loads configuration with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. the explicitly provided `config_path`,
    /// 2. `.simsortrc.toml` in the current directory,
    /// 3. `~/.config/simsort/config.toml`,
    /// 4. built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file cannot be read, or if
    /// any found file fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".simsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("simsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validates every tunable against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.grouping;

        if !limits.similarity_threshold.is_finite()
            || limits.similarity_threshold <= 0.0
            || limits.similarity_threshold > 1.0
        {
            return Err(ConfigError::OutOfRange {
                field: "similarity_threshold",
                reason: format!("must be in (0, 1], got {}", limits.similarity_threshold),
            });
        }

        if limits.min_pattern_length < 1 {
            return Err(ConfigError::OutOfRange {
                field: "min_pattern_length",
                reason: "must be at least 1".to_string(),
            });
        }

        if limits.max_groups < 1 {
            return Err(ConfigError::OutOfRange {
                field: "max_groups",
                reason: "must be at least 1".to_string(),
            });
        }

        if limits.min_files_per_group < 2 {
            return Err(ConfigError::OutOfRange {
                field: "min_files_per_group",
                reason: "must be at least 2".to_string(),
            });
        }

        Ok(())
    }

    /// Compiles the filter rules into matchable form.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter rules for efficient per-file matching.
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_patterns,
        })
    }

    /// Whether a file takes part in the run.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OrganizeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grouping.similarity_threshold, 0.7);
        assert_eq!(config.grouping.min_files_per_group, 2);
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let mut config = OrganizeConfig::default();

        config.grouping.similarity_threshold = 0.0;
        assert!(config.validate().is_err());

        config.grouping.similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        config.grouping.similarity_threshold = f64::NAN;
        assert!(config.validate().is_err());

        config.grouping.similarity_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_files_per_group_below_two_is_rejected() {
        let mut config = OrganizeConfig::default();
        config.grouping.min_files_per_group = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_groups_is_rejected() {
        let mut config = OrganizeConfig::default();
        config.grouping.max_groups = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parses_partial_toml() {
        let toml = r"
[grouping]
similarity_threshold = 0.8
";
        let config: OrganizeConfig = toml::from_str(toml).expect("should parse");
        assert_eq!(config.grouping.similarity_threshold, 0.8);
        // Unspecified values keep their defaults.
        assert_eq!(config.grouping.max_groups, 50);
        assert!(!config.filters.include_hidden);
    }

    #[test]
    fn test_parses_filter_section() {
        let toml = r#"
[filters]
include_hidden = true

[filters.exclude]
filenames = ["Thumbs.db"]
patterns = ["*.tmp"]
"#;
        let config: OrganizeConfig = toml::from_str(toml).expect("should parse");
        let filters = config.compile_filters().expect("should compile");

        assert!(filters.should_include(Path::new(".hidden")));
        assert!(!filters.should_include(Path::new("Thumbs.db")));
        assert!(!filters.should_include(Path::new("scratch.tmp")));
        assert!(filters.should_include(Path::new("keep.txt")));
    }

    #[test]
    fn test_hidden_files_excluded_by_default() {
        let filters = OrganizeConfig::default()
            .compile_filters()
            .expect("should compile");
        assert!(!filters.should_include(Path::new(".DS_Store")));
        assert!(filters.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let mut config = OrganizeConfig::default();
        config.filters.exclude.patterns = vec!["[invalid".to_string()];
        assert!(config.compile_filters().is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result: Result<OrganizeConfig, _> = toml::from_str("not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let result = OrganizeConfig::load(Some(Path::new("/no/such/config.toml")));
        assert!(result.is_err());
    }
}
