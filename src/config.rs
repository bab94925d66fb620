//! Batch selection configuration.
//!
//! Decides which entries of the working directory take part in a rename
//! batch. Rules are loaded from a TOML file and can be extended from the
//! command line. Supported filters:
//! - Hidden files and directories (off by default)
//! - Extension whitelist and exact stem matching
//! - Excluded filenames, extensions, glob patterns and regexes
//! - Include glob patterns that override every exclusion
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = false
//! include_directories = false
//! extensions = ["pdf", "dwg"]
//! stems = []
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::entry::FileEntry;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".bulkrenamerc.toml";

/// Errors that can occur while loading or compiling the selection configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
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
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Selection configuration as stored in TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub filters: SelectionRules,
}

/// Root-level selection rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRules {
    /// Select dot-files. Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Select directories as well as files. Defaults to false.
    #[serde(default)]
    pub include_directories: bool,

    /// Only select files with one of these extensions (no leading dot,
    /// case-insensitive). Empty selects every extension.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Only select entries whose stem is exactly one of these. Empty selects all.
    #[serde(default)]
    pub stems: Vec<String>,

    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides every other rule).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding entries from the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak", "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override every other rule.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SelectionConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.bulkrenamerc.toml` in the current directory
    /// 3. Look for `~/.config/bulk-rename/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("bulk-rename")
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

        tracing::debug!(path = %path.display(), "loading selection config");
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile configuration into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<CompiledSelection, ConfigError> {
        CompiledSelection::new(self.filters)
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

fn normalize_extensions(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Compiled selection rules.
pub struct CompiledSelection {
    enable_hidden_files: bool,
    include_directories: bool,
    only_extensions: HashSet<String>,
    only_stems: HashSet<String>,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledSelection {
    fn new(rules: SelectionRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            include_directories: rules.include_directories,
            only_extensions: normalize_extensions(&rules.extensions),
            only_stems: rules.stems.into_iter().collect(),
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: normalize_extensions(&rules.exclude.extensions),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check whether an entry joins the batch.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always select
    /// 2. Directories - unless enabled, skip
    /// 3. Hidden entries - unless enabled, skip
    /// 4. Extension whitelist - if set and not matched, skip
    /// 5. Stem whitelist - if set and not matched, skip
    /// 6. Exact filename, extension, glob and regex exclusions
    /// 7. Default: select
    pub fn should_select(&self, entry: &FileEntry) -> bool {
        let file_name = entry.file_name();
        let extension = entry.extension.trim_start_matches('.').to_lowercase();

        if self.include_patterns.iter().any(|p| p.matches(&file_name)) {
            return true;
        }

        if entry.is_directory && !self.include_directories {
            return false;
        }

        if entry.is_hidden() && !self.enable_hidden_files {
            return false;
        }

        if !self.only_extensions.is_empty() && !self.only_extensions.contains(&extension) {
            return false;
        }

        if !self.only_stems.is_empty() && !self.only_stems.contains(&entry.stem) {
            return false;
        }

        if self.exclude_filenames.contains(&file_name) {
            return false;
        }

        if !extension.is_empty() && self.exclude_extensions.contains(&extension) {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        if self.exclude_regexes.iter().any(|r| r.is_match(&file_name)) {
            return false;
        }

        true
    }

    /// Marks every entry selected or unselected and returns the number selected.
    pub fn select(&self, entries: &mut [FileEntry]) -> usize {
        let mut count = 0;
        for entry in entries.iter_mut() {
            entry.selected = self.should_select(entry);
            if entry.selected {
                count += 1;
            } else {
                tracing::debug!(entry = %entry.file_name(), "not selected");
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(filters: SelectionRules) -> CompiledSelection {
        SelectionConfig { filters }.compile().unwrap()
    }

    #[test]
    fn test_default_config_selects_plain_files() {
        let selection = SelectionConfig::default().compile().unwrap();
        assert!(selection.should_select(&FileEntry::new("photo.jpg")));
        assert!(selection.should_select(&FileEntry::new("README")));
    }

    #[test]
    fn test_hidden_files_skipped_by_default() {
        let selection = SelectionConfig::default().compile().unwrap();
        assert!(!selection.should_select(&FileEntry::new(".DS_Store")));

        let selection = compiled(SelectionRules {
            enable_hidden_files: true,
            ..Default::default()
        });
        assert!(selection.should_select(&FileEntry::new(".DS_Store")));
    }

    #[test]
    fn test_directories_skipped_unless_enabled() {
        let selection = SelectionConfig::default().compile().unwrap();
        assert!(!selection.should_select(&FileEntry::directory("albums")));

        let selection = compiled(SelectionRules {
            include_directories: true,
            ..Default::default()
        });
        assert!(selection.should_select(&FileEntry::directory("albums")));
    }

    #[test]
    fn test_extension_whitelist_is_case_insensitive() {
        let selection = compiled(SelectionRules {
            extensions: vec!["PDF".to_string(), ".dwg".to_string()],
            ..Default::default()
        });
        assert!(selection.should_select(&FileEntry::new("plan.pdf")));
        assert!(selection.should_select(&FileEntry::new("plan.DWG")));
        assert!(!selection.should_select(&FileEntry::new("plan.txt")));
        assert!(!selection.should_select(&FileEntry::new("plan")));
    }

    #[test]
    fn test_stem_whitelist_matches_exactly() {
        let selection = compiled(SelectionRules {
            stems: vec!["file1".to_string()],
            ..Default::default()
        });
        assert!(selection.should_select(&FileEntry::new("file1.dwg")));
        assert!(selection.should_select(&FileEntry::new("file1.pdf")));
        assert!(!selection.should_select(&FileEntry::new("file2.pdf")));
        assert!(!selection.should_select(&FileEntry::new("file10.pdf")));
    }

    #[test]
    fn test_exclude_filename_extension_glob_and_regex() {
        let selection = compiled(SelectionRules {
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                patterns: vec!["*.tmp".to_string()],
                extensions: vec!["BAK".to_string()],
                regex: vec![r"^~\$".to_string()],
            },
            ..Default::default()
        });
        assert!(!selection.should_select(&FileEntry::new("Thumbs.db")));
        assert!(!selection.should_select(&FileEntry::new("cache.tmp")));
        assert!(!selection.should_select(&FileEntry::new("old.bak")));
        assert!(!selection.should_select(&FileEntry::new("~$report.docx")));
        assert!(selection.should_select(&FileEntry::new("report.docx")));
    }

    #[test]
    fn test_include_overrides_every_exclusion() {
        let selection = compiled(SelectionRules {
            exclude: ExcludeRules {
                patterns: vec!["*.tmp".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec!["keep*".to_string()],
            },
            ..Default::default()
        });
        assert!(selection.should_select(&FileEntry::new("keep.tmp")));
        assert!(!selection.should_select(&FileEntry::new("drop.tmp")));
    }

    #[test]
    fn test_select_marks_entries() {
        let selection = SelectionConfig::default().compile().unwrap();
        let mut entries = vec![
            FileEntry::new("a.txt"),
            FileEntry::new(".hidden"),
            FileEntry::directory("dir"),
        ];
        assert_eq!(selection.select(&mut entries), 1);
        assert!(entries[0].selected);
        assert!(!entries[1].selected);
        assert!(!entries[2].selected);
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let result = SelectionConfig {
            filters: SelectionRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        }
        .compile();
        assert!(matches!(result, Err(ConfigError::InvalidRegexPattern { .. })));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let result = SelectionConfig {
            filters: SelectionRules {
                include: IncludeRules {
                    patterns: vec!["[invalid".to_string()],
                },
                ..Default::default()
            },
        }
        .compile();
        assert!(matches!(result, Err(ConfigError::InvalidGlobPattern(_))));
    }

    #[test]
    fn test_parse_toml() {
        let config: SelectionConfig = toml::from_str(
            r#"
[filters]
include_directories = true
extensions = ["jpg"]

[filters.exclude]
patterns = ["*_raw*"]
"#,
        )
        .unwrap();
        assert!(config.filters.include_directories);
        assert!(!config.filters.enable_hidden_files);
        assert_eq!(config.filters.extensions, vec!["jpg"]);
        assert_eq!(config.filters.exclude.patterns, vec!["*_raw*"]);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let result = SelectionConfig::load(Some(Path::new("/non/existent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
