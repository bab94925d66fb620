//! bulk-rename - batch file renaming with composable rules
//!
//! This library computes new names for a batch of directory entries from a
//! set of independently enabled rules (whole-name replacement, search and
//! replace, case conversion, additions, removals and auto-numbering), lets the
//! caller preview the result, and commits the renames on disk with per-entry
//! failure reporting.

pub mod cli;
pub mod config;
pub mod engine;
pub mod entry;
pub mod output;
pub mod renamer;
pub mod rules;

pub use config::{CompiledSelection, ConfigError, SelectionConfig};
pub use engine::{PlannedRename, RenamePlan, compute_renames, rename_stem};
pub use entry::{FileEntry, SortKey, scan_directory};
pub use renamer::{FailureKind, RenameFailure, apply_renames};
pub use rules::{RuleError, RuleFields, RuleSet};

pub use cli::{RenameCommand, run_cli};
