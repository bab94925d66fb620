//! Command-line orchestration for bulk-rename.
//!
//! This module ties the pieces together:
//! - Loading the selection configuration and applying CLI overrides
//! - Scanning the working directory into a batch
//! - Building the rule set and computing the rename plan
//! - Printing the preview, or committing it and reporting failures

use crate::config::SelectionConfig;
use crate::engine::{RenamePlan, compute_renames};
use crate::entry::{FileEntry, SortKey, scan_directory};
use crate::output::OutputFormatter;
use crate::renamer::{RenameFailure, RenameOutcome, apply_renames_with};
use crate::rules::{RuleFields, RuleSet};
use clap::Args;
use std::path::Path;

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameCommand {
    /// Show the proposed names without touching the disk.
    Preview {
        /// Print the plan as JSON instead of a table.
        json: bool,
    },
    /// Rename the selected entries on disk.
    Apply,
}

/// Batch selection overrides given on the command line.
///
/// These extend whatever the configuration file selects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SelectionArgs {
    /// Only rename files with these extensions (comma separated, no dot)
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Only rename entries whose name without extension is exactly this (repeatable)
    #[arg(long = "stem")]
    pub stems: Vec<String>,

    /// Rename directories too
    #[arg(long)]
    pub include_dirs: bool,

    /// Rename hidden (dot) files too
    #[arg(long)]
    pub hidden: bool,

    /// Batch order
    #[arg(long, value_enum, default_value_t = SortKey::Name)]
    pub sort: SortKey,
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// The computed plan.
    pub plan: RenamePlan,
    /// Number of entries renamed on disk (always 0 for previews).
    pub renamed: usize,
    /// Entries that could not be renamed.
    pub failures: Vec<RenameFailure>,
}

/// Runs a command against `dir_path` with the default configuration lookup.
///
/// # Examples
///
/// ```no_run
/// use bulk_rename::cli::{run_cli, RenameCommand};
/// use bulk_rename::rules::RuleFields;
/// use std::path::Path;
///
/// let rules = RuleFields {
///     search: "IMG_".to_string(),
///     ..Default::default()
/// };
/// match run_cli(RenameCommand::Preview { json: false }, Path::new("/photos"), &rules) {
///     Ok(report) => println!("{} files would change", report.plan.changed_count()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: RenameCommand, dir_path: &Path, rules: &RuleFields) -> Result<RunReport, String> {
    run_cli_with_config(command, dir_path, rules, &SelectionArgs::default(), None)
}

/// Runs a command with explicit selection overrides and an optional configuration file.
///
/// Invalid rules and unreadable configuration or directories are rejected
/// before anything is renamed. Individual rename failures do not make the run
/// fail; they are returned in the report.
pub fn run_cli_with_config(
    command: RenameCommand,
    dir_path: &Path,
    rules: &RuleFields,
    selection: &SelectionArgs,
    config_path: Option<&Path>,
) -> Result<RunReport, String> {
    let rule_set = RuleSet::from_fields(rules).map_err(|e| e.to_string())?;
    let entries = load_batch(dir_path, selection, config_path)?;
    let plan = compute_renames(&entries, &rule_set).map_err(|e| e.to_string())?;

    match command {
        RenameCommand::Preview { json } => preview(dir_path, &entries, plan, json),
        RenameCommand::Apply => apply(dir_path, &entries, plan),
    }
}

/// Scans `dir_path` and marks the entries selected by the configuration and overrides.
fn load_batch(
    dir_path: &Path,
    selection: &SelectionArgs,
    config_path: Option<&Path>,
) -> Result<Vec<FileEntry>, String> {
    let mut config = SelectionConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    let filters = &mut config.filters;
    filters.extensions.extend(selection.extensions.iter().cloned());
    filters.stems.extend(selection.stems.iter().cloned());
    filters.include_directories |= selection.include_dirs;
    filters.enable_hidden_files |= selection.hidden;

    let compiled = config
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let mut entries = scan_directory(dir_path, selection.sort)
        .map_err(|e| format!("Error reading directory {}: {}", dir_path.display(), e))?;
    let selected = compiled.select(&mut entries);
    tracing::debug!(total = entries.len(), selected, "scanned directory");

    Ok(entries)
}

fn preview(
    dir_path: &Path,
    entries: &[FileEntry],
    plan: RenamePlan,
    json: bool,
) -> Result<RunReport, String> {
    if json {
        let rendered = serde_json::to_string_pretty(&plan)
            .map_err(|e| format!("Error serializing plan: {}", e))?;
        println!("{}", rendered);
    } else {
        OutputFormatter::preview_notice(&format!("Renaming in: {}", dir_path.display()));
        OutputFormatter::preview_table(&plan, entries);
        OutputFormatter::summary(plan.len(), plan.changed_count(), None, 0);
        OutputFormatter::plain("\nNo files were modified. Run `apply` with the same options to rename.");
    }

    Ok(RunReport {
        plan,
        renamed: 0,
        failures: Vec::new(),
    })
}

fn apply(dir_path: &Path, entries: &[FileEntry], plan: RenamePlan) -> Result<RunReport, String> {
    OutputFormatter::info(&format!("Renaming in: {}", dir_path.display()));

    if plan.changed_count() == 0 {
        OutputFormatter::warning("Nothing to rename.");
        return Ok(RunReport {
            plan,
            renamed: 0,
            failures: Vec::new(),
        });
    }

    let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
    let mut renamed = 0;
    let failures = apply_renames_with(entries, &plan, dir_path, |outcome| {
        if let RenameOutcome::Renamed(planned) = outcome {
            renamed += 1;
            pb.set_message(planned.new_name());
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    OutputFormatter::summary(plan.len(), plan.changed_count(), Some(renamed), failures.len());
    if failures.is_empty() {
        OutputFormatter::success(&format!(
            "Renamed {} {}",
            renamed,
            if renamed == 1 { "entry" } else { "entries" }
        ));
    } else {
        OutputFormatter::failure_report(&failures);
        OutputFormatter::warning("Some entries could not be renamed. Please review errors above.");
    }

    Ok(RunReport {
        plan,
        renamed,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_rule_rejected_before_scanning() {
        let rules = RuleFields {
            remove_from: 4,
            remove_to: 1,
            ..Default::default()
        };
        // The directory does not exist; the rule error must come first.
        let err = run_cli(
            RenameCommand::Apply,
            Path::new("/non/existent/path"),
            &rules,
        )
        .unwrap_err();
        assert!(err.contains("Invalid rule"), "unexpected error: {}", err);
    }

    #[test]
    fn test_selection_overrides_extend_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.pdf"), "").unwrap();
        fs::write(base_path.join("b.txt"), "").unwrap();
        fs::create_dir(base_path.join("c")).unwrap();

        let config_path = base_path.join("empty.toml");
        fs::write(&config_path, "").unwrap();

        let selection = SelectionArgs {
            extensions: vec!["pdf".to_string()],
            ..Default::default()
        };
        let entries = load_batch(base_path, &selection, Some(&config_path)).unwrap();
        let selected: Vec<_> = entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(selected, vec!["a.pdf"]);
    }

    #[test]
    fn test_rename_command_variants() {
        assert_ne!(RenameCommand::Preview { json: false }, RenameCommand::Apply);
        assert_ne!(
            RenameCommand::Preview { json: true },
            RenameCommand::Preview { json: false }
        );
    }
}
