//! Output formatting and styling module.
//!
//! All user-facing terminal output goes through [`OutputFormatter`]: colored
//! status lines, the preview table, the apply progress bar and the failure
//! report. Diagnostics go through `tracing` instead.

use crate::engine::RenamePlan;
use crate::entry::FileEntry;
use crate::renamer::RenameFailure;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulk_rename::output::OutputFormatter;
    /// OutputFormatter::success("Renamed 12 files");
    /// ```
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

    /// Creates a progress bar for committing `total` renames.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the old → new table for every planned rename.
    ///
    /// Unchanged entries are dimmed. `entries` supplies the type and
    /// modification columns; entries missing from it print without them.
    pub fn preview_table(plan: &RenamePlan, entries: &[FileEntry]) {
        Self::header("PREVIEW");

        if plan.is_empty() {
            Self::plain("No entries selected.");
            return;
        }

        let width = plan
            .renames()
            .iter()
            .map(|r| r.original_name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$}   {:<12} {:<16} {}",
            "Current".bold(),
            "Type".bold(),
            "Modified".bold(),
            "New".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 45));

        for planned in plan.renames() {
            let entry = entries
                .iter()
                .find(|e| e.file_name() == planned.original_name);
            let type_label = entry.map(FileEntry::type_label).unwrap_or_default();
            let modified = entry
                .and_then(|e| e.modified)
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            let new_name = if planned.is_unchanged() {
                planned.new_name().dimmed()
            } else {
                planned.new_name().green()
            };

            println!(
                "{:<width$} → {:<12} {:<16} {}",
                planned.original_name,
                type_label,
                modified,
                new_name,
                width = width
            );
        }
    }

    /// Prints the totals of a preview or commit.
    pub fn summary(selected: usize, changed: usize, renamed: Option<usize>, failed: usize) {
        Self::header("SUMMARY");
        println!("Selected:  {}", selected.to_string().bold());
        println!("To rename: {}", changed.to_string().green());
        if let Some(renamed) = renamed {
            println!("Renamed:   {}", renamed.to_string().green().bold());
        }
        if failed > 0 {
            println!("Failed:    {}", failed.to_string().red().bold());
        }
    }

    /// Prints every failure with its reason.
    pub fn failure_report(failures: &[RenameFailure]) {
        if failures.is_empty() {
            return;
        }
        Self::header("FAILURES");
        for failure in failures {
            Self::error(&format!(
                "{} → {} [{}]: {}",
                failure.original_name, failure.target_name, failure.kind, failure.reason
            ));
        }
    }

    /// Prints a preview notice message.
    pub fn preview_notice(message: &str) {
        println!("{}", format!("[PREVIEW] {}", message).yellow());
    }
}
