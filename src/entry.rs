//! Directory entries as the rename engine sees them.
//!
//! A [`FileEntry`] splits a file name into a stem and an extension. Rules only
//! ever touch the stem; the extension is carried along unchanged and glued
//! back on when the rename is committed.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Type label shown for directories in place of an extension.
pub const FOLDER_LABEL: &str = "File Folder";

/// A single entry of the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// The name without its extension. Never contains a path separator.
    pub stem: String,
    /// The extension including its leading dot (e.g. `.pdf`), possibly empty.
    /// Always empty for directories.
    pub extension: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Last modification time, for display only.
    pub modified: Option<DateTime<Local>>,
    /// Whether the entry takes part in the current batch.
    pub selected: bool,
}

impl FileEntry {
    /// Creates a selected file entry from a file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use bulk_rename::entry::FileEntry;
    ///
    /// let entry = FileEntry::new("report.final.pdf");
    /// assert_eq!(entry.stem, "report.final");
    /// assert_eq!(entry.extension, ".pdf");
    /// assert_eq!(entry.file_name(), "report.final.pdf");
    /// ```
    pub fn new(file_name: &str) -> Self {
        let (stem, extension) = split_file_name(file_name);
        Self {
            stem,
            extension,
            is_directory: false,
            modified: None,
            selected: true,
        }
    }

    /// Creates a selected directory entry. The whole name is the stem.
    pub fn directory(name: &str) -> Self {
        Self {
            stem: name.to_string(),
            extension: String::new(),
            is_directory: true,
            modified: None,
            selected: true,
        }
    }

    /// Builds an entry from a path on disk, reading its type and modification time.
    ///
    /// The entry starts out unselected; selection is decided by the caller.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_string_lossy()
            .to_string();

        let metadata = fs::metadata(path)?;
        let mut entry = if metadata.is_dir() {
            Self::directory(&name)
        } else {
            Self::new(&name)
        };
        entry.modified = metadata.modified().ok().map(DateTime::<Local>::from);
        entry.selected = false;
        Ok(entry)
    }

    /// The full on-disk name: stem followed by extension.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.extension)
    }

    /// The type column value: the extension, or [`FOLDER_LABEL`] for directories.
    pub fn type_label(&self) -> &str {
        if self.is_directory {
            FOLDER_LABEL
        } else {
            &self.extension
        }
    }

    /// Whether the entry is a dot-file.
    pub fn is_hidden(&self) -> bool {
        self.stem.starts_with('.')
    }
}

/// Splits a file name into `(stem, extension)`.
///
/// The extension keeps its leading dot. A single leading dot does not start an
/// extension, so `.bashrc` has no extension. Concatenating the two parts always
/// yields the input again.
pub fn split_file_name(file_name: &str) -> (String, String) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name.to_string(), String::new()),
        Some(idx) => (file_name[..idx].to_string(), file_name[idx..].to_string()),
    }
}

/// Order in which scanned entries form the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Alphabetical by full file name.
    #[default]
    Name,
    /// Oldest modification time first, ties broken by name.
    Modified,
}

/// Sorts entries in place by the given key.
pub fn sort_entries(entries: &mut [FileEntry], key: SortKey) {
    match key {
        SortKey::Name => entries.sort_by_key(|e| e.file_name()),
        SortKey::Modified => {
            entries.sort_by(|a, b| {
                a.modified
                    .cmp(&b.modified)
                    .then_with(|| a.file_name().cmp(&b.file_name()))
            });
        }
    }
}

/// Lists the immediate children of `dir` as unselected entries, sorted by `key`.
///
/// Entries whose metadata cannot be read are skipped.
///
/// # Errors
///
/// Returns the underlying IO error if the directory itself cannot be read.
pub fn scan_directory(dir: &Path, key: SortKey) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(dir)?.flatten() {
        match FileEntry::from_path(&dir_entry.path()) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::debug!(path = %dir_entry.path().display(), error = %e, "skipping unreadable entry");
            }
        }
    }
    sort_entries(&mut entries, key);
    Ok(entries)
}
