/// Committing a rename plan to disk.
///
/// Renames run one after another against a single directory. A failing entry
/// is recorded and skipped; it never stops the rest of the batch, and nothing
/// is rolled back.
use crate::engine::{PlannedRename, RenamePlan};
use crate::entry::FileEntry;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while renaming a single entry.
#[derive(Debug)]
pub enum RenameError {
    /// Something already exists at the target path.
    Collision { target: PathBuf },
    /// The filesystem refused the rename.
    PermissionDenied {
        source: PathBuf,
        target: PathBuf,
        error: io::Error,
    },
    /// Any other filesystem failure, including an empty target name.
    Io {
        source: PathBuf,
        target: PathBuf,
        error: io::Error,
    },
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision { target } => {
                write!(f, "Target already exists: {}", target.display())
            }
            Self::PermissionDenied {
                source,
                target,
                error,
            } => write!(
                f,
                "Permission denied renaming {} to {}: {}",
                source.display(),
                target.display(),
                error
            ),
            Self::Io {
                source,
                target,
                error,
            } => write!(
                f,
                "Failed to rename {} to {}: {}",
                source.display(),
                target.display(),
                error
            ),
        }
    }
}

impl std::error::Error for RenameError {}

/// Result type for single-entry renames.
pub type RenameResult<T> = Result<T, RenameError>;

/// Failure classes reported per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Collision,
    PermissionDenied,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Collision => f.write_str("collision"),
            FailureKind::PermissionDenied => f.write_str("permission denied"),
            FailureKind::Io => f.write_str("io error"),
        }
    }
}

/// An entry that could not be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameFailure {
    pub original_name: String,
    pub target_name: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl RenameFailure {
    fn from_error(planned: &PlannedRename, error: &RenameError) -> Self {
        let kind = match error {
            RenameError::Collision { .. } => FailureKind::Collision,
            RenameError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            RenameError::Io { .. } => FailureKind::Io,
        };
        Self {
            original_name: planned.original_name.clone(),
            target_name: planned.new_name(),
            kind,
            reason: error.to_string(),
        }
    }
}

/// A rename that was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOperation {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
}

/// What happened to one entry of the batch.
#[derive(Debug)]
pub enum RenameOutcome<'a> {
    Renamed(&'a PlannedRename),
    Unchanged(&'a PlannedRename),
    Failed(&'a RenameFailure),
}

/// Renames single entries within a directory.
pub struct Renamer;

impl Renamer {
    /// Renames `original_name` to `new_name` inside `directory` and records the operation.
    ///
    /// The rename is refused if anything already exists at the target path,
    /// including a dangling symlink. A change of letter case only goes through
    /// a temporary name so it also works on case-insensitive filesystems.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bulk_rename::renamer::Renamer;
    /// use std::path::Path;
    ///
    /// match Renamer::rename_with_record(Path::new("/photos"), "IMG_0001.jpg", "0001.jpg") {
    ///     Ok(op) => println!("Renamed to {}", op.new_path.display()),
    ///     Err(e) => eprintln!("Rename failed: {}", e),
    /// }
    /// ```
    pub fn rename_with_record(
        directory: &Path,
        original_name: &str,
        new_name: &str,
    ) -> RenameResult<RenameOperation> {
        let source = directory.join(original_name);
        let target = directory.join(new_name);

        if new_name.is_empty() {
            return Err(RenameError::Io {
                source,
                target,
                error: io::Error::new(io::ErrorKind::InvalidInput, "new file name is empty"),
            });
        }

        let case_only = is_case_only_change(original_name, new_name);
        let occupied = if case_only {
            // On a case-insensitive filesystem the target resolves to the source itself.
            entry_exists_exactly(directory, new_name)
        } else {
            fs::symlink_metadata(&target).is_ok()
        };
        if occupied {
            return Err(RenameError::Collision { target });
        }

        let result = if case_only {
            rename_through_temp(directory, &source, &target)
        } else {
            fs::rename(&source, &target)
        };
        result.map_err(|error| classify_io_error(error, &source, &target))?;

        Ok(RenameOperation {
            original_path: source,
            new_path: target,
        })
    }
}

/// True when the two names differ, but only in letter case.
fn is_case_only_change(original_name: &str, new_name: &str) -> bool {
    original_name != new_name && original_name.to_lowercase() == new_name.to_lowercase()
}

/// Looks for a directory entry named exactly `name`, byte for byte.
fn entry_exists_exactly(directory: &Path, name: &str) -> bool {
    fs::read_dir(directory)
        .map(|entries| {
            entries
                .flatten()
                .any(|entry| entry.file_name().to_str() == Some(name))
        })
        .unwrap_or(false)
}

fn rename_through_temp(directory: &Path, source: &Path, target: &Path) -> io::Result<()> {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut temp = directory.join(format!("{file_name}.rename-tmp"));
    let mut attempt = 1;
    while fs::symlink_metadata(&temp).is_ok() {
        temp = directory.join(format!("{file_name}.rename-tmp{attempt}"));
        attempt += 1;
    }

    fs::rename(source, &temp)?;
    fs::rename(&temp, target).inspect_err(|_| {
        // Put the original name back so the entry is not left under the temporary name.
        let _ = fs::rename(&temp, source);
    })
}

/// Maps a failed `fs::rename` onto the failure classes reported to the caller.
fn classify_io_error(error: io::Error, source: &Path, target: &Path) -> RenameError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => RenameError::PermissionDenied {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            error,
        },
        io::ErrorKind::AlreadyExists => RenameError::Collision {
            target: target.to_path_buf(),
        },
        _ => RenameError::Io {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            error,
        },
    }
}

/// Applies `plan` to the entries of `batch` inside `directory`.
///
/// Returns one [`RenameFailure`] per entry that could not be renamed.
pub fn apply_renames(batch: &[FileEntry], plan: &RenamePlan, directory: &Path) -> Vec<RenameFailure> {
    apply_renames_with(batch, plan, directory, |_| {})
}

/// Like [`apply_renames`], calling `on_outcome` after every processed entry.
///
/// Entries are processed in batch order. Entries without a planned rename are
/// not processed; entries whose name would not change are reported as
/// [`RenameOutcome::Unchanged`] and left alone.
pub fn apply_renames_with<F>(
    batch: &[FileEntry],
    plan: &RenamePlan,
    directory: &Path,
    mut on_outcome: F,
) -> Vec<RenameFailure>
where
    F: FnMut(RenameOutcome<'_>),
{
    let mut failures = Vec::new();

    for entry in batch {
        let Some(planned) = plan.get(&entry.file_name()) else {
            continue;
        };

        if planned.is_unchanged() {
            on_outcome(RenameOutcome::Unchanged(planned));
            continue;
        }

        match Renamer::rename_with_record(directory, &planned.original_name, &planned.new_name()) {
            Ok(operation) => {
                tracing::info!(
                    from = %operation.original_path.display(),
                    to = %operation.new_path.display(),
                    "renamed"
                );
                on_outcome(RenameOutcome::Renamed(planned));
            }
            Err(error) => {
                tracing::warn!(entry = %planned.original_name, %error, "rename failed");
                let failure = RenameFailure::from_error(planned, &error);
                on_outcome(RenameOutcome::Failed(&failure));
                failures.push(failure);
            }
        }
    }

    failures
}
