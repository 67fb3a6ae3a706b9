//! Batch command plumbing shared by delete and move.
//!
//! Every batch walks its selection item by item. A failure is recorded
//! against that item and the batch moves on; the caller gets the complete
//! per-item outcome list in a [`BatchResult`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytesize::ByteSize;
use thiserror::Error;

use crate::duplicates::DuplicateRecord;

/// Error for a single delete or move.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when touching the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan (TOCTOU protection).
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The selected path is the original of its record.
    #[error("refusing to act on original file: {0}")]
    OriginalProtected(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File being trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// The move destination is missing or not a directory.
    #[error("destination is not a directory: {0}")]
    DestinationNotDirectory(PathBuf),

    /// A file with the same name already exists at the destination.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::OriginalProtected(p)
            | Self::DestinationNotDirectory(p)
            | Self::DestinationExists(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// What happened to one selected duplicate.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Removed from disk (`permanent`) or sent to the trash.
    Deleted {
        /// Whether the file bypassed the trash
        permanent: bool,
    },
    /// Moved to a new location.
    Moved {
        /// New path of the file
        to: PathBuf,
    },
    /// The operation failed; the file was left in place.
    Failed(ActionError),
}

/// Outcome for one item of a batch.
#[derive(Debug)]
pub struct ItemResult {
    /// Path of the duplicate that was acted on
    pub path: PathBuf,
    /// Size recorded at scan time
    pub size: u64,
    /// Outcome of the operation
    pub outcome: ItemOutcome,
}

impl ItemResult {
    /// Whether the item succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, ItemOutcome::Failed(_))
    }
}

/// Results of a batch operation, one entry per selected item.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Per-item outcomes, in selection order
    pub items: Vec<ItemResult>,
}

impl BatchResult {
    /// Number of successful items.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.items.len() - self.success_count()
    }

    /// Total number of attempted items.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Check if all items succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(ItemResult::is_success)
    }

    /// Bytes covered by successful items.
    #[must_use]
    pub fn bytes_affected(&self) -> u64 {
        self.items
            .iter()
            .filter(|i| i.is_success())
            .map(|i| i.size)
            .sum()
    }

    /// Failed items with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ActionError)> {
        self.items.iter().filter_map(|i| match i.outcome {
            ItemOutcome::Failed(ref e) => Some((i.path.as_path(), e)),
            _ => None,
        })
    }

    /// Human-readable summary, e.g. `Deleted 3 file(s), 1 failed (12.0 KiB)`.
    #[must_use]
    pub fn summary(&self, verb: &str) -> String {
        let size = ByteSize::b(self.bytes_affected());
        if self.all_succeeded() {
            format!("{} {} file(s) ({})", verb, self.success_count(), size)
        } else {
            format!(
                "{} {} file(s), {} failed ({})",
                verb,
                self.success_count(),
                self.failure_count(),
                size
            )
        }
    }

    pub(crate) fn push(&mut self, record: &DuplicateRecord, outcome: ItemOutcome) {
        self.items.push(ItemResult {
            path: record.duplicate.path.clone(),
            size: record.size,
            outcome,
        });
    }
}

/// Callback for batch progress reporting.
pub trait BatchProgressCallback: Send + Sync {
    /// Called before each item.
    fn on_before_item(&self, path: &Path, index: usize, total: usize);

    /// Called after each item with its result.
    fn on_item_done(&self, result: &ItemResult);
}

/// Verify a duplicate is safe to act on.
///
/// The path must differ from the record's original and, when
/// `verify_unchanged` is set, the file's size and mtime must still match
/// what the scan captured.
pub(crate) fn preflight(record: &DuplicateRecord, verify_unchanged: bool) -> Result<(), ActionError> {
    let path = &record.duplicate.path;
    if *path == record.original.path {
        return Err(ActionError::OriginalProtected(path.clone()));
    }

    let metadata = fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;
    if !verify_unchanged {
        return Ok(());
    }

    if metadata.len() != record.duplicate.size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            record.duplicate.size,
            metadata.len()
        );
        return Err(ActionError::Modified(path.clone()));
    }
    let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    if mtime != record.duplicate.modified {
        log::warn!("File modified since scan: {} (mtime changed)", path.display());
        return Err(ActionError::Modified(path.clone()));
    }

    Ok(())
}
