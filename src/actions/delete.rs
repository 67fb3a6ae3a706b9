//! Safe deletion of selected duplicates.
//!
//! # Overview
//!
//! This module provides:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Batch deletion with per-item results
//! - TOCTOU verification against the scanned size and mtime
//!
//! Only `record.duplicate` is ever deleted; originals are never touched.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::actions::{delete_batch, DeleteConfig};
//! use dupfinder::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().scan(Path::new(".")).unwrap();
//! let result = delete_batch(&report.records, &DeleteConfig::trash(), None);
//! println!("{}", result.summary("Deleted"));
//! ```

use std::fs;
use std::path::Path;

use super::batch::{preflight, ActionError, BatchProgressCallback, BatchResult, ItemOutcome};
use crate::duplicates::DuplicateRecord;

/// Configuration for deletion operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
    /// Refuse to delete files whose size or mtime changed since the scan.
    pub verify_unchanged: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: false,
            verify_unchanged: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Enable/disable TOCTOU verification.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash backend refuses
pub fn delete_to_trash(path: &Path) -> Result<(), ActionError> {
    fs::symlink_metadata(path).map_err(|e| ActionError::from_io(path, e))?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {}", path.display());
    Ok(())
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<(), ActionError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        ActionError::from_io(path, e)
    })?;

    log::info!("Permanently deleted: {}", path.display());
    Ok(())
}

/// Delete the duplicate of each record.
///
/// Every record is attempted; a failure is recorded and the batch
/// continues with the next one.
pub fn delete_batch(
    records: &[DuplicateRecord],
    config: &DeleteConfig,
    callback: Option<&dyn BatchProgressCallback>,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total = records.len();

    for (index, record) in records.iter().enumerate() {
        let path = &record.duplicate.path;
        if let Some(cb) = callback {
            cb.on_before_item(path, index, total);
        }

        let attempt = preflight(record, config.verify_unchanged).and_then(|()| {
            if config.permanent {
                permanent_delete(path)
            } else {
                delete_to_trash(path)
            }
        });

        let outcome = match attempt {
            Ok(()) => ItemOutcome::Deleted {
                permanent: config.permanent,
            },
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                ItemOutcome::Failed(e)
            }
        };
        result.push(record, outcome);

        if let (Some(cb), Some(item)) = (callback, result.items.last()) {
            cb.on_item_done(item);
        }
    }

    log::info!("{}", result.summary("Deleted"));
    result
}
