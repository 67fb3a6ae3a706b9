//! Moving selected duplicates into another directory.
//!
//! Each duplicate keeps its base name. A file already present under that
//! name at the destination is never overwritten; the item fails with
//! [`ActionError::DestinationExists`] instead.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::batch::{preflight, ActionError, BatchProgressCallback, BatchResult, ItemOutcome};
use crate::duplicates::DuplicateRecord;

/// Configuration for move operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveConfig {
    /// Refuse to move files whose size or mtime changed since the scan.
    pub verify_unchanged: bool,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            verify_unchanged: true,
        }
    }
}

impl MoveConfig {
    /// Enable/disable TOCTOU verification.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }
}

/// Move one file into `destination`, keeping its base name.
///
/// Links the file under its new name and then unlinks the old one, so an
/// existing target is never replaced. Where hard links are unavailable
/// (another filesystem, or one without link support) the content is copied
/// into a freshly created target instead.
///
/// # Errors
///
/// - `DestinationExists` if the target name is taken
/// - `NotFound` / `PermissionDenied` / `Io` for filesystem failures
pub fn move_file(path: &Path, destination: &Path) -> Result<PathBuf, ActionError> {
    let name = path
        .file_name()
        .ok_or_else(|| ActionError::NotFound(path.to_path_buf()))?;
    let target = destination.join(name);

    match fs::hard_link(path, &target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ActionError::DestinationExists(target));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ActionError::from_io(path, e));
        }
        Err(e) => {
            log::debug!(
                "Hard link failed ({}), copying {} -> {}",
                e,
                path.display(),
                target.display()
            );
            copy_new(path, &target)?;
        }
    }

    if let Err(e) = fs::remove_file(path) {
        // Leave exactly one copy behind.
        let _ = fs::remove_file(&target);
        return Err(ActionError::from_io(path, e));
    }

    log::info!("Moved {} -> {}", path.display(), target.display());
    Ok(target)
}

/// Copy `path` into `target`, which must not exist yet.
///
/// A copy that fails part way removes the target again.
fn copy_new(path: &Path, target: &Path) -> Result<(), ActionError> {
    let mut source = File::open(path).map_err(|e| ActionError::from_io(path, e))?;
    let mut out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ActionError::DestinationExists(target.to_path_buf()),
            _ => ActionError::from_io(target, e),
        })?;

    let copied = io::copy(&mut source, &mut out)
        .and_then(|_| source.metadata())
        .and_then(|meta| out.set_permissions(meta.permissions()))
        .and_then(|()| out.sync_all());
    if let Err(e) = copied {
        drop(out);
        let _ = fs::remove_file(target);
        return Err(ActionError::from_io(target, e));
    }
    Ok(())
}

/// Move the duplicate of each record into `destination`.
///
/// # Errors
///
/// Fails up front with `DestinationNotDirectory` when `destination` is not
/// an existing directory. Per-item failures are reported in the result and
/// never abort the batch.
pub fn move_batch(
    records: &[DuplicateRecord],
    destination: &Path,
    config: &MoveConfig,
    callback: Option<&dyn BatchProgressCallback>,
) -> Result<BatchResult, ActionError> {
    if !destination.is_dir() {
        return Err(ActionError::DestinationNotDirectory(
            destination.to_path_buf(),
        ));
    }

    let mut result = BatchResult::default();
    let total = records.len();

    for (index, record) in records.iter().enumerate() {
        let path = &record.duplicate.path;
        if let Some(cb) = callback {
            cb.on_before_item(path, index, total);
        }

        let outcome = match preflight(record, config.verify_unchanged)
            .and_then(|()| move_file(path, destination))
        {
            Ok(to) => ItemOutcome::Moved { to },
            Err(e) => {
                log::warn!("Failed to move {}: {}", path.display(), e);
                ItemOutcome::Failed(e)
            }
        };
        result.push(record, outcome);

        if let (Some(cb), Some(item)) = (callback, result.items.last()) {
            cb.on_item_done(item);
        }
    }

    log::info!("{}", result.summary("Moved"));
    Ok(result)
}
