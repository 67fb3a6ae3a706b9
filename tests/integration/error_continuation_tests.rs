use dupfinder::duplicates::{DuplicateFinder, FinderConfig};
use dupfinder::progress::{ProgressCallback, ProgressEvent, ScanPhase};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Removes a file once enumeration is over, before it is processed.
struct RemoveBeforeProcessing(PathBuf);

impl ProgressCallback for RemoveBeforeProcessing {
    fn on_phase_start(&self, phase: ScanPhase, _total: usize) {
        if phase == ScanPhase::Processing {
            fs::remove_file(&self.0).unwrap();
        }
    }

    fn on_progress(&self, _event: ProgressEvent) {}
}

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_file_vanishing_after_enumeration_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"keep");
    write(dir.path(), "s/a.txt", b"keep");
    let doomed = write(dir.path(), "s/b.txt", b"gone soon");

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_progress_callback(Arc::new(RemoveBeforeProcessing(doomed))),
    );
    let report = finder.scan(dir.path()).unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.files_discovered, 3);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.total_count, 1);
    assert!(report.has_skipped());
}

#[test]
fn test_vanished_reference_drops_its_candidates() {
    let dir = TempDir::new().unwrap();
    let reference = write(dir.path(), "a.txt", b"same");
    write(dir.path(), "s/a.txt", b"same");

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_progress_callback(Arc::new(RemoveBeforeProcessing(reference))),
    );
    let report = finder.scan(dir.path()).unwrap();

    // s/a.txt becomes the first file seen under its key
    assert!(report.is_empty());
    assert_eq!(report.files_skipped, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"data");
    let locked = write(dir.path(), "s/a.txt", b"data");
    write(dir.path(), "b.txt", b"more");
    write(dir.path(), "s/b.txt", b"more");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway
    if fs::read(&locked).is_ok() {
        return;
    }

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.duplicate_paths(), vec![dir.path().join("s/b.txt")]);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unlistable_directory_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"x");
    write(dir.path(), "open/a.txt", b"x");
    let closed = dir.path().join("closed");
    write(dir.path(), "closed/a.txt", b"x");
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&closed).is_ok() {
        fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();

    // Some platforms skip unreadable directories without reporting them
    assert_eq!(report.files_discovered, 2);
    assert_eq!(report.total_count, 1);
}
