use dupfinder::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupfinder::progress::{ProgressCallback, ProgressEvent, ScanPhase};
use dupfinder::scanner::{HashAlgorithm, WalkerConfig};
use dupfinder::signal::CancellationToken;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressCallback for EventLog {
    fn on_progress(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn pairs(root: &Path) -> Vec<(PathBuf, PathBuf)> {
    let report = DuplicateFinder::with_defaults().scan(root).unwrap();
    report
        .records
        .into_iter()
        .map(|r| (r.duplicate.path, r.original.path))
        .collect()
}

#[test]
fn test_same_name_in_subdirectory_is_duplicate() {
    let dir = TempDir::new().unwrap();
    let original = write(dir.path(), "a.txt", b"0123456789");
    let duplicate = write(dir.path(), "sub/a.txt", b"0123456789");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.total_count, 1);
    assert_eq!(report.total_size_bytes, 10);
    let record = &report.records[0];
    assert_eq!(record.original.path, original);
    assert_eq!(record.duplicate.path, duplicate);
    assert_eq!(record.size, 10);
}

#[test]
fn test_different_names_are_never_compared() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"same bytes");
    write(dir.path(), "b.txt", b"same bytes");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.files_hashed, 0);
}

#[test]
fn test_same_name_different_content_is_not_duplicate() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one/a.txt", b"aaaa");
    write(dir.path(), "two/a.txt", b"bbbb");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.files_hashed, 2);
}

#[test]
fn test_three_copies_share_one_original() {
    let dir = TempDir::new().unwrap();
    let first = write(dir.path(), "x/photo.jpg", b"pixels");
    write(dir.path(), "y/photo.jpg", b"pixels");
    write(dir.path(), "z/photo.jpg", b"pixels");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.total_count, 2);
    assert!(report.records.iter().all(|r| r.original.path == first));
    assert_eq!(
        report.duplicate_paths(),
        vec![
            dir.path().join("y/photo.jpg"),
            dir.path().join("z/photo.jpg")
        ]
    );
}

#[test]
fn test_mismatch_does_not_replace_reference() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/data.bin", b"AAAA");
    let second = write(dir.path(), "b/data.bin", b"BBBB");
    write(dir.path(), "c/data.bin", b"BBBB");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    // b and c match each other, but only the first file seen is compared
    assert!(report.is_empty());
    assert!(!report.duplicate_paths().contains(&second));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(EventLog::default());
    let finder = DuplicateFinder::new(FinderConfig::default().with_progress_callback(log.clone()));

    let report = finder.scan(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.total_size_bytes, 0);
    assert_eq!(report.files_discovered, 0);
    let events = log.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].percent, 100);
    assert_eq!(events[0].total, 0);
}

#[test]
fn test_progress_is_monotonic_and_complete() {
    let dir = TempDir::new().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("d{i}/same.txt"), b"identical");
        write(dir.path(), &format!("d{i}/unique{i}.txt"), b"unique");
    }

    let log = Arc::new(EventLog::default());
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(3)
            .with_progress_callback(log.clone()),
    );
    let report = finder.scan(dir.path()).unwrap();

    assert_eq!(report.total_count, 5);
    let events = log.events.lock().unwrap();
    assert_eq!(events.len(), 12);
    assert!(events.iter().all(|e| e.total == 12));
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert!(events.windows(2).all(|w| w[0].processed < w[1].processed));
    assert_eq!(events.last().unwrap().percent, 100);
    assert_eq!(report.files_processed, 12);
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"alpha");
    write(dir.path(), "k/a.txt", b"alpha");
    write(dir.path(), "k/m/a.txt", b"alpha");
    write(dir.path(), "b.txt", b"beta");
    write(dir.path(), "k/b.txt", b"beta");

    let first = pairs(dir.path());
    let second = pairs(dir.path());

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_every_record_has_identical_content_and_distinct_paths() {
    let dir = TempDir::new().unwrap();
    for (i, body) in [&b"one"[..], b"two", b"one", b"two", b"one"].iter().enumerate() {
        write(dir.path(), &format!("dir{i}/file.dat"), body);
    }

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert!(!report.is_empty());
    for record in &report.records {
        assert_ne!(record.original.path, record.duplicate.path);
        assert_eq!(
            fs::read(&record.original.path).unwrap(),
            fs::read(&record.duplicate.path).unwrap()
        );
    }
    let sum: u64 = report.records.iter().map(|r| r.size).sum();
    assert_eq!(report.total_size_bytes, sum);
}

#[test]
fn test_empty_files_with_same_name_are_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".keep", b"");
    write(dir.path(), "sub/.keep", b"");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.total_count, 1);
    assert_eq!(report.total_size_bytes, 0);
}

#[test]
fn test_skip_hidden_and_ignore_patterns() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".cache/a.txt", b"x");
    write(dir.path(), "a.txt", b"x");
    write(dir.path(), "build/a.txt", b"x");
    write(dir.path(), "src/a.txt", b"x");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(
        false,
        true,
        vec!["build/".to_string()],
    ));
    let report = DuplicateFinder::new(config).scan(dir.path()).unwrap();

    assert_eq!(report.files_discovered, 2);
    assert_eq!(report.duplicate_paths(), vec![dir.path().join("src/a.txt")]);
}

#[test]
fn test_root_gitignore_does_not_hide_duplicates_by_default() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".gitignore", b"*.txt\n");
    write(dir.path(), "a.txt", b"0123456789");
    let duplicate = write(dir.path(), "sub/a.txt", b"0123456789");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.files_discovered, 3);
    assert_eq!(report.total_count, 1);
    assert_eq!(report.duplicate_paths(), vec![duplicate]);

    let config = FinderConfig::default().with_walker_config(
        WalkerConfig::default().with_respect_gitignore(true),
    );
    let report = DuplicateFinder::new(config).scan(dir.path()).unwrap();

    assert_eq!(report.files_discovered, 1);
    assert!(report.is_empty());
}

#[test]
fn test_md5_and_blake3_agree_on_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"payload");
    write(dir.path(), "s/a.txt", b"payload");
    write(dir.path(), "t/a.txt", b"payloaX");

    let blake = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let md5 = DuplicateFinder::new(FinderConfig::default().with_algorithm(HashAlgorithm::Md5))
        .scan(dir.path())
        .unwrap();

    assert_eq!(blake.records, md5.records);
    assert_eq!(md5.total_count, 1);
}

#[test]
fn test_multi_chunk_files_differing_in_last_byte() {
    let dir = TempDir::new().unwrap();
    let mut body = vec![7u8; 64 * 1024 + 3];
    write(dir.path(), "a/big.bin", &body);
    write(dir.path(), "b/big.bin", &body);
    *body.last_mut().unwrap() = 8;
    write(dir.path(), "c/big.bin", &body);

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(report.duplicate_paths(), vec![dir.path().join("b/big.bin")]);
}

#[test]
fn test_cancelled_scan_returns_flagged_partial_report() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"x");
    write(dir.path(), "s/a.txt", b"x");

    let token = CancellationToken::new();
    token.cancel();
    let finder = DuplicateFinder::new(FinderConfig::default().with_cancellation(token));
    let report = finder.scan(dir.path()).unwrap();

    assert!(report.cancelled);
    assert!(report.is_empty());
}

#[test]
fn test_cancel_during_processing() {
    struct CancelOnProcessing(CancellationToken);

    impl ProgressCallback for CancelOnProcessing {
        fn on_phase_start(&self, phase: ScanPhase, _total: usize) {
            if phase == ScanPhase::Processing {
                self.0.cancel();
            }
        }

        fn on_progress(&self, _event: ProgressEvent) {}
    }

    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"x");
    write(dir.path(), "s/a.txt", b"x");

    let token = CancellationToken::new();
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_cancellation(token.clone())
            .with_progress_callback(Arc::new(CancelOnProcessing(token))),
    );
    let report = finder.scan(dir.path()).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.files_discovered, 2);
    assert!(report.files_processed < 2);
    assert!(report.is_empty());
}

#[test]
fn test_root_errors_are_fatal() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "file.txt", b"x");
    let finder = DuplicateFinder::with_defaults();

    assert!(matches!(
        finder.scan(&dir.path().join("missing")),
        Err(FinderError::RootNotFound(_))
    ));
    assert!(matches!(
        finder.scan(&file),
        Err(FinderError::NotADirectory(_))
    ));
}
