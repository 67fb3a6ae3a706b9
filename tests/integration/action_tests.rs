use clap::Parser;
use dupfinder::actions::{delete_batch, move_batch, ActionError, DeleteConfig, ItemOutcome, MoveConfig};
use dupfinder::cli::Cli;
use dupfinder::duplicates::{DuplicateFinder, RecordFilter};
use dupfinder::error::ExitCode;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn populate(root: &Path) {
    write(root, "a.txt", b"alpha");
    write(root, "one/a.txt", b"alpha");
    write(root, "two/a.txt", b"alpha");
    write(root, "b.log", b"beta");
    write(root, "one/b.log", b"beta");
}

#[test]
fn test_delete_then_rescan_finds_nothing() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    assert_eq!(report.total_count, 3);

    let result = delete_batch(&report.records, &DeleteConfig::permanent(), None);
    assert!(result.all_succeeded());
    assert_eq!(result.bytes_affected(), report.total_size_bytes);
    for record in &report.records {
        assert!(record.original.path.exists());
        assert!(!record.duplicate.path.exists());
    }

    let rescan = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    assert!(rescan.is_empty());
}

#[test]
fn test_delete_only_filtered_records() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let selection = RecordFilter::new().with_extension(".log").apply(&report).to_records();

    let result = delete_batch(&selection, &DeleteConfig::permanent(), None);

    assert_eq!(result.success_count(), 1);
    assert!(!dir.path().join("one/b.log").exists());
    assert!(dir.path().join("one/a.txt").exists());
    assert!(dir.path().join("two/a.txt").exists());
}

#[test]
fn test_delete_batch_reports_vanished_item() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    fs::remove_file(dir.path().join("one/a.txt")).unwrap();

    let result = delete_batch(&report.records, &DeleteConfig::permanent(), None);

    assert_eq!(result.total_count(), 3);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 2);
    let (path, err) = result.failures().next().unwrap();
    assert_eq!(path, dir.path().join("one/a.txt"));
    assert!(matches!(err, ActionError::NotFound(_)));
}

#[test]
fn test_move_duplicates_aside() {
    let dir = TempDir::new().unwrap();
    let scan_root = dir.path().join("tree");
    let dest = dir.path().join("dupes");
    fs::create_dir(&dest).unwrap();
    populate(&scan_root);

    let report = DuplicateFinder::with_defaults().scan(&scan_root).unwrap();
    let result = move_batch(&report.records, &dest, &MoveConfig::default(), None).unwrap();

    // Records run one/a.txt, one/b.log, two/a.txt; the last collides with
    // the first at the destination
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);
    let collided = result
        .items
        .iter()
        .find(|item| item.path == scan_root.join("two/a.txt"))
        .unwrap();
    assert!(matches!(
        collided.outcome,
        ItemOutcome::Failed(ActionError::DestinationExists(_))
    ));
    assert!(dest.join("a.txt").exists());
    assert!(dest.join("b.log").exists());
    assert!(scan_root.join("two/a.txt").exists());
    assert!(scan_root.join("a.txt").exists());
}

#[test]
fn test_run_app_permanent_delete() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let cli = Cli::try_parse_from([
        "dupfinder",
        "-q",
        "scan",
        dir.path().to_str().unwrap(),
        "--output",
        "json",
        "--delete",
        "--permanent",
        "--yes",
    ])
    .unwrap();
    let code = dupfinder::run_app(cli).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("one/a.txt").exists());
    assert!(!dir.path().join("two/a.txt").exists());
    assert!(!dir.path().join("one/b.log").exists());
}

#[test]
fn test_run_app_move_with_filter() {
    let dir = TempDir::new().unwrap();
    let scan_root = dir.path().join("tree");
    let dest = dir.path().join("dupes");
    fs::create_dir(&dest).unwrap();
    populate(&scan_root);

    let cli = Cli::try_parse_from([
        "dupfinder",
        "-q",
        "scan",
        scan_root.to_str().unwrap(),
        "--output",
        "csv",
        "--name",
        "B.LOG",
        "--move-to",
        dest.to_str().unwrap(),
        "--yes",
    ])
    .unwrap();
    let code = dupfinder::run_app(cli).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dest.join("b.log").exists());
    assert!(!scan_root.join("one/b.log").exists());
    assert!(scan_root.join("one/a.txt").exists());
}

#[test]
fn test_run_app_move_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let cli = Cli::try_parse_from([
        "dupfinder",
        "-q",
        "scan",
        dir.path().to_str().unwrap(),
        "--output",
        "json",
        "--move-to",
        dir.path().join("nowhere").to_str().unwrap(),
        "--yes",
    ])
    .unwrap();

    assert!(dupfinder::run_app(cli).is_err());
    assert!(dir.path().join("one/a.txt").exists());
}
