use dupfinder::duplicates::{DuplicateFinder, RecordFilter};
use dupfinder::error::ExitCode;
use dupfinder::output::{CsvOutput, JsonOutput};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_csv_export_of_scan() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", &[b'a'; 3000]);
    write(dir.path(), "s/a.txt", &[b'a'; 3000]);
    write(dir.path(), "b.jpg", &[b'b'; 10]);
    write(dir.path(), "s/b.jpg", &[b'b'; 10]);

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let out = dir.path().join("export.csv");
    CsvOutput::new(&report.records).write_file(&out).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["SL", "Duplicate", "Original", "Size", "Modified"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);

    let by_name = |name: &str| {
        rows.iter()
            .find(|r| r[1].ends_with(name))
            .unwrap_or_else(|| panic!("no row for {name}"))
    };
    let a = by_name("a.txt");
    assert_eq!(&a[2], dir.path().join("a.txt").to_string_lossy());
    assert_eq!(&a[3], "2 KB");
    assert_eq!(&by_name("b.jpg")[3], "0 KB");

    let sl: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(sl, vec!["1", "2"]);

    // YYYY-MM-DD HH:MM
    let modified = &a[4];
    assert_eq!(modified.len(), 16);
    assert_eq!(&modified[4..5], "-");
    assert_eq!(&modified[10..11], " ");
    assert_eq!(&modified[13..14], ":");
}

#[test]
fn test_filtered_export_only_contains_view() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"text");
    write(dir.path(), "s/a.txt", b"text");
    write(dir.path(), "Pic.JPG", b"image");
    write(dir.path(), "s/Pic.JPG", b"image");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let view = RecordFilter::new().with_extension(".jpg").apply(&report);

    let csv = CsvOutput::new(view.records.iter().copied())
        .to_string()
        .unwrap();

    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Pic.JPG"));
    assert!(!csv.contains("a.txt"));
}

#[test]
fn test_json_export_of_scan() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"0123456789");
    write(dir.path(), "s/a.txt", b"0123456789");

    let report = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let json = JsonOutput::new(&report.records, &report, ExitCode::Success)
        .to_json()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let duplicates = parsed["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0]["size"], 10);
    assert!(duplicates[0]["duplicate"]
        .as_str()
        .unwrap()
        .ends_with("a.txt"));
    assert_eq!(parsed["summary"]["files_discovered"], 2);
    assert_eq!(parsed["summary"]["total_size_bytes"], 10);
}
