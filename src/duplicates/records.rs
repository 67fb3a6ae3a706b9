//! Duplicate records and scan reports.
//!
//! # Overview
//!
//! A scan buckets files by [`CandidateKey`] (base name + size). The first
//! file seen under a key is the reference for that key; every later file in
//! the same bucket whose fingerprint matches becomes a [`DuplicateRecord`]
//! pointing back at that reference. The records of one scan, in discovery
//! order, make up the [`ScanReport`].
//!
//! # Example
//!
//! ```
//! use dupfinder::duplicates::{DuplicateRecord, ScanReport};
//! use dupfinder::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let now = SystemTime::now();
//! let original = FileRecord::new(PathBuf::from("/a.txt"), 2048, now);
//! let duplicate = FileRecord::new(PathBuf::from("/sub/a.txt"), 2048, now);
//!
//! let report = ScanReport::from_records(vec![DuplicateRecord::new(original, duplicate)]);
//! assert_eq!(report.total_count, 1);
//! assert_eq!(report.total_size_bytes, 2048);
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use bytesize::ByteSize;

use crate::scanner::FileRecord;

/// Cheap pre-filter key: files are only compared when both match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    /// Base file name
    pub name: OsString,
    /// File size in bytes
    pub size: u64,
}

impl CandidateKey {
    /// Create a new key.
    #[must_use]
    pub fn new(name: impl Into<OsString>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl From<&FileRecord> for CandidateKey {
    fn from(record: &FileRecord) -> Self {
        Self::new(record.file_name(), record.size)
    }
}

/// A confirmed duplicate paired with the reference file it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    /// First file observed under the shared key; never acted upon
    pub original: FileRecord,
    /// Later file with identical content
    pub duplicate: FileRecord,
    /// Shared size in bytes
    pub size: u64,
    /// Modification time of the duplicate
    pub modified: SystemTime,
}

impl DuplicateRecord {
    /// Pair a duplicate with its original.
    #[must_use]
    pub fn new(original: FileRecord, duplicate: FileRecord) -> Self {
        let size = duplicate.size;
        let modified = duplicate.modified;
        Self {
            original,
            duplicate,
            size,
            modified,
        }
    }

    /// Base file name of the duplicate.
    #[must_use]
    pub fn file_name(&self) -> OsString {
        self.duplicate.file_name()
    }
}

/// Result of one scan session.
///
/// Created fresh by every scan and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Duplicates in the order they were discovered
    pub records: Vec<DuplicateRecord>,
    /// Number of records
    pub total_count: usize,
    /// Sum of record sizes in bytes
    pub total_size_bytes: u64,
    /// Files listed by the enumeration pass
    pub files_discovered: usize,
    /// Files fully processed (including skipped ones)
    pub files_processed: usize,
    /// Files skipped because they could not be read
    pub files_skipped: usize,
    /// Files that were fingerprinted
    pub files_hashed: usize,
    /// Directory entries that could not be listed
    pub walk_errors: usize,
    /// Whether the scan stopped early; `records` is then partial but valid
    pub cancelled: bool,
    /// Wall-clock scan time
    pub duration: Duration,
}

impl ScanReport {
    /// Build a report from records, computing the aggregates.
    #[must_use]
    pub fn from_records(records: Vec<DuplicateRecord>) -> Self {
        let total_size_bytes = records.iter().map(|r| r.size).sum();
        Self {
            total_count: records.len(),
            total_size_bytes,
            records,
            ..Self::default()
        }
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Paths of every duplicate, in report order.
    #[must_use]
    pub fn duplicate_paths(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .map(|r| r.duplicate.path.clone())
            .collect()
    }

    /// Human readable total duplicate size.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size_bytes).to_string()
    }

    /// Whether some files had to be skipped.
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        self.files_skipped > 0 || self.walk_errors > 0
    }
}
