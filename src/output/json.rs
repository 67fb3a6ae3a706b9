//! JSON output formatter for scan reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "duplicate": "/root/sub/a.txt",
//!       "original": "/root/a.txt",
//!       "size": 1024,
//!       "modified": "2024-03-09T14:05:59+00:00"
//!     }
//!   ],
//!   "summary": {
//!     "total_count": 1,
//!     "total_size_bytes": 1024,
//!     "files_discovered": 2,
//!     "files_processed": 2,
//!     "files_skipped": 0,
//!     "files_hashed": 2,
//!     "walk_errors": 0,
//!     "scan_duration_ms": 12,
//!     "cancelled": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateRecord, ScanReport};
use crate::error::ExitCode;

/// One record in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// Path of the duplicate
    pub duplicate: String,
    /// Path of the original it matched
    pub original: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time of the duplicate (RFC 3339, UTC)
    pub modified: String,
}

impl From<&DuplicateRecord> for JsonRecord {
    fn from(record: &DuplicateRecord) -> Self {
        let modified: DateTime<Utc> = record.modified.into();
        Self {
            duplicate: record.duplicate.path.to_string_lossy().into_owned(),
            original: record.original.path.to_string_lossy().into_owned(),
            size: record.size,
            modified: modified.to_rfc3339(),
        }
    }
}

/// Summary statistics in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of records emitted
    pub total_count: usize,
    /// Sum of emitted record sizes
    pub total_size_bytes: u64,
    /// Files listed by the enumeration pass
    pub files_discovered: usize,
    /// Files processed
    pub files_processed: usize,
    /// Files skipped after read failures
    pub files_skipped: usize,
    /// Files fingerprinted
    pub files_hashed: usize,
    /// Unlistable directory entries
    pub walk_errors: usize,
    /// Scan wall-clock time in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was cancelled
    pub cancelled: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Emitted records
    pub duplicates: Vec<JsonRecord>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for `records`, taking scan counters from `report`.
    ///
    /// `records` is usually the whole report, or a filtered view of it; the
    /// totals always describe what is emitted.
    #[must_use]
    pub fn new<'a>(
        records: impl IntoIterator<Item = &'a DuplicateRecord>,
        report: &ScanReport,
        exit_code: ExitCode,
    ) -> Self {
        let duplicates: Vec<JsonRecord> = records.into_iter().map(JsonRecord::from).collect();
        let total_size_bytes = duplicates.iter().map(|r| r.size).sum();
        Self {
            summary: JsonSummary {
                total_count: duplicates.len(),
                total_size_bytes,
                files_discovered: report.files_discovered,
                files_processed: report.files_processed,
                files_skipped: report.files_skipped,
                files_hashed: report.files_hashed,
                walk_errors: report.walk_errors,
                scan_duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                cancelled: report.cancelled,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            duplicates,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
