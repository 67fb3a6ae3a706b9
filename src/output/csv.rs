//! CSV export of duplicate records.
//!
//! One row per record, in the order given:
//!
//! - `SL`: 1-based row number
//! - `Duplicate`: path of the duplicate file
//! - `Original`: path of the reference file it matched
//! - `Size`: whole kibibytes, rendered as `<size / 1024> KB`
//! - `Modified`: duplicate's mtime as `YYYY-MM-DD HH:MM`, local time
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::DuplicateFinder;
//! use dupfinder::output::csv::CsvOutput;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().scan(Path::new(".")).unwrap();
//! CsvOutput::new(&report.records).write_to(std::io::stdout()).unwrap();
//! ```

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateRecord;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "SL")]
    sl: usize,
    #[serde(rename = "Duplicate")]
    duplicate: String,
    #[serde(rename = "Original")]
    original: String,
    #[serde(rename = "Size")]
    size: String,
    #[serde(rename = "Modified")]
    modified: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: Vec<&'a DuplicateRecord>,
}

impl<'a> CsvOutput<'a> {
    /// Create a formatter over `records`.
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = &'a DuplicateRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Write the CSV document, header included.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.records.is_empty() {
            csv_writer.write_record(["SL", "Duplicate", "Original", "Size", "Modified"])?;
        }

        for (idx, record) in self.records.iter().enumerate() {
            csv_writer.serialize(CsvRow {
                sl: idx + 1,
                duplicate: record.duplicate.path.to_string_lossy().into_owned(),
                original: record.original.path.to_string_lossy().into_owned(),
                size: format_size_kb(record.size),
                modified: format_modified(record.modified),
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write the CSV document to a new file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> Result<(), CsvOutputError> {
        let file = File::create(path)?;
        self.write_to(io::BufWriter::new(file))?;
        log::info!(
            "Exported {} record(s) to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}

/// Render a byte count as whole KiB, floor division.
#[must_use]
pub fn format_size_kb(size: u64) -> String {
    format!("{} KB", size / 1024)
}

/// Render a timestamp as `YYYY-MM-DD HH:MM` in local time.
#[must_use]
pub fn format_modified(modified: SystemTime) -> String {
    let datetime: DateTime<Local> = modified.into();
    datetime.format("%Y-%m-%d %H:%M").to_string()
}
