//! Output formatters for scan reports.
//!
//! - CSV export, the stable interchange format
//! - JSON for automation and scripting
//! - A plain table for the terminal
//!
//! Every formatter takes an iterator of records, so a whole report and a
//! filtered view render the same way.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::{DuplicateFinder, RecordFilter};
//! use dupfinder::output::TableOutput;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().scan(Path::new(".")).unwrap();
//! let view = RecordFilter::new().with_extension(".jpg").apply(&report);
//! TableOutput::new(view.records.iter().copied())
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

use clap::ValueEnum;

pub mod csv;
pub mod json;
pub mod table;

pub use csv::{CsvOutput, CsvOutputError};
pub use json::{JsonOutput, JsonOutputError};
pub use table::TableOutput;

/// Report format for `dupfinder scan`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// CSV document
    Csv,
    /// JSON document
    Json,
}
