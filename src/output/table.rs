//! Plain-text table for the terminal.
//!
//! Columns mirror the CSV export (`SL`, `Duplicate`, `Original`, `Size`,
//! `Modified`), followed by a totals line:
//!
//! ```text
//! Total Duplicates: 2   |   Total Size: 0.04 MB
//! ```

use std::io::{self, Write};

use yansi::Paint;

use super::csv::{format_modified, format_size_kb};
use crate::duplicates::DuplicateRecord;

/// Table formatter.
pub struct TableOutput<'a> {
    records: Vec<&'a DuplicateRecord>,
}

impl<'a> TableOutput<'a> {
    /// Create a formatter over `records`.
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = &'a DuplicateRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Sum of the listed record sizes.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// The totals line.
    #[must_use]
    pub fn totals_line(&self) -> String {
        format!(
            "Total Duplicates: {}   |   Total Size: {}",
            self.records.len(),
            format_size_mb(self.total_size_bytes())
        )
    }

    /// Write the table and the totals line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let rows: Vec<[String; 5]> = self
            .records
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                [
                    (idx + 1).to_string(),
                    r.duplicate.path.display().to_string(),
                    r.original.path.display().to_string(),
                    format_size_kb(r.size),
                    format_modified(r.modified),
                ]
            })
            .collect();

        if !rows.is_empty() {
            let header = ["SL", "Duplicate", "Original", "Size", "Modified"];
            let mut widths = header.map(str::len);
            for row in &rows {
                for (w, cell) in widths.iter_mut().zip(row) {
                    *w = (*w).max(cell.chars().count());
                }
            }

            let header_line = join_cells(header.iter().copied(), &widths);
            writeln!(writer, "{}", header_line.bold())?;
            for row in &rows {
                writeln!(writer, "{}", join_cells(row.iter().map(String::as_str), &widths))?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", self.totals_line().bold())
    }
}

fn join_cells<'c>(cells: impl Iterator<Item = &'c str>, widths: &[usize; 5]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render a byte count as mebibytes with two decimals, e.g. `1.50 MB`.
#[must_use]
pub fn format_size_mb(size: u64) -> String {
    format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
}
