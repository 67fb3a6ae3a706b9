//! Review filters over a finished report.
//!
//! Filters never touch the report itself; they produce a [`FilteredView`]
//! borrowing the matching records, with totals recomputed for the view.
//! Matching is done on the duplicate's base file name:
//!
//! - `extension`: case-insensitive suffix match (`.jpg`, or just `jpg`)
//! - `name_contains`: case-insensitive substring
//! - `min_size_kb`: records smaller than `min_size_kb * 1024` bytes are hidden

use crate::duplicates::{DuplicateRecord, ScanReport};

/// Filter criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// File name suffix, e.g. `.jpg`
    pub extension: Option<String>,
    /// Substring that must appear in the file name
    pub name_contains: Option<String>,
    /// Minimum size in KiB
    pub min_size_kb: Option<u64>,
}

impl RecordFilter {
    /// Create a filter that matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep file names ending in `extension`.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = normalize(extension.into());
        self
    }

    /// Only keep file names containing `needle`.
    #[must_use]
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = normalize(needle.into());
        self
    }

    /// Only keep records of at least `kb` KiB.
    #[must_use]
    pub fn with_min_size_kb(mut self, kb: u64) -> Self {
        self.min_size_kb = Some(kb);
        self
    }

    /// Whether any criterion is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.extension.is_some() || self.name_contains.is_some() || self.min_size_kb.is_some()
    }

    /// Whether `record` passes every criterion.
    #[must_use]
    pub fn matches(&self, record: &DuplicateRecord) -> bool {
        let name = record.file_name().to_string_lossy().to_lowercase();

        if let Some(ref ext) = self.extension {
            if !name.ends_with(ext.as_str()) {
                return false;
            }
        }
        if let Some(ref needle) = self.name_contains {
            if !name.contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(kb) = self.min_size_kb {
            if record.size < kb.saturating_mul(1024) {
                return false;
            }
        }
        true
    }

    /// Apply the filter to a report.
    #[must_use]
    pub fn apply<'a>(&self, report: &'a ScanReport) -> FilteredView<'a> {
        let records: Vec<&DuplicateRecord> =
            report.records.iter().filter(|r| self.matches(r)).collect();
        let total_size_bytes = records.iter().map(|r| r.size).sum();
        FilteredView {
            records,
            total_size_bytes,
        }
    }
}

/// Trim and lowercase, mapping empty input to "no criterion".
fn normalize(value: String) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The subset of a report that passed a [`RecordFilter`].
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    /// Matching records, in report order
    pub records: Vec<&'a DuplicateRecord>,
    /// Sum of the matching record sizes
    pub total_size_bytes: u64,
}

impl<'a> FilteredView<'a> {
    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Matching records, owned, for handing to batch actions.
    #[must_use]
    pub fn to_records(&self) -> Vec<DuplicateRecord> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}
