//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Name+size candidate bucketing
//! - Fingerprint comparison against the first file seen per bucket
//! - Scan reports and review filters

pub mod filter;
pub mod finder;
pub mod records;

pub use filter::{FilteredView, RecordFilter};
pub use finder::{DuplicateFinder, FinderConfig, FinderError};
pub use records::{CandidateKey, DuplicateRecord, ScanReport};
