//! File actions module.
//!
//! Batch commands over a selection of [`DuplicateRecord`]s:
//! - Delete to the system trash (default, recoverable)
//! - Permanent deletion (requires explicit configuration)
//! - Move into another directory
//!
//! Commands only ever act on `record.duplicate`. Each item is attempted
//! independently and reported in a [`BatchResult`].
//!
//! ```no_run
//! use dupfinder::actions::{move_batch, MoveConfig};
//! use dupfinder::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().scan(Path::new(".")).unwrap();
//! let result = move_batch(&report.records, Path::new("/tmp/dupes"), &MoveConfig::default(), None);
//! ```
//!
//! [`DuplicateRecord`]: crate::duplicates::DuplicateRecord

pub mod batch;
pub mod delete;
pub mod relocate;

pub use batch::{ActionError, BatchProgressCallback, BatchResult, ItemOutcome, ItemResult};
pub use delete::{delete_batch, delete_to_trash, permanent_delete, DeleteConfig};
pub use relocate::{move_batch, move_file, MoveConfig};
