//! Process exit codes and machine-readable error reports.

use serde::Serialize;

use crate::actions::BatchResult;
use crate::duplicates::ScanReport;

/// Exit codes for the `dupfinder` binary.
///
/// - 0: duplicates found
/// - 1: unexpected failure
/// - 2: scan completed, nothing found
/// - 3: completed, but files were skipped or actions failed
/// - 130: interrupted (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Completed with non-fatal per-file failures.
    PartialSuccess = 3,
    /// Interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::NoDuplicates => "DF002",
            Self::PartialSuccess => "DF003",
            Self::Interrupted => "DF130",
        }
    }

    /// Pick the exit code for a finished scan and any batch action run on it.
    ///
    /// Interruption wins, then partial failures, then the found/not-found
    /// distinction.
    #[must_use]
    pub fn for_outcome(report: &ScanReport, batch: Option<&BatchResult>) -> Self {
        if report.cancelled {
            Self::Interrupted
        } else if report.has_skipped() || batch.is_some_and(|b| !b.all_succeeded()) {
            Self::PartialSuccess
        } else if report.is_empty() {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
