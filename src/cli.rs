//! Command-line interface definitions for dupfinder.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print a table (default)
//! dupfinder scan ~/Downloads
//!
//! # CSV on stdout, only .jpg duplicates of at least 100 KB
//! dupfinder scan ~/Pictures --output csv --ext .jpg --min-size-kb 100
//!
//! # Move every duplicate aside without prompting
//! dupfinder scan ~/Downloads --move-to ~/dupes --yes
//!
//! # Fingerprint a single file
//! dupfinder hash ~/Downloads/setup.exe --algorithm md5
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::scanner::HashAlgorithm;

/// Find files that share a name, a size and their content.
///
/// The first file seen under each name and size is kept as the original;
/// later identical files are reported as its duplicates.
#[derive(Debug, Parser)]
#[command(name = "dupfinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Print the content fingerprint of a file
    Hash(HashArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Only list duplicates whose name ends with this suffix (e.g. .jpg)
    #[arg(long = "ext", value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// Only list duplicates whose name contains this text (case-insensitive)
    #[arg(long = "name", value_name = "TEXT")]
    pub name_contains: Option<String>,

    /// Only list duplicates of at least this many KB
    #[arg(long, value_name = "KB")]
    pub min_size_kb: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Also skip files matched by the scan root's .gitignore
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Fingerprint algorithm [default: blake3]
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of I/O threads for hashing [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Also write the listed duplicates to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Delete the listed duplicates (to the trash unless --permanent)
    #[arg(long, conflicts_with = "move_to")]
    pub delete: bool,

    /// Use permanent deletion instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Move the listed duplicates into this directory
    #[arg(long, value_name = "DIR")]
    pub move_to: Option<PathBuf>,

    /// Skip confirmation prompts (required for actions in non-interactive mode)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl ScanArgs {
    /// Whether a destructive action was requested.
    #[must_use]
    pub fn has_action(&self) -> bool {
        self.delete || self.move_to.is_some()
    }
}

/// Arguments for the hash subcommand.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// File to fingerprint
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Fingerprint algorithm [default: blake3]
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,
}
