//! dupfinder - duplicate file finder
//!
//! Files are compared only when they share a base name and a size; each
//! such candidate is then confirmed by a content fingerprint (BLAKE3 by
//! default). The first file seen under a name and size is the original,
//! every later identical file a duplicate of it. Duplicates can be exported
//! as CSV/JSON, deleted (to the trash by default) or moved aside.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{delete_batch, move_batch, BatchResult, DeleteConfig, MoveConfig};
use crate::cli::{Cli, Commands, HashArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateRecord, RecordFilter, ScanReport};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, OutputFormat, TableOutput};
use crate::progress::Progress;
use crate::scanner::Hasher;
use crate::signal::CancellationToken;

/// Run the command line application.
///
/// # Errors
///
/// Returns an error for fatal failures: unusable scan root, unreadable
/// config file, output or export failures.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan(args) => run_scan(&args, config, cli.quiet),
        Commands::Hash(args) => run_hash(&args, &config),
    }
}

fn run_hash(args: &HashArgs, config: &Config) -> Result<ExitCode> {
    let algorithm = args.algorithm.unwrap_or(config.algorithm);
    let fingerprint = Hasher::with_algorithm(algorithm)
        .hash(&args.path)
        .with_context(|| format!("hashing {}", args.path.display()))?;

    println!("{}  {}", fingerprint, args.path.display());
    Ok(ExitCode::Success)
}

fn run_scan(args: &ScanArgs, mut config: Config, quiet: bool) -> Result<ExitCode> {
    config.apply_scan_args(args);

    let token = signal::install_handler().unwrap_or_else(|e| {
        log::warn!("{}; Ctrl+C will terminate immediately", e);
        CancellationToken::new()
    });
    let progress = Arc::new(Progress::new(quiet || args.output != OutputFormat::Table));

    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_cancellation(token.clone())
            .with_progress_callback(progress.clone()),
    );
    let report = finder
        .scan(&args.path)
        .with_context(|| format!("scanning {}", args.path.display()))?;

    let filter = build_filter(args);
    let view = filter.apply(&report);
    if filter.is_active() {
        log::info!(
            "Filter kept {} of {} duplicate(s)",
            view.len(),
            report.total_count
        );
    }

    let preliminary = ExitCode::for_outcome(&report, None);
    write_report(args.output, &view.records, &report, preliminary)?;

    if let Some(ref path) = args.export {
        CsvOutput::new(view.records.iter().copied())
            .write_file(path)
            .with_context(|| format!("exporting CSV to {}", path.display()))?;
    }

    let batch = if args.has_action() && !report.cancelled && !view.is_empty() {
        run_action(args, &config, &view.to_records(), &progress)?
    } else {
        if report.cancelled && args.has_action() {
            log::warn!("Scan was interrupted; skipping file actions");
        }
        None
    };

    if let Some(ref batch) = batch {
        for (path, err) in batch.failures() {
            log::warn!("{}: {}", path.display(), err);
        }
    }

    Ok(ExitCode::for_outcome(&report, batch.as_ref()))
}

fn build_filter(args: &ScanArgs) -> RecordFilter {
    let mut filter = RecordFilter::new();
    if let Some(ref ext) = args.extension {
        filter = filter.with_extension(ext.as_str());
    }
    if let Some(ref name) = args.name_contains {
        filter = filter.with_name_contains(name.as_str());
    }
    if let Some(kb) = args.min_size_kb {
        filter = filter.with_min_size_kb(kb);
    }
    filter
}

fn write_report(
    format: OutputFormat,
    records: &[&DuplicateRecord],
    report: &ScanReport,
    exit_code: ExitCode,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Table => {
            TableOutput::new(records.iter().copied()).write_to(&mut out)?;
            if report.has_skipped() {
                writeln!(
                    out,
                    "Skipped {} unreadable file(s), {} directory error(s)",
                    report.files_skipped, report.walk_errors
                )?;
            }
        }
        OutputFormat::Csv => CsvOutput::new(records.iter().copied()).write_to(&mut out)?,
        OutputFormat::Json => {
            JsonOutput::new(records.iter().copied(), report, exit_code).write_to(&mut out, true)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_action(
    args: &ScanArgs,
    config: &Config,
    records: &[DuplicateRecord],
    progress: &Arc<Progress>,
) -> Result<Option<BatchResult>> {
    let prompt = match args.move_to {
        Some(ref dest) => format!(
            "Move {} duplicate file(s) to {}?",
            records.len(),
            dest.display()
        ),
        None if config.permanent_delete => format!(
            "Permanently delete {} duplicate file(s)? This cannot be undone.",
            records.len()
        ),
        None => format!("Move {} duplicate file(s) to the trash?", records.len()),
    };

    if !confirm(&prompt, args.yes)? {
        log::info!("Action cancelled by user");
        return Ok(None);
    }

    let callback: &dyn actions::BatchProgressCallback = progress.as_ref();
    let batch = match args.move_to {
        Some(ref dest) => move_batch(records, dest, &MoveConfig::default(), Some(callback))
            .with_context(|| format!("moving duplicates to {}", dest.display()))?,
        None => {
            let delete_config = DeleteConfig {
                permanent: config.permanent_delete,
                ..DeleteConfig::default()
            };
            delete_batch(records, &delete_config, Some(callback))
        }
    };

    let verb = if args.move_to.is_some() { "Moved" } else { "Deleted" };
    eprintln!("{}", batch.summary(verb));
    Ok(Some(batch))
}

/// Ask a yes/no question on stderr.
///
/// `--yes` answers for the user. Without a terminal on stdin there is nobody
/// to ask, which is an error rather than an implicit "no".
fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        anyhow::bail!("refusing to modify files without --yes in non-interactive mode");
    }

    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
