//! Duplicate finder: name+size bucketing followed by content fingerprints.
//!
//! # Overview
//!
//! A scan runs in two passes:
//! 1. **Enumerate**: walk the root and list every regular file, so the total
//!    is known before any work is done and progress percentages are exact.
//! 2. **Process**: capture each file's size and mtime in traversal order and
//!    bucket it by [`CandidateKey`]. The first file under a key becomes that
//!    key's reference; each later file is a candidate, fingerprinted together
//!    with its reference on a bounded worker pool. Matching fingerprints
//!    produce a [`DuplicateRecord`].
//!
//! Only the reference of a key is ever compared against. Three identical
//! files sharing a name and size yield (1, 2) and (1, 3), never (2, 3).
//! A mismatching candidate is dropped and does not replace the reference.
//!
//! Per-file failures (vanished files, permission errors, read faults) are
//! counted in [`ScanReport::files_skipped`] and never abort the scan. Only
//! an unusable root is fatal.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::{DuplicateFinder, FinderConfig};
//! use dupfinder::progress::{ProgressEvent, ProgressFn};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = FinderConfig::default().with_progress_callback(Arc::new(ProgressFn(
//!     |e: ProgressEvent| eprintln!("{}/{} {}%", e.processed, e.total, e.percent),
//! )));
//! let finder = DuplicateFinder::new(config);
//! let report = finder.scan(Path::new(".")).unwrap();
//!
//! for record in &report.records {
//!     println!("{} duplicates {}", record.duplicate.path.display(), record.original.path.display());
//! }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use super::{CandidateKey, DuplicateRecord, ScanReport};
use crate::progress::{ProgressCallback, ProgressCounter, ScanPhase};
use crate::scanner::{
    FileRecord, Fingerprint, HashAlgorithm, HashError, Hasher, Walker, WalkerConfig,
};
use crate::signal::CancellationToken;

/// Configuration for a [`DuplicateFinder`].
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Directory walk options.
    pub walker_config: WalkerConfig,
    /// Optional cancellation token.
    pub cancellation: Option<CancellationToken>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("cancellation", &self.cancellation)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            algorithm: HashAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            cancellation: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Errors that abort a scan before any result is produced.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path does not exist.
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root path could not be inspected.
    #[error("Cannot access {path}: {source}")]
    RootAccess {
        /// Root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The hashing worker pool could not be started.
    #[error("Failed to start hashing workers: {0}")]
    ThreadPool(String),
}

/// A later file sharing its key with an earlier reference.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Index of the candidate in the processed file list
    file: usize,
    /// Index of the key's reference in the processed file list
    reference: usize,
}

/// Output of the bucketing pass.
#[derive(Debug, Default)]
struct Buckets {
    files: Vec<FileRecord>,
    candidates: Vec<Candidate>,
    skipped: usize,
}

/// Duplicate finder.
///
/// Holds only configuration; every [`scan`](Self::scan) starts from scratch,
/// so one finder can be reused across scans.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan `root` for duplicate files.
    ///
    /// # Errors
    ///
    /// Only for an unusable root: `RootNotFound`, `NotADirectory` or
    /// `RootAccess`, or if the hashing pool cannot start. Per-file problems
    /// are absorbed and counted. Cancellation is not an error: the partial
    /// report is returned with `cancelled` set.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let started = Instant::now();
        validate_root(root)?;
        log::info!("Scanning {}", root.display());

        let (paths, walk_errors) = self.enumerate(root);
        let total = paths.len();
        log::info!("Enumeration found {} files", total);

        let counter = ProgressCounter::new(self.config.progress_callback.clone(), total);
        let mut report = if total == 0 {
            counter.finish_empty();
            ScanReport::default()
        } else {
            self.notify_phase_start(ScanPhase::Processing, total);
            let report = self.process(paths, &counter)?;
            self.notify_phase_end(ScanPhase::Processing);
            report
        };

        report.files_discovered = total;
        report.files_processed = counter.processed();
        report.walk_errors = walk_errors;
        report.cancelled = self.config.is_cancelled();
        report.duration = started.elapsed();

        if report.cancelled {
            log::info!(
                "Scan cancelled after {}/{} files, {} duplicate(s) so far",
                report.files_processed,
                total,
                report.total_count
            );
        } else {
            log::info!(
                "Scan complete: {} duplicate(s), {} in {:.2?} ({} skipped)",
                report.total_count,
                report.total_size_display(),
                report.duration,
                report.files_skipped
            );
        }

        Ok(report)
    }

    /// First pass: list every file under `root`.
    fn enumerate(&self, root: &Path) -> (Vec<PathBuf>, usize) {
        self.notify_phase_start(ScanPhase::Enumerating, 0);

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref token) = self.config.cancellation {
            walker = walker.with_cancellation(token.clone());
        }

        let mut paths = Vec::new();
        let mut errors = 0;
        for entry in walker.walk() {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    errors += 1;
                }
            }
        }

        self.notify_phase_end(ScanPhase::Enumerating);
        (paths, errors)
    }

    /// Second pass: bucket, fingerprint, compare.
    fn process(
        &self,
        paths: Vec<PathBuf>,
        counter: &ProgressCounter,
    ) -> Result<ScanReport, FinderError> {
        let buckets = self.bucket(paths, counter);
        let (fingerprints, hash_failures) = self.fingerprint(&buckets, counter)?;

        let mut records = Vec::new();
        for candidate in &buckets.candidates {
            let (Some(file_hash), Some(reference_hash)) = (
                fingerprints.get(&candidate.file),
                fingerprints.get(&candidate.reference),
            ) else {
                continue;
            };

            let file = &buckets.files[candidate.file];
            let reference = &buckets.files[candidate.reference];
            if file_hash == reference_hash {
                log::debug!(
                    "Duplicate: {} matches {}",
                    file.path.display(),
                    reference.path.display()
                );
                records.push(DuplicateRecord::new(reference.clone(), file.clone()));
            } else {
                log::trace!(
                    "Same name and size, different content: {} vs {}",
                    file.path.display(),
                    reference.path.display()
                );
            }
        }

        let mut report = ScanReport::from_records(records);
        report.files_skipped = buckets.skipped + hash_failures;
        report.files_hashed = fingerprints.len();
        Ok(report)
    }

    /// Capture metadata in traversal order and bucket by candidate key.
    ///
    /// Runs on the calling thread, which is the only writer of the key map.
    fn bucket(&self, paths: Vec<PathBuf>, counter: &ProgressCounter) -> Buckets {
        let mut buckets = Buckets::default();
        let mut references: HashMap<CandidateKey, usize> = HashMap::new();

        for path in paths {
            if self.config.is_cancelled() {
                log::debug!("Bucketing: cancellation requested");
                break;
            }

            let record = match FileRecord::capture(&path) {
                Ok(record) => record,
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    buckets.skipped += 1;
                    counter.tick();
                    continue;
                }
            };

            let index = buckets.files.len();
            match references.get(&CandidateKey::from(&record)) {
                Some(&reference) => buckets.candidates.push(Candidate {
                    file: index,
                    reference,
                }),
                None => {
                    references.insert(CandidateKey::from(&record), index);
                    // References are done until a candidate needs them
                    counter.tick();
                }
            }
            buckets.files.push(record);
        }

        log::debug!(
            "{} keys, {} candidate(s) need fingerprints",
            references.len(),
            buckets.candidates.len()
        );
        buckets
    }

    /// Fingerprint every candidate and every reference that has one.
    ///
    /// Each file is hashed once. Candidates tick progress when their own
    /// fingerprint completes, successful or not.
    fn fingerprint(
        &self,
        buckets: &Buckets,
        counter: &ProgressCounter,
    ) -> Result<(HashMap<usize, Fingerprint>, usize), FinderError> {
        if buckets.candidates.is_empty() {
            return Ok((HashMap::new(), 0));
        }

        let candidate_files: HashSet<usize> = buckets.candidates.iter().map(|c| c.file).collect();
        let work: Vec<usize> = buckets
            .candidates
            .iter()
            .flat_map(|c| [c.reference, c.file])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut hasher = Hasher::with_algorithm(self.config.algorithm);
        if let Some(ref token) = self.config.cancellation {
            hasher = hasher.with_cancellation(token.clone());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
            .map_err(|e| FinderError::ThreadPool(e.to_string()))?;

        log::info!(
            "Fingerprinting {} files with {} ({} workers)",
            work.len(),
            self.config.algorithm,
            self.config.io_threads
        );

        let results: Vec<(usize, Result<Fingerprint, HashError>)> = pool.install(|| {
            work.par_iter()
                .filter_map(|&index| {
                    if self.config.is_cancelled() {
                        return None;
                    }
                    let path = &buckets.files[index].path;
                    let result = hasher.hash(path);
                    if candidate_files.contains(&index) && !is_interruption(&result) {
                        counter.tick();
                    }
                    Some((index, result))
                })
                .collect()
        });

        let mut fingerprints = HashMap::with_capacity(results.len());
        let mut failures = 0;
        for (index, result) in results {
            match result {
                Ok(fingerprint) => {
                    fingerprints.insert(index, fingerprint);
                }
                Err(e) if e.is_interrupted() => {}
                Err(e) => {
                    log::warn!("Skipping {}: {}", buckets.files[index].path.display(), e);
                    failures += 1;
                }
            }
        }

        Ok((fingerprints, failures))
    }

    fn notify_phase_start(&self, phase: ScanPhase, total: usize) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(phase, total);
        }
    }

    fn notify_phase_end(&self, phase: ScanPhase) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(phase);
        }
    }
}

fn is_interruption(result: &Result<Fingerprint, HashError>) -> bool {
    result.as_ref().is_err_and(HashError::is_interrupted)
}

/// Reject roots that are missing or not directories.
fn validate_root(root: &Path) -> Result<(), FinderError> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(FinderError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FinderError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(FinderError::RootAccess {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}
