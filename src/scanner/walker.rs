//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, the first pass of a scan: it
//! lists every regular file under a root before any metadata is captured, so
//! the total file count is known up front.
//!
//! # Ordering
//!
//! Traversal is depth-first and deterministic. Within each directory, files
//! come before subdirectories and both are sorted by name, so a root-level
//! `a.txt` is always seen before `sub/a.txt`.
//!
//! # Features
//!
//! - Configurable symlink following (off by default, avoiding cycles)
//! - Gitignore-style pattern matching via the `ignore` crate, with the
//!   root's `.gitignore` applied only on request
//! - Hidden file filtering
//! - Cooperative cancellation via [`CancellationToken`]
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{ScanError, WalkerConfig};
use crate::signal::CancellationToken;

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional token for graceful termination
    cancellation: Option<CancellationToken>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupfinder::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            cancellation: None,
        }
    }

    /// Stop yielding entries once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Build gitignore matcher from config patterns and, when enabled, the
    /// root's .gitignore file.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let gitignore_path = self.root.join(".gitignore");
        if self.config.respect_gitignore && gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check a file against the ignore patterns, including its parent directories.
    fn should_ignore(&self, path: &Path, gitignore: Option<&Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        gi.matched_path_or_any_parents(relative, false).is_ignore()
    }

    /// Walk the directory tree, yielding regular file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Iteration ends early once cancellation is requested.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Files first, then directories, each sorted by name
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a
                        .file_type()
                        .is_dir()
                        .cmp(&b.file_type().is_dir())
                        .then_with(|| a.file_name().cmp(b.file_name())),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let cancelled = self.is_cancelled();
                if cancelled {
                    log::debug!("Walker: cancellation requested, stopping iteration");
                }
                !cancelled
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    if self.should_ignore(&path, gitignore.as_ref()) {
                        log::trace!("Ignoring file: {}", path.display());
                        return None;
                    }

                    // Sockets, FIFOs and device nodes are not candidates
                    if !file_type.is_file() && !file_type.is_symlink() {
                        log::trace!("Skipping special file: {}", path.display());
                        return None;
                    }

                    Some(Ok(path))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(Self::convert_walk_error(path, e)))
                }
            })
    }

    /// Convert a jwalk error into a [`ScanError`].
    fn convert_walk_error(path: PathBuf, error: jwalk::Error) -> ScanError {
        let message = error.to_string();
        let kind = error.io_error().map(io::Error::kind);
        log::debug!("Walk error at {}: {}", path.display(), message);

        match kind {
            Some(io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            Some(io::ErrorKind::NotFound) => ScanError::NotFound(path),
            _ => ScanError::Io {
                path,
                source: error
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other(message)),
            },
        }
    }
}
