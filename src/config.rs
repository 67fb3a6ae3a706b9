//! Layered application configuration.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config <FILE>`, or `config.toml` in the platform
//!    config directory)
//! 3. environment variables prefixed `DUPFINDER_` (e.g. `DUPFINDER_IO_THREADS=8`)
//! 4. command-line flags, via [`Config::apply_scan_args`]
//!
//! ```toml
//! io_threads = 2
//! algorithm = "md5"
//! skip_hidden = true
//! respect_gitignore = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::duplicates::FinderConfig;
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPFINDER_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub io_threads: usize,
    /// Fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Extra gitignore-style patterns.
    pub ignore_patterns: Vec<String>,
    /// Apply the scan root's `.gitignore`.
    pub respect_gitignore: bool,
    /// Bypass the trash when deleting.
    pub permanent_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            algorithm: HashAlgorithm::default(),
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
            permanent_delete: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// An explicit `path` that does not exist is an error. A missing default
    /// file is not. A malformed file falls back to defaults with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicit `path` does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        match Self::figment(file.as_deref()).extract::<Self>() {
            Ok(config) => {
                log::debug!("Loaded configuration: {:?}", config);
                Ok(config)
            }
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Build the provider stack without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Platform config file location, e.g. `~/.config/dupfinder/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfinder").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay command-line flags. Flags only ever switch behaviour on or
    /// add patterns; absent flags keep the configured value.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        self.follow_symlinks |= args.follow_symlinks;
        self.skip_hidden |= args.skip_hidden;
        self.respect_gitignore |= args.respect_gitignore;
        self.permanent_delete |= args.permanent;
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
    }

    /// Walker options for a scan.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.ignore_patterns.clone(),
        )
        .with_respect_gitignore(self.respect_gitignore)
    }

    /// Finder options for a scan, without callback or cancellation.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_algorithm(self.algorithm)
            .with_walker_config(self.walker_config())
    }
}
