//! Streaming file hasher.
//!
//! # Overview
//!
//! [`Hasher`] computes a fixed-length [`Fingerprint`] of a file's content by
//! reading it in [`CHUNK_SIZE`] blocks, so memory use does not depend on the
//! file size. BLAKE3 is the default; MD5 is available for digests that must
//! line up with older exports. Either is adequate for spotting byte-identical
//! files, adversarial collision resistance is not a goal here.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::with_algorithm(HashAlgorithm::Md5);
//! let fingerprint = hasher.hash(Path::new("photo.jpg")).unwrap();
//! println!("{}", fingerprint);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::HashError;
use crate::signal::CancellationToken;

/// Read buffer size used while streaming a file (8 KiB).
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Digest algorithm used for fingerprints.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3, 32-byte digest
    #[default]
    Blake3,
    /// MD5, 16-byte digest
    Md5,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Md5 => write!(f, "md5"),
        }
    }
}

/// Content fingerprint of a single file.
///
/// Fingerprints of different algorithms never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// BLAKE3 digest
    Blake3([u8; 32]),
    /// MD5 digest
    Md5([u8; 16]),
}

impl Fingerprint {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Blake3(bytes) => bytes,
            Self::Md5(bytes) => bytes,
        }
    }

    /// Algorithm that produced this fingerprint.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Blake3(_) => HashAlgorithm::Blake3,
            Self::Md5(_) => HashAlgorithm::Md5,
        }
    }

    /// Lowercase hexadecimal rendering of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        match self {
            Self::Blake3(bytes) => blake3::Hash::from(*bytes).to_hex().to_string(),
            Self::Md5(bytes) => format!("{:x}", md5::Digest(*bytes)),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Streaming content hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    cancellation: Option<CancellationToken>,
}

impl Hasher {
    /// Create a BLAKE3 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            cancellation: None,
        }
    }

    /// Abort in-flight reads between chunks once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Fingerprint the file at `path`.
    ///
    /// The file handle is dropped on every return path.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file vanished
    /// - `PermissionDenied` if it cannot be opened for reading
    /// - `Io` for any other open or read failure
    /// - `Interrupted` if cancellation was requested mid-read
    pub fn hash(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(file, path)
    }

    /// Fingerprint an arbitrary reader. `path` is only used for errors.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::hash`], minus the open failures.
    pub fn hash_reader<R: Read>(&self, reader: R, path: &Path) -> Result<Fingerprint, HashError> {
        match self.algorithm {
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                self.stream(reader, path, |chunk| {
                    hasher.update(chunk);
                })?;
                Ok(Fingerprint::Blake3(*hasher.finalize().as_bytes()))
            }
            HashAlgorithm::Md5 => {
                let mut context = md5::Context::new();
                self.stream(reader, path, |chunk| context.consume(chunk))?;
                Ok(Fingerprint::Md5(context.compute().0))
            }
        }
    }

    fn stream<R: Read>(
        &self,
        mut reader: R,
        path: &Path,
        mut sink: impl FnMut(&[u8]),
    ) -> Result<(), HashError> {
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            if self.is_cancelled() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match reader.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            sink(&buffer[..read]);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
