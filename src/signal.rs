//! Cancellation token and Ctrl+C handling.
//!
//! Scans are cancelled cooperatively: a [`CancellationToken`] wraps a shared
//! `AtomicBool` that the walker, the hashing workers and the finder check
//! between files. The CLI wires the token to Ctrl+C via [`install_handler`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupfinder::signal::install_handler;
//!
//! let token = install_handler().expect("Failed to install signal handler");
//!
//! // Pass clones of the token to the finder; check it anywhere.
//! if token.is_cancelled() {
//!     println!("Interrupted, returning partial results");
//! }
//! ```
//!
//! When a signal is received the token is set, a short notice is printed to
//! stderr, and the application exits with
//! [`ExitCode::Interrupted`](crate::error::ExitCode::Interrupted) after the
//! partial report has been rendered.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation. Observed by every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the token can drive another scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// The handler can only be registered once per process. Later calls return
/// the already registered token, reset to the not-cancelled state. If some
/// other code owns the Ctrl+C hook, an unhooked token is returned so callers
/// (tests in particular) still get working manual cancellation.
///
/// # Errors
///
/// Currently always succeeds; the `Result` is kept so callers handle a
/// future failure mode without an API change.
pub fn install_handler() -> Result<CancellationToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancellationToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing with partial results...");
        let _ = std::io::stderr().flush();
        log::info!("Cancellation signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(e) => {
            log::debug!("Ctrl+C handler unavailable ({}), using unhooked token", e);
            let fallback = GLOBAL_TOKEN.get_or_init(CancellationToken::new);
            fallback.reset();
            Ok(fallback.clone())
        }
    }
}
