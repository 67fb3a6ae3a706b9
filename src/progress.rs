//! Progress reporting for scans.
//!
//! The finder reports progress through the [`ProgressCallback`] trait. One
//! [`ProgressEvent`] is emitted per processed file, carrying the processed
//! count, the total discovered in the enumeration pass, and the percentage.
//!
//! [`Progress`] renders those events as an indicatif bar for the terminal;
//! [`ProgressFn`] adapts a plain closure for library callers.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::actions::{BatchProgressCallback, ItemResult};

/// Scan phase announced through [`ProgressCallback::on_phase_start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Listing every file under the root.
    Enumerating,
    /// Capturing metadata and fingerprinting candidates.
    Processing,
}

/// A single progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Files processed so far
    pub processed: usize,
    /// Total files discovered by the enumeration pass
    pub total: usize,
    /// `floor(processed / total * 100)`, or 100 when total is 0
    pub percent: u8,
}

impl ProgressEvent {
    /// Build an event, computing the percentage.
    #[must_use]
    pub fn new(processed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (processed.min(total) * 100 / total) as u8
        };
        Self {
            processed,
            total,
            percent,
        }
    }
}

/// Progress callback for the duplicate scan.
///
/// Implementations must be thread-safe: hashing workers report completion
/// from the pool threads. Events are delivered one at a time, in
/// increasing `processed` order.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 while enumerating.
    fn on_phase_start(&self, _phase: ScanPhase, _total: usize) {}

    /// Called after each file is processed.
    fn on_progress(&self, event: ProgressEvent);

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: ScanPhase) {}
}

/// Adapter turning a closure into a [`ProgressCallback`].
///
/// ```
/// use dupfinder::progress::{ProgressCallback, ProgressEvent, ProgressFn};
///
/// let callback = ProgressFn(|event: ProgressEvent| {
///     println!("{}/{} ({}%)", event.processed, event.total, event.percent);
/// });
/// callback.on_progress(ProgressEvent::new(1, 2));
/// ```
pub struct ProgressFn<F>(pub F);

impl<F> ProgressCallback for ProgressFn<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        (self.0)(event);
    }
}

/// Serialises progress ticks from concurrent workers.
///
/// Holding the lock while invoking the callback keeps emitted counts
/// strictly increasing.
pub(crate) struct ProgressCounter {
    callback: Option<Arc<dyn ProgressCallback>>,
    processed: Mutex<usize>,
    total: usize,
}

impl ProgressCounter {
    pub(crate) fn new(callback: Option<Arc<dyn ProgressCallback>>, total: usize) -> Self {
        Self {
            callback,
            processed: Mutex::new(0),
            total,
        }
    }

    /// Mark one more file as processed and emit the event.
    pub(crate) fn tick(&self) {
        let mut processed = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
        *processed += 1;
        if let Some(ref callback) = self.callback {
            callback.on_progress(ProgressEvent::new(*processed, self.total));
        }
    }

    /// Emit the single 100% event of an empty scan.
    pub(crate) fn finish_empty(&self) {
        if let Some(ref callback) = self.callback {
            callback.on_progress(ProgressEvent::new(0, 0));
        }
    }

    pub(crate) fn processed(&self) -> usize {
        *self.processed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfinder::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: ScanPhase, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            ScanPhase::Enumerating => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.set_message("Listing files");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            ScanPhase::Processing => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::bar_style());
                pb.set_message("Comparing");
                pb
            }
        };
        *self.slot() = Some(pb);
    }

    fn on_progress(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.slot() {
            pb.set_position(event.processed as u64);
        }
    }

    fn on_phase_end(&self, phase: ScanPhase) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.slot().take() {
            match phase {
                ScanPhase::Enumerating => pb.finish_and_clear(),
                ScanPhase::Processing => pb.finish_with_message("Done"),
            }
        }
    }
}

impl BatchProgressCallback for Progress {
    fn on_before_item(&self, path: &std::path::Path, index: usize, total: usize) {
        if self.quiet {
            return;
        }
        let mut slot = self.slot();
        if index == 0 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            *slot = Some(pb);
        }
        if let Some(ref pb) = *slot {
            pb.set_message(path.display().to_string());
        }
    }

    fn on_item_done(&self, _result: &ItemResult) {
        if self.quiet {
            return;
        }
        let mut slot = self.slot();
        let finished = match *slot {
            Some(ref pb) => {
                pb.inc(1);
                pb.length().is_some_and(|len| pb.position() >= len)
            }
            None => false,
        };
        if finished {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}
