//! Progress bookkeeping shared between a worker and its controller.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::OperationAborted;

/// Snapshot of a tracker's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub current: usize,
    pub total: usize,
    pub aborted: bool,
}

/// Progress counters plus an abort flag.
///
/// The worker calls [`ProgressTracker::advance`] once per unit of work; the
/// controlling thread may call [`ProgressTracker::request_abort`] at any
/// time. All state is atomic so the tracker can be shared through an `Arc`.
#[derive(Debug)]
pub struct ProgressTracker {
    current: AtomicUsize,
    total: AtomicUsize,
    aborted: AtomicBool,
}

impl ProgressTracker {
    /// Create a tracker initialized for `total` units of work.
    ///
    /// # Panics
    ///
    /// Panics if `total` is zero.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let tracker = Self {
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(1),
            aborted: AtomicBool::new(false),
        };
        tracker.initialize(total);
        tracker
    }

    /// Reset for a new run of `total` units.
    ///
    /// # Panics
    ///
    /// Panics if `total` is zero.
    pub fn initialize(&self, total: usize) {
        assert!(total > 0, "progress total must be positive");
        self.total.store(total, Ordering::SeqCst);
        self.current.store(0, Ordering::SeqCst);
        self.aborted.store(false, Ordering::SeqCst);
    }

    /// Record progress: set `current` to `value`, or add one when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationAborted`] once an abort has been requested. The
    /// counter is still updated first.
    pub fn advance(&self, value: Option<usize>) -> Result<(), OperationAborted> {
        match value {
            Some(value) => self.current.store(value, Ordering::SeqCst),
            None => {
                self.current.fetch_add(1, Ordering::SeqCst);
            }
        }
        if self.aborted.load(Ordering::SeqCst) {
            return Err(OperationAborted);
        }
        Ok(())
    }

    /// Completion fraction `current / total`. Not clamped.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        self.current() as f64 / self.total() as f64
    }

    /// Ask the worker to stop at its next progress checkpoint.
    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        ProgressState {
            current: self.current(),
            total: self.total(),
            aborted: self.is_aborted(),
        }
    }
}
