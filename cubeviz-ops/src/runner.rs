//! Worker thread running an operation over a cube.
//!
//! The runner owns the progress tracker and the cube view for the lifetime
//! of one run. Progress and the outcome are reported through a channel so
//! the controlling thread never blocks on the worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use cubeviz_core::CubeView;

use crate::apply::{apply_function, par_apply_function};
use crate::error::{OperationAborted, Result, RunError};
use crate::function::SpectralFunction;
use crate::message::RunEvent;
use crate::progress::ProgressTracker;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished,
    Aborted,
    Failed,
}

impl RunState {
    /// Whether the run has ended.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Finished | RunState::Aborted | RunState::Failed)
    }
}

/// Configuration for the worker.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Fan the spatial elements out on the rayon pool.
    pub parallel: bool,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            thread_name: "cubeviz-operation".to_string(),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Handle to one background run.
///
/// Dropping the handle detaches the worker; it still finishes its current
/// run and sends the terminal event if the receiver is alive.
#[derive(Debug)]
pub struct OperationRunner {
    tracker: Arc<ProgressTracker>,
    handle: Option<JoinHandle<()>>,
}

impl OperationRunner {
    /// Start applying `function` to `view` on a new worker thread.
    ///
    /// The tracker is initialized with `y * x` units before the thread is
    /// spawned, so an [`abort`](Self::abort) issued right after `start`
    /// takes effect at the first progress checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::EmptyView`] if the view has no spatial elements
    /// and [`RunError::Spawn`] if the worker thread cannot be created.
    pub fn start(
        view: CubeView,
        function: Arc<dyn SpectralFunction>,
        config: &RunnerConfig,
        tx: Sender<RunEvent>,
    ) -> Result<Self> {
        if view.spatial_len() == 0 {
            return Err(RunError::EmptyView(view.component().to_string()));
        }
        let tracker = Arc::new(ProgressTracker::new(view.spatial_len()));
        let worker_tracker = Arc::clone(&tracker);
        let parallel = config.parallel;

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                run_worker(&view, function.as_ref(), &worker_tracker, parallel, &tx);
            })?;

        Ok(Self {
            tracker,
            handle: Some(handle),
        })
    }

    /// Request the worker to stop. Does not wait for it.
    pub fn abort(&self) {
        self.tracker.request_abort();
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("operation worker thread panicked outside the operation");
            }
        }
    }
}

fn run_worker(
    view: &CubeView,
    function: &dyn SpectralFunction,
    tracker: &ProgressTracker,
    parallel: bool,
    tx: &Sender<RunEvent>,
) {
    let start = Instant::now();
    log::info!(
        "{} on '{}' started: {} spectra{}",
        function.name(),
        view.component(),
        tracker.total(),
        if parallel { " (parallel)" } else { "" }
    );

    let checkpoint = || -> std::result::Result<(), OperationAborted> {
        tracker.advance(None)?;
        let _ = tx.send(RunEvent::Progress(tracker.percent()));
        Ok(())
    };

    // Panics inside the user function must not take the run down silently.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if parallel {
            par_apply_function(view, function, checkpoint)
        } else {
            apply_function(view, function, checkpoint)
        }
    }));

    let event = match outcome {
        Ok(Ok(data)) => {
            log::info!(
                "{} finished in {:.2}s",
                function.name(),
                start.elapsed().as_secs_f64()
            );
            RunEvent::Finished(data)
        }
        Ok(Err(RunError::Aborted(_))) => {
            let state = tracker.snapshot();
            log::info!(
                "{} aborted after {}/{} spectra",
                function.name(),
                state.current,
                state.total
            );
            RunEvent::Aborted
        }
        Ok(Err(e)) => {
            log::error!("{} failed: {e}", function.name());
            RunEvent::Failed(e.to_string())
        }
        Err(payload) => {
            let e = RunError::Panicked(panic_message(payload.as_ref()));
            log::error!("{} failed: {e}", function.name());
            RunEvent::Failed(e.to_string())
        }
    };

    let _ = tx.send(event);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
