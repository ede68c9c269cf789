//! Controller for running an operation over a dataset component.
//!
//! Contains the `OperationCoordinator`, which plays the role of the
//! operation dialog: it holds the operand dataset, starts the worker,
//! relays progress to the dialog state, handles abort, and adds the result
//! to the dataset as a new component.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cubeviz_core::{ComponentId, CubeSource, CubeView};
use cubeviz_ops::{OperationRunner, RunEvent, RunState, RunnerConfig, SpectralFunction};
use ndarray::Array3;

use crate::error::{Error, Result};
use crate::state::DialogState;

/// Label appended to the operand's name for result components.
pub const DEFAULT_RESULT_LABEL: &str = "Spectrally Smoothed";

const WORKER_GONE: &str = "worker exited without a result";

/// Configuration for the coordinator.
#[derive(Clone, Debug)]
pub struct OperationConfig {
    /// Label used in result component names: `"<component> [<label>]"`.
    pub result_label: String,
    /// Worker configuration.
    pub runner: RunnerConfig,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            result_label: DEFAULT_RESULT_LABEL.to_string(),
            runner: RunnerConfig::default(),
        }
    }
}

impl OperationConfig {
    #[must_use]
    pub fn with_result_label(mut self, label: impl Into<String>) -> Self {
        self.result_label = label.into();
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.runner.parallel = parallel;
        self
    }
}

/// Dialog controller for applying a spectral function to a component.
pub struct OperationCoordinator {
    source: CubeSource,
    function: Arc<dyn SpectralFunction>,
    config: OperationConfig,
    component: ComponentId,
    runner: Option<OperationRunner>,
    rx: Option<Receiver<RunEvent>>,
    state: RunState,
    dialog: DialogState,
    last_result: Option<ComponentId>,
}

impl OperationCoordinator {
    /// Create a coordinator with the first component selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoComponents`] if the source has no components.
    pub fn new(
        source: impl Into<CubeSource>,
        function: Arc<dyn SpectralFunction>,
        config: OperationConfig,
    ) -> Result<Self> {
        let source = source.into();
        let component = source
            .component_ids()
            .into_iter()
            .next()
            .ok_or(Error::NoComponents)?;

        Ok(Self {
            source,
            function,
            config,
            component,
            runner: None,
            rx: None,
            state: RunState::Idle,
            dialog: DialogState::default(),
            last_result: None,
        })
    }

    /// Components available as operands, in display order.
    #[must_use]
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.source.component_ids()
    }

    #[must_use]
    pub fn selected_component(&self) -> &ComponentId {
        &self.component
    }

    /// Choose the operand for the next run.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid component index.
    pub fn select_component(&mut self, index: usize) {
        let ids = self.source.component_ids();
        assert!(
            index < ids.len(),
            "component index {index} out of range for {} components",
            ids.len()
        );
        self.component = ids[index].clone();
    }

    /// Start the operation on the selected component in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RunInProgress`] while a run is active (no state is
    /// touched), or an error if the view cannot be composed or the worker
    /// cannot be spawned.
    pub fn start_run(&mut self) -> Result<()> {
        if self.state == RunState::Running {
            log::warn!("start requested while an operation is running");
            return Err(Error::RunInProgress);
        }

        let view = CubeView::compose(&self.source, &self.component)?;
        let (tx, rx) = channel();
        let runner =
            OperationRunner::start(view, Arc::clone(&self.function), &self.config.runner, tx)?;

        log::info!(
            "started {} on '{}'{}",
            self.function.name(),
            self.component,
            if self.source.is_subset() { " (subset)" } else { "" }
        );

        self.runner = Some(runner);
        self.rx = Some(rx);
        self.state = RunState::Running;
        self.dialog.show_running();
        Ok(())
    }

    /// Handle pending events from the worker without blocking.
    ///
    /// # Errors
    ///
    /// Propagates errors from adding the result to the dataset.
    pub fn handle_messages(&mut self) -> Result<RunState> {
        loop {
            let Some(rx) = self.rx.as_ref() else {
                return Ok(self.state);
            };
            match rx.try_recv() {
                Ok(event) => self.dispatch(event)?,
                Err(TryRecvError::Empty) => return Ok(self.state),
                Err(TryRecvError::Disconnected) => {
                    self.on_failed(WORKER_GONE.to_string());
                }
            }
        }
    }

    /// Block until the current run ends, handling events as they arrive.
    ///
    /// Intended for command-line use and tests; an interactive host should
    /// call [`handle_messages`](Self::handle_messages) from its event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] without an active run and
    /// [`Error::Timeout`] if the run does not end within `timeout`.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Result<RunState> {
        if self.rx.is_none() {
            return Err(Error::NotRunning);
        }
        let deadline = Instant::now() + timeout;
        while self.state == RunState::Running {
            let Some(rx) = self.rx.as_ref() else {
                break;
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => self.dispatch(event)?,
                Err(RecvTimeoutError::Timeout) => return Err(Error::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    self.on_failed(WORKER_GONE.to_string());
                }
            }
        }
        Ok(self.state)
    }

    fn dispatch(&mut self, event: RunEvent) -> Result<()> {
        match event {
            RunEvent::Progress(value) => self.on_progress(value),
            RunEvent::Finished(data) => {
                self.on_finished(data)?;
            }
            RunEvent::Aborted => self.on_run_aborted(),
            RunEvent::Failed(message) => self.on_failed(message),
        }
        Ok(())
    }

    /// Show a progress fraction on the indicator (0-100 range).
    pub fn on_progress(&mut self, value: f64) {
        // Events queued before an abort must not move the reset indicator.
        if self
            .runner
            .as_ref()
            .is_some_and(|runner| runner.tracker().is_aborted())
        {
            return;
        }
        self.dialog.progress = value * 100.0;
        self.dialog.status_text = format!("Running... {:.0}%", value * 100.0);
    }

    /// Add the finished result to the dataset and close the dialog.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset rejects the result; the run is then
    /// marked failed and the dialog stays open.
    pub fn on_finished(&mut self, data: Array3<f64>) -> Result<ComponentId> {
        self.finish_worker();
        let name = self.result_name();
        match self.source.add_component(data, name) {
            Ok(id) => {
                log::info!("added component '{id}'");
                self.state = RunState::Finished;
                self.dialog.reset_progress(format!("Added {id}"));
                self.dialog.is_open = false;
                self.last_result = Some(id.clone());
                Ok(id)
            }
            Err(e) => {
                self.on_failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// User abort: ask the worker to stop and reset the indicator.
    ///
    /// The dialog stays open so the user can retry or close it.
    pub fn on_aborted(&mut self) {
        self.dialog.reset_progress("Aborted");
        if let Some(runner) = self.runner.as_ref() {
            runner.abort();
            log::info!("abort requested for '{}'", self.component);
            // Re-enabled once the worker confirms it stopped.
            self.dialog.start_enabled = false;
            self.dialog.status_text = "Aborting...".to_string();
        }
    }

    /// The worker confirmed it stopped after an abort.
    fn on_run_aborted(&mut self) {
        self.finish_worker();
        self.state = RunState::Aborted;
        self.dialog.reset_progress("Aborted");
    }

    /// The run failed: reset the indicator and keep the message for display.
    pub fn on_failed(&mut self, message: String) {
        log::error!("operation on '{}' failed: {message}", self.component);
        self.finish_worker();
        self.state = RunState::Failed;
        self.dialog.reset_progress("Failed");
        self.dialog.last_error = Some(message);
    }

    /// Close the dialog, aborting any active run.
    pub fn close(&mut self) {
        if self.state == RunState::Running {
            self.on_aborted();
        }
        self.dialog.is_open = false;
    }

    /// Name the next result component would get.
    ///
    /// `"<component> [<label>]"`, suffixed with the number of existing
    /// components containing that base name once there is at least one.
    #[must_use]
    pub fn result_name(&self) -> String {
        let base = format!("{} [{}]", self.component, self.config.result_label);
        let ids = self.source.component_ids();
        let mut count = ids.iter().filter(|id| id.as_str().contains(&base)).count();
        if count == 0 {
            return base;
        }
        let data = self.source.data();
        loop {
            let name = format!("{base} {count}");
            if !data.contains(&name) {
                return name;
            }
            count += 1;
        }
    }

    fn finish_worker(&mut self) {
        if let Some(mut runner) = self.runner.take() {
            runner.join();
        }
        self.rx = None;
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[must_use]
    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    /// Component added by the last successful run.
    #[must_use]
    pub fn last_result(&self) -> Option<&ComponentId> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn source(&self) -> &CubeSource {
        &self.source
    }

    /// Give back the dataset, aborting any active run.
    #[must_use]
    pub fn into_source(mut self) -> CubeSource {
        if let Some(runner) = self.runner.as_ref() {
            runner.abort();
        }
        self.finish_worker();
        self.source
    }
}

impl std::fmt::Debug for OperationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCoordinator")
            .field("function", &self.function.name())
            .field("component", &self.component)
            .field("state", &self.state)
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}
