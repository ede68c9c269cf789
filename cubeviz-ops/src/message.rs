//! Event types for worker-to-controller communication.
//!
//! Events are sent from the operation worker thread to the foreground
//! controller via a channel to report progress and the outcome of a run.

use ndarray::Array3;

/// Events emitted by an [`OperationRunner`](crate::OperationRunner).
///
/// A run emits any number of `Progress` events followed by exactly one
/// terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Completed fraction (`current / total`) after a spatial element.
    Progress(f64),

    /// Run completed; carries the result with the shape of the input cube.
    Finished(Array3<f64>),

    /// Run stopped after an abort request. No result.
    Aborted,

    /// Run failed; carries a user-facing message. No result.
    Failed(String),
}

impl RunEvent {
    /// Whether this event ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Progress(_))
    }
}
