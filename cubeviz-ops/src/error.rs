//! Error types for cube operations.

use thiserror::Error;

/// Result type for running cube operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Raised by the progress tracker once an abort has been requested.
///
/// Propagating it with `?` out of the update hook is how a run unwinds
/// early; it is expected control flow, not a failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation aborted")]
pub struct OperationAborted;

/// Error returned by a spectral function for a single series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    /// Operation was configured with an unusable parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation could not process the series.
    #[error("{0}")]
    Failed(String),
}

/// Ways a run over a cube can end without a result.
#[derive(Error, Debug)]
pub enum RunError {
    /// Abort requested through the tracker.
    #[error(transparent)]
    Aborted(#[from] OperationAborted),

    /// The spectral function returned an error.
    #[error("{function} failed at (y={y}, x={x}): {source}")]
    Function {
        function: String,
        y: usize,
        x: usize,
        #[source]
        source: OperationError,
    },

    /// The spectral function changed the series length.
    #[error("{function} returned {found} values at (y={y}, x={x}), expected {expected}")]
    LengthMismatch {
        function: String,
        y: usize,
        x: usize,
        expected: usize,
        found: usize,
    },

    /// The view has no spatial elements to process.
    #[error("view of '{0}' has no spatial elements")]
    EmptyView(String),

    /// The spectral function panicked inside the worker.
    #[error("operation panicked: {0}")]
    Panicked(String),

    /// Worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<std::convert::Infallible> for RunError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

impl RunError {
    /// Whether this is the abort signal rather than a failure.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunError::Aborted(_))
    }
}
