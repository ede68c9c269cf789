//! Error types for the controllers.

use std::time::Duration;

use thiserror::Error;

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The operand source has no components to choose from.
    #[error("dataset has no components")]
    NoComponents,

    /// A run is already active on this coordinator.
    #[error("an operation is already running")]
    RunInProgress,

    /// No run has been started.
    #[error("no operation has been started")]
    NotRunning,

    /// No terminal event arrived in time.
    #[error("operation did not finish within {0:?}")]
    Timeout(Duration),

    /// Unit title not present in the controller's catalog.
    #[error("unknown wavelength unit: {0}")]
    UnknownUnit(String),

    /// Data model error.
    #[error("core error: {0}")]
    Core(#[from] cubeviz_core::Error),

    /// Worker error.
    #[error("run error: {0}")]
    Run(#[from] cubeviz_ops::RunError),
}
