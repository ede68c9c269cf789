//! cubeviz-ops: Cancellable operations along the spectral axis.
//!
//! This crate provides:
//! - **`ProgressTracker`** - progress counters with a cooperative abort flag
//! - **`apply_function`** - per-spaxel iteration with an update hook
//! - **`OperationRunner`** - runs an operation on a worker thread and
//!   reports through [`RunEvent`]s
//! - Boxcar and Gaussian spectral smoothing
//!

mod apply;
mod error;
mod function;
mod message;
mod progress;
mod runner;
pub mod smoothing;

pub use apply::{apply_function, par_apply_function};
pub use error::{OperationAborted, OperationError, Result, RunError};
pub use function::{FnOperation, SpectralFunction};
pub use message::RunEvent;
pub use progress::{ProgressState, ProgressTracker};
pub use runner::{OperationRunner, RunState, RunnerConfig};
pub use smoothing::{
    BoxcarSmooth, GaussianSmooth, SmoothingConfig, SmoothingKernel, MAX_KERNEL_WIDTH,
};
