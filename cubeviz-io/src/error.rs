//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or wrong field types.
    #[error("invalid cube file: {0}")]
    Json(#[from] serde_json::Error),

    /// The declared shape has no representable element count.
    #[error("cube shape {0:?} is too large")]
    InvalidShape([usize; 3]),

    /// A component's value count does not match the cube shape.
    #[error("component '{component}' has {found} values, shape needs {expected}")]
    LengthMismatch {
        component: String,
        expected: usize,
        found: usize,
    },

    /// The mask value count does not match the spatial shape.
    #[error("mask has {found} values, spatial shape needs {expected}")]
    MaskLengthMismatch { expected: usize, found: usize },

    /// Values could not be arranged into the declared shape.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] cubeviz_core::Error),
}
