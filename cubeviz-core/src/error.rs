//! Error types for cubeviz-core.

use thiserror::Error;

/// Result type alias for cubeviz data-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for datasets, subsets and views.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A cube axis has zero length.
    #[error("invalid cube shape {0:?}: every axis must be non-empty")]
    InvalidShape([usize; 3]),

    /// Component array does not match the dataset shape.
    #[error("component shape {found:?} does not match dataset shape {expected:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        found: [usize; 3],
    },

    /// Mask does not cover the spatial extent of the data it masks.
    #[error("mask shape {found:?} does not match spatial shape {expected:?}")]
    MaskShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A component with this name already exists.
    #[error("component already exists: {0}")]
    DuplicateComponent(String),

    /// No component with this name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Unit name not present in the wavelength catalog.
    #[error("unknown wavelength unit: {0}")]
    UnknownUnit(String),
}
