//! The contract for functions applied along the spectral axis.

use ndarray::{Array1, ArrayView1};

use crate::error::OperationError;

/// A function applied to one spectral series at a time.
///
/// Implementations must return a series of the same length as the input and
/// must not keep state between calls: a run may call `apply` from several
/// threads in any spatial order.
pub trait SpectralFunction: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Transform one spectral series.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] if the series cannot be processed.
    fn apply(&self, spectrum: ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError>;
}

/// Named closure adapter for [`SpectralFunction`].
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> FnOperation<F>
where
    F: Fn(ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SpectralFunction for FnOperation<F>
where
    F: Fn(ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, spectrum: ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError> {
        (self.f)(spectrum)
    }
}

impl<F> std::fmt::Debug for FnOperation<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
