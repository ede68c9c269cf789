//! Apply a spectral function to every spatial element of a cube.
//!
//! The iteration calls an update hook once per spatial element. The hook
//! returns a `Result`; an `Err` stops the iteration on the spot and is
//! returned to the caller. Cancellation is built on this: the hook advances
//! a [`ProgressTracker`](crate::ProgressTracker), which starts failing with
//! [`OperationAborted`](crate::OperationAborted) once an abort is requested.

use cubeviz_core::CubeView;
use ndarray::{s, Array1, Array3};
use rayon::prelude::*;

use crate::error::{Result, RunError};
use crate::function::SpectralFunction;

/// Apply `function` along the spectral axis, one spatial element at a time.
///
/// Elements are visited in row-major `(y, x)` order. Elements outside the
/// view's mask are not passed to `function`; their output series is NaN.
/// Every element, masked or not, is followed by exactly one `update()` call.
///
/// # Errors
///
/// Returns the hook's error converted into [`RunError`], or a
/// [`RunError::Function`] / [`RunError::LengthMismatch`] raised by `function`.
pub fn apply_function<F, U, E>(view: &CubeView, function: &F, mut update: U) -> Result<Array3<f64>>
where
    F: SpectralFunction + ?Sized,
    U: FnMut() -> std::result::Result<(), E>,
    E: Into<RunError>,
{
    let [ns, ny, nx] = view.shape();
    let mut output = Array3::from_elem((ns, ny, nx), f64::NAN);

    for y in 0..ny {
        for x in 0..nx {
            if view.is_included(y, x) {
                let series = apply_at(view, function, y, x)?;
                output.slice_mut(s![.., y, x]).assign(&series);
            }
            update().map_err(Into::<RunError>::into)?;
        }
    }

    Ok(output)
}

/// Parallel variant of [`apply_function`] on the rayon thread pool.
///
/// Same masking and per-element hook contract; elements complete in no
/// particular order. The first error stops scheduling further elements.
///
/// # Errors
///
/// See [`apply_function`].
pub fn par_apply_function<F, U, E>(view: &CubeView, function: &F, update: U) -> Result<Array3<f64>>
where
    F: SpectralFunction + ?Sized,
    U: Fn() -> std::result::Result<(), E> + Sync,
    E: Into<RunError>,
{
    let [ns, ny, nx] = view.shape();

    let series = (0..ny * nx)
        .into_par_iter()
        .map(|index| -> Result<Option<Array1<f64>>> {
            let (y, x) = (index / nx, index % nx);
            let series = if view.is_included(y, x) {
                Some(apply_at(view, function, y, x)?)
            } else {
                None
            };
            update().map_err(Into::<RunError>::into)?;
            Ok(series)
        })
        .collect::<Result<Vec<Option<Array1<f64>>>>>()?;

    let mut output = Array3::from_elem((ns, ny, nx), f64::NAN);
    for (index, series) in series.into_iter().enumerate() {
        if let Some(series) = series {
            output
                .slice_mut(s![.., index / nx, index % nx])
                .assign(&series);
        }
    }

    Ok(output)
}

fn apply_at<F>(view: &CubeView, function: &F, y: usize, x: usize) -> Result<Array1<f64>>
where
    F: SpectralFunction + ?Sized,
{
    let series = function
        .apply(view.spectrum(y, x))
        .map_err(|source| RunError::Function {
            function: function.name().to_string(),
            y,
            x,
            source,
        })?;

    let expected = view.spectral_len();
    if series.len() != expected {
        return Err(RunError::LengthMismatch {
            function: function.name().to_string(),
            y,
            x,
            expected,
            found: series.len(),
        });
    }

    Ok(series)
}
