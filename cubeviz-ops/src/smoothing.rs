//! Spectral smoothing kernels.
//!
//! Both kernels are normalised discrete convolutions. NaN samples and
//! samples past either end of the series are skipped and the remaining
//! weights renormalised, so the output never shrinks and masked channels
//! do not poison their neighbours.
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;

use ndarray::{Array1, ArrayView1};

use crate::error::OperationError;
use crate::function::SpectralFunction;

/// Widest kernel, in channels, either smoothing operation accepts.
pub const MAX_KERNEL_WIDTH: usize = 10_001;

/// Kernel selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingKernel {
    /// Flat kernel spanning `width` channels.
    Boxcar { width: usize },
    /// Gaussian with standard deviation `stddev` in channels.
    Gaussian { stddev: f64 },
}

/// Configuration for building a smoothing operation.
#[derive(Clone, Debug)]
pub struct SmoothingConfig {
    pub kernel: SmoothingKernel,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kernel: SmoothingKernel::Boxcar { width: 3 },
        }
    }
}

impl SmoothingConfig {
    /// Use a boxcar kernel.
    #[must_use]
    pub fn with_boxcar(mut self, width: usize) -> Self {
        self.kernel = SmoothingKernel::Boxcar { width };
        self
    }

    /// Use a Gaussian kernel.
    #[must_use]
    pub fn with_gaussian(mut self, stddev: f64) -> Self {
        self.kernel = SmoothingKernel::Gaussian { stddev };
        self
    }

    /// Build the configured operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidParameter`] for a zero width or a
    /// non-positive standard deviation.
    pub fn build(&self) -> Result<Arc<dyn SpectralFunction>, OperationError> {
        Ok(match self.kernel {
            SmoothingKernel::Boxcar { width } => Arc::new(BoxcarSmooth::new(width)?),
            SmoothingKernel::Gaussian { stddev } => Arc::new(GaussianSmooth::new(stddev)?),
        })
    }
}

/// Moving average over `width` channels.
#[derive(Debug, Clone)]
pub struct BoxcarSmooth {
    width: usize,
    weights: Vec<f64>,
}

impl BoxcarSmooth {
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidParameter`] if `width` is zero or
    /// wider than [`MAX_KERNEL_WIDTH`].
    pub fn new(width: usize) -> Result<Self, OperationError> {
        if width == 0 {
            return Err(OperationError::InvalidParameter(
                "boxcar width must be at least 1".to_string(),
            ));
        }
        if width > MAX_KERNEL_WIDTH {
            return Err(OperationError::InvalidParameter(format!(
                "boxcar width {width} exceeds {MAX_KERNEL_WIDTH} channels"
            )));
        }
        Ok(Self {
            width,
            weights: vec![1.0 / width as f64; width],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl SpectralFunction for BoxcarSmooth {
    fn name(&self) -> &str {
        "boxcar"
    }

    fn apply(&self, spectrum: ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError> {
        Ok(convolve(spectrum, &self.weights))
    }
}

/// Gaussian-weighted average, truncated at four standard deviations.
#[derive(Debug, Clone)]
pub struct GaussianSmooth {
    stddev: f64,
    weights: Vec<f64>,
}

impl GaussianSmooth {
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidParameter`] unless `stddev` is
    /// finite and positive, and the truncated kernel fits in
    /// [`MAX_KERNEL_WIDTH`] channels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(stddev: f64) -> Result<Self, OperationError> {
        if !stddev.is_finite() || stddev <= 0.0 {
            return Err(OperationError::InvalidParameter(format!(
                "gaussian stddev must be positive, got {stddev}"
            )));
        }
        let half = (4.0 * stddev).ceil();
        if 2.0 * half + 1.0 > MAX_KERNEL_WIDTH as f64 {
            return Err(OperationError::InvalidParameter(format!(
                "gaussian stddev {stddev} needs a kernel wider than {MAX_KERNEL_WIDTH} channels"
            )));
        }
        let half = half as usize;
        let weights: Vec<f64> = (0..=2 * half)
            .map(|k| {
                let offset = k as f64 - half as f64;
                (-0.5 * (offset / stddev).powi(2)).exp()
            })
            .collect();
        let norm: f64 = weights.iter().sum();
        Ok(Self {
            stddev,
            weights: weights.into_iter().map(|w| w / norm).collect(),
        })
    }

    #[must_use]
    pub fn stddev(&self) -> f64 {
        self.stddev
    }
}

impl SpectralFunction for GaussianSmooth {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn apply(&self, spectrum: ArrayView1<'_, f64>) -> Result<Array1<f64>, OperationError> {
        Ok(convolve(spectrum, &self.weights))
    }
}

/// Centered convolution skipping NaN and out-of-range samples.
fn convolve(spectrum: ArrayView1<'_, f64>, weights: &[f64]) -> Array1<f64> {
    let n = spectrum.len();
    let center = (weights.len() - 1) / 2;
    Array1::from_shape_fn(n, |i| {
        let mut acc = 0.0;
        let mut used = 0.0;
        for (k, &w) in weights.iter().enumerate() {
            let Some(j) = (i + k).checked_sub(center) else {
                continue;
            };
            if j >= n {
                break;
            }
            let value = spectrum[j];
            if value.is_nan() {
                continue;
            }
            acc += w * value;
            used += w;
        }
        if used > 0.0 {
            acc / used
        } else {
            f64::NAN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_boxcar_preserves_constant() {
        let smooth = BoxcarSmooth::new(5).unwrap();
        let out = smooth.apply(Array1::from_elem(12, 2.5).view()).unwrap();
        assert_eq!(out.len(), 12);
        for v in &out {
            assert_relative_eq!(*v, 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_boxcar_averages_neighbours() {
        let smooth = BoxcarSmooth::new(3).unwrap();
        let out = smooth.apply(array![0.0, 3.0, 0.0, 0.0].view()).unwrap();
        assert_relative_eq!(out[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[2], 1.0, epsilon = 1e-12);
        // Edge renormalises over the two available samples.
        assert_relative_eq!(out[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_samples_are_skipped() {
        let smooth = BoxcarSmooth::new(3).unwrap();
        let out = smooth
            .apply(array![1.0, f64::NAN, 3.0].view())
            .unwrap();
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);

        let all_nan = smooth.apply(Array1::from_elem(3, f64::NAN).view()).unwrap();
        assert!(all_nan.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_gaussian_conserves_flux_of_line() {
        let smooth = GaussianSmooth::new(1.5).unwrap();
        let mut line = Array1::zeros(41);
        line[20] = 10.0;
        let out = smooth.apply(line.view()).unwrap();
        assert_relative_eq!(out.sum(), 10.0, epsilon = 1e-9);
        assert!(out[20] > out[18] && out[18] > out[15]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(BoxcarSmooth::new(0).is_err());
        assert!(GaussianSmooth::new(0.0).is_err());
        assert!(GaussianSmooth::new(f64::NAN).is_err());
        assert!(SmoothingConfig::default().with_boxcar(0).build().is_err());
    }

    #[test]
    fn test_oversized_kernels_are_rejected() {
        for stddev in [1e20, 1e9, f64::MAX] {
            assert!(matches!(
                GaussianSmooth::new(stddev),
                Err(OperationError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            BoxcarSmooth::new(usize::MAX),
            Err(OperationError::InvalidParameter(_))
        ));
        assert!(BoxcarSmooth::new(MAX_KERNEL_WIDTH + 1).is_err());
        assert_eq!(BoxcarSmooth::new(MAX_KERNEL_WIDTH).unwrap().width(), MAX_KERNEL_WIDTH);
        // Largest stddev whose 8-sigma kernel still fits.
        assert!(GaussianSmooth::new(1250.0).is_ok());
        assert!(GaussianSmooth::new(1250.5).is_err());
    }

    #[test]
    fn test_config_builds_named_operation() {
        let op = SmoothingConfig::default().with_gaussian(2.0).build().unwrap();
        assert_eq!(op.name(), "gaussian");
        let op = SmoothingConfig::default().build().unwrap();
        assert_eq!(op.name(), "boxcar");
    }
}
