//! World coordinate mapping for spectral cubes.

use ndarray::Array1;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units::WavelengthUnit;

/// Linear mapping from spectral pixel index to wavelength.
///
/// Follows the FITS convention: `reference_pixel` is 1-based, so
/// `value(i) = reference_value + (i + 1 - reference_pixel) * increment`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralAxis {
    /// World value at the reference pixel (CRVAL).
    pub reference_value: f64,
    /// 1-based reference pixel (CRPIX).
    pub reference_pixel: f64,
    /// World increment per pixel (CDELT).
    pub increment: f64,
    /// Unit of `reference_value` and `increment`.
    pub unit: WavelengthUnit,
}

impl Default for SpectralAxis {
    fn default() -> Self {
        Self {
            reference_value: 0.0,
            reference_pixel: 1.0,
            increment: 1.0,
            unit: WavelengthUnit::Meter,
        }
    }
}

impl SpectralAxis {
    /// Axis starting at `start` on the first pixel.
    #[must_use]
    pub fn linear(start: f64, increment: f64, unit: WavelengthUnit) -> Self {
        Self {
            reference_value: start,
            reference_pixel: 1.0,
            increment,
            unit,
        }
    }

    /// World value at a 0-based pixel index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn world(&self, index: usize) -> f64 {
        self.reference_value + (index as f64 + 1.0 - self.reference_pixel) * self.increment
    }

    /// World values for the first `len` pixels.
    #[must_use]
    pub fn values(&self, len: usize) -> Array1<f64> {
        (0..len).map(|i| self.world(i)).collect()
    }

    /// Same mapping expressed in another unit.
    #[must_use]
    pub fn to_unit(&self, unit: WavelengthUnit) -> Self {
        Self {
            reference_value: self.unit.convert(self.reference_value, unit),
            reference_pixel: self.reference_pixel,
            increment: self.unit.convert(self.increment, unit),
            unit,
        }
    }
}

/// Coordinate mapping attached to a dataset.
///
/// Spatial axes are carried through untouched; only the spectral axis is
/// interpreted here.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldCoordinates {
    pub spectral: SpectralAxis,
}

impl WorldCoordinates {
    #[must_use]
    pub fn new(spectral: SpectralAxis) -> Self {
        Self { spectral }
    }

    /// Unit of the spectral axis.
    #[must_use]
    pub fn spectral_unit(&self) -> WavelengthUnit {
        self.spectral.unit
    }
}
