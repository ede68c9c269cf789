//! Wavelength unit selection and redshift labeling.

use cubeviz_core::{WavelengthUnit, WorldCoordinates};
use ndarray::{Array1, ArrayView1};

use crate::error::{Error, Result};
use crate::host::{CubeLayout, RedshiftDispatch};

/// Wavelength label shown for a positive redshift.
pub const REST_WAVELENGTH_LABEL: &str = "Rest Wavelength";
/// Wavelength label shown without a redshift.
pub const OBSERVED_WAVELENGTH_LABEL: &str = "Obs Wavelength";

/// Convert wavelengths between units.
///
/// Returns `None` for absent or empty input; that is the "nothing to
/// convert" signal, not an error. Length and order are preserved.
#[must_use]
pub fn convert_wavelengths(
    values: Option<ArrayView1<'_, f64>>,
    from: WavelengthUnit,
    to: WavelengthUnit,
) -> Option<Array1<f64>> {
    let values = values.filter(|v| !v.is_empty())?;
    Some(values.mapv(|v| from.convert(v, to)))
}

/// Controller behind the wavelength unit selector and redshift field.
pub struct UnitController<L, D> {
    layout: L,
    dispatch: D,
    original_wavelengths: Option<Array1<f64>>,
    new_wavelengths: Option<Array1<f64>>,
    original_units: WavelengthUnit,
    new_units: WavelengthUnit,
    coords: Option<WorldCoordinates>,
    redshift: Option<f64>,
    units: Vec<WavelengthUnit>,
    unit_titles: Vec<String>,
    wavelength_label: String,
}

impl<L: CubeLayout, D: RedshiftDispatch> UnitController<L, D> {
    /// Create a controller over the layout's current wavelengths, in meters.
    pub fn new(layout: L, dispatch: D) -> Self {
        let units = WavelengthUnit::ALL.to_vec();
        let unit_titles = units.iter().map(|unit| unit.title()).collect();
        Self {
            original_wavelengths: layout.wavelengths(),
            layout,
            dispatch,
            new_wavelengths: None,
            original_units: WavelengthUnit::Meter,
            new_units: WavelengthUnit::Meter,
            coords: None,
            redshift: Some(0.0),
            units,
            unit_titles,
            wavelength_label: OBSERVED_WAVELENGTH_LABEL.to_string(),
        }
    }

    /// Catalog of selectable units.
    #[must_use]
    pub fn units(&self) -> &[WavelengthUnit] {
        &self.units
    }

    /// Titles shown in the unit selector, in catalog order.
    #[must_use]
    pub fn unit_titles(&self) -> &[String] {
        &self.unit_titles
    }

    #[must_use]
    pub fn wavelength_label(&self) -> &str {
        &self.wavelength_label
    }

    pub fn set_wavelength_label(&mut self, label: impl Into<String>) {
        self.wavelength_label = label.into();
    }

    #[must_use]
    pub fn redshift(&self) -> Option<f64> {
        self.redshift
    }

    /// Store a new redshift and relabel the wavelength axis.
    ///
    /// A positive `z` switches to the rest-frame label; zero, negative or
    /// `None` to the observed-frame label. The label is pushed to the host
    /// and the redshift broadcast on the dispatch port.
    pub fn set_redshift(&mut self, z: Option<f64>) {
        self.redshift = z;

        let label = match z {
            Some(z) if z > 0.0 => REST_WAVELENGTH_LABEL,
            _ => OBSERVED_WAVELENGTH_LABEL,
        };
        self.wavelength_label = label.to_string();
        self.layout.set_wavelength_label(label);
        log::debug!("redshift set to {z:?}, label '{label}'");

        self.dispatch.redshift_changed(z.unwrap_or(0.0));
    }

    /// Convert wavelengths between units. See [`convert_wavelengths`].
    #[must_use]
    pub fn convert_wavelengths(
        &self,
        values: Option<ArrayView1<'_, f64>>,
        from: WavelengthUnit,
        to: WavelengthUnit,
    ) -> Option<Array1<f64>> {
        convert_wavelengths(values, from, to)
    }

    /// Handle a selection in the unit selector.
    ///
    /// Converts the original wavelengths into the selected unit and pushes
    /// them to the layout. Nothing is pushed when there are no wavelengths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUnit`] if `title` is not in the catalog.
    pub fn on_unit_selected(&mut self, title: &str) -> Result<()> {
        let index = self
            .unit_titles
            .iter()
            .position(|t| t == title)
            .ok_or_else(|| Error::UnknownUnit(title.to_string()))?;
        self.new_units = self.units[index];

        self.new_wavelengths = convert_wavelengths(
            self.original_wavelengths.as_ref().map(Array1::view),
            self.original_units,
            self.new_units,
        );
        let Some(wavelengths) = self.new_wavelengths.as_ref() else {
            log::debug!("no wavelengths to convert to {}", self.new_units);
            return Ok(());
        };

        log::info!(
            "wavelengths converted {} -> {}",
            self.original_units,
            self.new_units
        );
        self.layout.set_wavelengths(wavelengths, self.new_units);
        Ok(())
    }

    /// Reset the original wavelengths and coordinates once data is loaded.
    ///
    /// The original unit follows the coordinates' spectral unit.
    pub fn enable(&mut self, coords: WorldCoordinates, wavelengths: Array1<f64>) {
        self.original_units = coords.spectral_unit();
        self.new_units = self.original_units;
        self.original_wavelengths = Some(wavelengths);
        self.new_wavelengths = None;
        self.coords = Some(coords);
    }

    #[must_use]
    pub fn coords(&self) -> Option<&WorldCoordinates> {
        self.coords.as_ref()
    }

    #[must_use]
    pub fn original_units(&self) -> WavelengthUnit {
        self.original_units
    }

    /// Unit most recently selected.
    #[must_use]
    pub fn new_units(&self) -> WavelengthUnit {
        self.new_units
    }

    /// Wavelengths produced by the last unit selection.
    #[must_use]
    pub fn new_wavelengths(&self) -> Option<&Array1<f64>> {
        self.new_wavelengths.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    #[must_use]
    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_convert_none_or_empty() {
        assert!(
            convert_wavelengths(None, WavelengthUnit::Meter, WavelengthUnit::Nanometer).is_none()
        );
        let empty = Array1::<f64>::zeros(0);
        assert!(convert_wavelengths(
            Some(empty.view()),
            WavelengthUnit::Meter,
            WavelengthUnit::Nanometer
        )
        .is_none());
    }

    #[test]
    fn test_convert_keeps_order_and_length() {
        let w = array![6.563e-7, 4.861e-7, 5.007e-7];
        let out = convert_wavelengths(
            Some(w.view()),
            WavelengthUnit::Meter,
            WavelengthUnit::Angstrom,
        )
        .unwrap();
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0], 6563.0, max_relative = 1e-12);
        assert_relative_eq!(out[1], 4861.0, max_relative = 1e-12);
        assert_relative_eq!(out[2], 5007.0, max_relative = 1e-12);
    }

    #[test]
    fn test_round_trip_between_all_units() {
        let w = array![1.2e-6, 2.5e-6, 4.8e-6];
        for from in WavelengthUnit::ALL {
            let start = convert_wavelengths(Some(w.view()), WavelengthUnit::Meter, from).unwrap();
            for to in WavelengthUnit::ALL {
                let there = convert_wavelengths(Some(start.view()), from, to).unwrap();
                let back = convert_wavelengths(Some(there.view()), to, from).unwrap();
                for (a, b) in back.iter().zip(start.iter()) {
                    assert_relative_eq!(*a, *b, max_relative = 1e-12);
                }
            }
        }
    }
}
