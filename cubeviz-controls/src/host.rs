//! Ports the host viewer implements for the controllers.

use std::sync::mpsc::Sender;

use cubeviz_core::WavelengthUnit;
use ndarray::Array1;

/// The host layout showing the cube and its spectral slice controls.
pub trait CubeLayout {
    /// Wavelengths currently loaded in the layout, if any.
    fn wavelengths(&self) -> Option<Array1<f64>>;

    /// Replace the displayed wavelengths and their unit.
    fn set_wavelengths(&mut self, wavelengths: &Array1<f64>, unit: WavelengthUnit);

    /// Set the label on the slice controller's wavelength field.
    fn set_wavelength_label(&mut self, label: &str);
}

/// Notification port for redshift changes, wired by the host to whatever
/// event bus other viewers listen on.
pub trait RedshiftDispatch {
    fn redshift_changed(&mut self, z: f64);
}

impl RedshiftDispatch for Sender<f64> {
    fn redshift_changed(&mut self, z: f64) {
        if self.send(z).is_err() {
            log::debug!("redshift listener disconnected");
        }
    }
}
