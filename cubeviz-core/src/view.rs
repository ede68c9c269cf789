//! Read-only masked view of a single dataset component.

use std::sync::Arc;

use ndarray::{s, Array1, Array2, Array3, ArrayView1, ArrayView3};

use crate::coords::WorldCoordinates;
use crate::dataset::{ComponentId, CubeSource};
use crate::error::{Error, Result};

/// A component array paired with a spatial mask and its coordinate mapping.
///
/// Views are cheap to clone and `Send`, so they can be moved into a worker
/// thread while the owning dataset stays on the foreground thread.
#[derive(Debug, Clone)]
pub struct CubeView {
    component: ComponentId,
    data: Arc<Array3<f64>>,
    mask: Array2<bool>,
    coords: WorldCoordinates,
}

impl CubeView {
    /// # Errors
    ///
    /// Returns [`Error::MaskShapeMismatch`] if the mask is not the spatial
    /// shape of `data`.
    pub fn new(
        component: ComponentId,
        data: Arc<Array3<f64>>,
        mask: Array2<bool>,
        coords: WorldCoordinates,
    ) -> Result<Self> {
        let (_, ny, nx) = data.dim();
        if mask.dim() != (ny, nx) {
            return Err(Error::MaskShapeMismatch {
                expected: (ny, nx),
                found: mask.dim(),
            });
        }
        Ok(Self {
            component,
            data,
            mask,
            coords,
        })
    }

    /// Compose a view of `component` from a dataset or subset.
    ///
    /// Subsets contribute their membership mask; full datasets get an
    /// all-true mask. Coordinates always come from the parent dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if the component does not exist.
    pub fn compose(source: &CubeSource, component: &ComponentId) -> Result<Self> {
        let data = source
            .data()
            .component(component.as_str())
            .ok_or_else(|| Error::UnknownComponent(component.to_string()))?;
        Self::new(
            component.clone(),
            Arc::clone(data),
            source.mask(),
            source.coords().clone(),
        )
    }

    #[must_use]
    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Shape as `[spectral, y, x]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        let (s, y, x) = self.data.dim();
        [s, y, x]
    }

    #[must_use]
    pub fn spectral_len(&self) -> usize {
        self.data.dim().0
    }

    #[must_use]
    pub fn spatial_shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Number of spatial elements (`y * x`).
    #[must_use]
    pub fn spatial_len(&self) -> usize {
        self.mask.len()
    }

    #[must_use]
    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    #[must_use]
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    #[must_use]
    pub fn coords(&self) -> &WorldCoordinates {
        &self.coords
    }

    /// Whether the spatial element at `(y, x)` is inside the mask.
    #[must_use]
    pub fn is_included(&self, y: usize, x: usize) -> bool {
        self.mask[[y, x]]
    }

    /// Spectral series at a spatial position.
    #[must_use]
    pub fn spectrum(&self, y: usize, x: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![.., y, x])
    }

    /// World values along the spectral axis.
    #[must_use]
    pub fn spectral_axis(&self) -> Array1<f64> {
        self.coords.spectral.values(self.spectral_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CubeDataset, Subset};

    fn source() -> CubeSource {
        let data = Array3::from_shape_fn((3, 2, 2), |(s, y, x)| (s * 100 + y * 10 + x) as f64);
        CubeDataset::new("cube", [3, 2, 2], WorldCoordinates::default())
            .unwrap()
            .with_component("flux", data)
            .unwrap()
            .into()
    }

    #[test]
    fn test_compose_full_dataset() {
        let view = CubeView::compose(&source(), &"flux".into()).unwrap();
        assert_eq!(view.shape(), [3, 2, 2]);
        assert_eq!(view.spatial_len(), 4);
        assert!(view.mask().iter().all(|&m| m));
        assert_eq!(view.spectrum(1, 0).to_vec(), vec![10.0, 110.0, 210.0]);
    }

    #[test]
    fn test_compose_subset_uses_subset_mask() {
        let CubeSource::Dataset(data) = source() else {
            unreachable!()
        };
        let mut mask = Array2::from_elem((2, 2), false);
        mask[[0, 1]] = true;
        let subset = CubeSource::from(Subset::new("s", data, mask).unwrap());
        let view = CubeView::compose(&subset, &"flux".into()).unwrap();
        assert!(view.is_included(0, 1));
        assert!(!view.is_included(1, 1));
    }

    #[test]
    fn test_compose_unknown_component() {
        let err = CubeView::compose(&source(), &"missing".into()).unwrap_err();
        assert_eq!(err, Error::UnknownComponent("missing".into()));
    }

    #[test]
    fn test_view_shares_component_data() {
        let source = source();
        let view = CubeView::compose(&source, &"flux".into()).unwrap();
        let original = source.data().component("flux").unwrap();
        assert!(std::ptr::eq(view.data().as_ptr(), original.as_ptr()));
    }

    #[test]
    fn test_new_rejects_bad_mask() {
        let data = Arc::new(Array3::zeros((2, 3, 4)));
        let err = CubeView::new(
            "flux".into(),
            data,
            Array2::from_elem((4, 3), true),
            WorldCoordinates::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MaskShapeMismatch { .. }));
    }
}
