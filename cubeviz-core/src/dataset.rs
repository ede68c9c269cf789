//! Datasets, components and spatial subsets.
//!
//! A `CubeDataset` holds any number of named component arrays sharing one
//! spectral-major shape `[spectral, y, x]`. Component arrays are reference
//! counted so views handed to worker threads never copy the cube.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, Array3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coords::WorldCoordinates;
use crate::error::{Error, Result};

/// Identifier of a dataset component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ComponentId(String);

impl ComponentId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct Component {
    id: ComponentId,
    data: Arc<Array3<f64>>,
}

/// A labeled spectral cube with named components.
#[derive(Debug, Clone)]
pub struct CubeDataset {
    label: String,
    shape: [usize; 3],
    coords: WorldCoordinates,
    components: Vec<Component>,
}

impl CubeDataset {
    /// Create an empty dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if any axis has zero length.
    pub fn new(label: impl Into<String>, shape: [usize; 3], coords: WorldCoordinates) -> Result<Self> {
        if shape.contains(&0) {
            return Err(Error::InvalidShape(shape));
        }
        Ok(Self {
            label: label.into(),
            shape,
            coords,
            components: Vec::new(),
        })
    }

    /// Builder-style [`CubeDataset::add_component`].
    ///
    /// # Errors
    ///
    /// Same as [`CubeDataset::add_component`].
    pub fn with_component(mut self, name: impl Into<ComponentId>, data: Array3<f64>) -> Result<Self> {
        self.add_component(data, name)?;
        Ok(self)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shape as `[spectral, y, x]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Spatial shape as `(y, x)`.
    #[must_use]
    pub fn spatial_shape(&self) -> (usize, usize) {
        (self.shape[1], self.shape[2])
    }

    #[must_use]
    pub fn coords(&self) -> &WorldCoordinates {
        &self.coords
    }

    /// Component identifiers in insertion order.
    #[must_use]
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components.iter().map(|c| c.id.clone()).collect()
    }

    /// Shared handle to a component array.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Arc<Array3<f64>>> {
        self.components
            .iter()
            .find(|c| c.id.as_str() == id)
            .map(|c| &c.data)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.components.iter().any(|c| c.id.as_str() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Add a new component. Existing components are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateComponent`] if the name is taken and
    /// [`Error::ShapeMismatch`] if `data` does not have the dataset shape.
    pub fn add_component(
        &mut self,
        data: Array3<f64>,
        name: impl Into<ComponentId>,
    ) -> Result<ComponentId> {
        let id = name.into();
        if self.contains(id.as_str()) {
            return Err(Error::DuplicateComponent(id.to_string()));
        }
        let (s, y, x) = data.dim();
        if [s, y, x] != self.shape {
            return Err(Error::ShapeMismatch {
                expected: self.shape,
                found: [s, y, x],
            });
        }
        log::debug!("dataset '{}': added component '{}'", self.label, id);
        self.components.push(Component {
            id: id.clone(),
            data: Arc::new(data),
        });
        Ok(id)
    }
}

/// A dataset filtered by a boolean mask over its spatial extent.
#[derive(Debug, Clone)]
pub struct Subset {
    label: String,
    data: CubeDataset,
    mask: Array2<bool>,
}

impl Subset {
    /// # Errors
    ///
    /// Returns [`Error::MaskShapeMismatch`] if `mask` is not `(y, x)` of the parent.
    pub fn new(label: impl Into<String>, data: CubeDataset, mask: Array2<bool>) -> Result<Self> {
        let expected = data.spatial_shape();
        if mask.dim() != expected {
            return Err(Error::MaskShapeMismatch {
                expected,
                found: mask.dim(),
            });
        }
        Ok(Self {
            label: label.into(),
            data,
            mask,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent dataset.
    #[must_use]
    pub fn data(&self) -> &CubeDataset {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut CubeDataset {
        &mut self.data
    }

    /// Spatial membership mask.
    #[must_use]
    pub fn to_mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Number of spatial elements inside the subset.
    #[must_use]
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&inside| inside).count()
    }
}

/// Operand source for cube operations: a whole dataset or a subset of one.
#[derive(Debug, Clone)]
pub enum CubeSource {
    Dataset(CubeDataset),
    Subset(Subset),
}

impl CubeSource {
    /// Underlying dataset (the parent for subsets).
    #[must_use]
    pub fn data(&self) -> &CubeDataset {
        match self {
            CubeSource::Dataset(data) => data,
            CubeSource::Subset(subset) => subset.data(),
        }
    }

    pub fn data_mut(&mut self) -> &mut CubeDataset {
        match self {
            CubeSource::Dataset(data) => data,
            CubeSource::Subset(subset) => subset.data_mut(),
        }
    }

    #[must_use]
    pub fn is_subset(&self) -> bool {
        matches!(self, CubeSource::Subset(_))
    }

    #[must_use]
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.data().component_ids()
    }

    #[must_use]
    pub fn coords(&self) -> &WorldCoordinates {
        self.data().coords()
    }

    /// Spatial mask: the subset membership, or all-true for a full dataset.
    #[must_use]
    pub fn mask(&self) -> Array2<bool> {
        match self {
            CubeSource::Dataset(data) => Array2::from_elem(data.spatial_shape(), true),
            CubeSource::Subset(subset) => subset.to_mask().clone(),
        }
    }

    /// Add a component to the underlying dataset.
    ///
    /// # Errors
    ///
    /// See [`CubeDataset::add_component`].
    pub fn add_component(
        &mut self,
        data: Array3<f64>,
        name: impl Into<ComponentId>,
    ) -> Result<ComponentId> {
        self.data_mut().add_component(data, name)
    }
}

impl From<CubeDataset> for CubeSource {
    fn from(data: CubeDataset) -> Self {
        CubeSource::Dataset(data)
    }
}

impl From<Subset> for CubeSource {
    fn from(subset: Subset) -> Self {
        CubeSource::Subset(subset)
    }
}
