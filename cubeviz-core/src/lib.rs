//! cubeviz-core: Data model for spectral cube operations.
//!
//! This crate provides datasets with named components, spatial subsets,
//! read-only cube views handed to background workers, the linear spectral
//! coordinate mapping, and the wavelength unit catalog.
//!

pub mod coords;
pub mod dataset;
pub mod error;
pub mod units;
pub mod view;

pub use coords::{SpectralAxis, WorldCoordinates};
pub use dataset::{ComponentId, CubeDataset, CubeSource, Subset};
pub use error::{Error, Result};
pub use units::WavelengthUnit;
pub use view::CubeView;
