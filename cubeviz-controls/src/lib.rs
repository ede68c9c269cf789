//! cubeviz-controls: Foreground controllers for the cube viewer.
//!
//! - [`OperationCoordinator`] binds component selection, start and abort to
//!   an [`OperationRunner`](cubeviz_ops::OperationRunner) and merges the
//!   result back into the dataset.
//! - [`UnitController`] manages wavelength unit selection and
//!   redshift-driven relabeling.
//!
//! Both talk to the host through small traits in [`host`].

mod coordinator;
mod error;
pub mod host;
mod state;
pub mod units;

pub use coordinator::{OperationConfig, OperationCoordinator, DEFAULT_RESULT_LABEL};
pub use error::{Error, Result};
pub use host::{CubeLayout, RedshiftDispatch};
pub use state::DialogState;
pub use units::{
    convert_wavelengths, UnitController, OBSERVED_WAVELENGTH_LABEL, REST_WAVELENGTH_LABEL,
};
