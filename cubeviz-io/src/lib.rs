//! cubeviz-io: JSON file I/O for spectral cubes.
//!
//! A cube file holds the dataset label, its `[spectral, y, x]` shape, the
//! spectral axis mapping, every component as a flat row-major value list
//! and, optionally, a spatial subset mask.
//!

mod error;
mod json;

pub use error::{Error, Result};
pub use json::{read_dataset, read_source, write_dataset, write_source};
