//! Reader and writer for the JSON cube format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use cubeviz_core::{CubeDataset, CubeSource, SpectralAxis, Subset, WorldCoordinates};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CubeFile {
    label: String,
    shape: [usize; 3],
    #[serde(default)]
    spectral_axis: SpectralAxis,
    components: Vec<ComponentFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mask: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subset_label: Option<String>,
}

/// Values are optional so NaN survives the trip as `null`.
#[derive(Debug, Serialize, Deserialize)]
struct ComponentFile {
    name: String,
    values: Vec<Option<f64>>,
}

/// Read a dataset, ignoring any subset mask in the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a component
/// does not match the declared shape.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<CubeDataset> {
    let file = read_file(path.as_ref())?;
    into_dataset(file).map(|(dataset, _)| dataset)
}

/// Read a dataset as an operand source.
///
/// A file with a `mask` becomes a [`CubeSource::Subset`] of its dataset.
///
/// # Errors
///
/// See [`read_dataset`]; additionally fails if the mask length does not
/// match the spatial shape.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<CubeSource> {
    let file = read_file(path.as_ref())?;
    let (dataset, mask) = into_dataset(file)?;
    match mask {
        Some((label, mask)) => Ok(Subset::new(label, dataset, mask)?.into()),
        None => Ok(dataset.into()),
    }
}

/// Write a dataset without a mask.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_dataset<P: AsRef<Path>>(path: P, dataset: &CubeDataset) -> Result<()> {
    write_file(path.as_ref(), &to_file(dataset, None))
}

/// Write a source; subsets keep their mask and label.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_source<P: AsRef<Path>>(path: P, source: &CubeSource) -> Result<()> {
    let subset = match source {
        CubeSource::Dataset(_) => None,
        CubeSource::Subset(subset) => Some(subset),
    };
    write_file(path.as_ref(), &to_file(source.data(), subset))
}

fn read_file(path: &Path) -> Result<CubeFile> {
    let reader = BufReader::new(File::open(path)?);
    let file: CubeFile = serde_json::from_reader(reader)?;
    log::debug!(
        "read cube '{}' {:?} with {} components from {}",
        file.label,
        file.shape,
        file.components.len(),
        path.display()
    );
    Ok(file)
}

fn write_file(path: &Path, file: &CubeFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, file)?;
    writer.flush()?;
    log::debug!("wrote cube '{}' to {}", file.label, path.display());
    Ok(())
}

type Mask = (String, Array2<bool>);

fn into_dataset(file: CubeFile) -> Result<(CubeDataset, Option<Mask>)> {
    let [ns, ny, nx] = file.shape;
    let spatial = ny.checked_mul(nx).ok_or(Error::InvalidShape(file.shape))?;
    let expected = ns
        .checked_mul(spatial)
        .ok_or(Error::InvalidShape(file.shape))?;
    let mut dataset = CubeDataset::new(
        file.label.clone(),
        file.shape,
        WorldCoordinates::new(file.spectral_axis),
    )?;

    for component in file.components {
        if component.values.len() != expected {
            return Err(Error::LengthMismatch {
                component: component.name,
                expected,
                found: component.values.len(),
            });
        }
        let values = component
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let data = Array3::from_shape_vec((ns, ny, nx), values)?;
        dataset.add_component(data, component.name)?;
    }

    let mask = match file.mask {
        Some(values) => {
            if values.len() != spatial {
                return Err(Error::MaskLengthMismatch {
                    expected: spatial,
                    found: values.len(),
                });
            }
            let mask = Array2::from_shape_vec((ny, nx), values)?;
            let label = file.subset_label.unwrap_or_else(|| "subset".to_string());
            Some((label, mask))
        }
        None => None,
    };

    Ok((dataset, mask))
}

fn to_file(dataset: &CubeDataset, subset: Option<&Subset>) -> CubeFile {
    let components = dataset
        .component_ids()
        .into_iter()
        .filter_map(|id| {
            let data = dataset.component(id.as_str())?;
            let values = data
                .iter()
                .map(|&v| if v.is_nan() { None } else { Some(v) })
                .collect();
            Some(ComponentFile {
                name: id.to_string(),
                values,
            })
        })
        .collect();

    CubeFile {
        label: dataset.label().to_string(),
        shape: dataset.shape(),
        spectral_axis: dataset.coords().spectral,
        components,
        mask: subset.map(|s| s.to_mask().iter().copied().collect()),
        subset_label: subset.map(|s| s.label().to_string()),
    }
}
