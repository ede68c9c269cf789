#![allow(clippy::cast_precision_loss)]
use approx::assert_relative_eq;
use cubeviz_core::{CubeDataset, CubeSource, SpectralAxis, Subset, WavelengthUnit, WorldCoordinates};
use cubeviz_io::{read_dataset, read_source, write_dataset, write_source};
use ndarray::{Array2, Array3};
use tempfile::tempdir;

fn dataset() -> CubeDataset {
    let coords = WorldCoordinates::new(SpectralAxis::linear(
        6500.0,
        1.25,
        WavelengthUnit::Angstrom,
    ));
    let flux = Array3::from_shape_fn((7, 3, 4), |(s, y, x)| (s * 12 + y * 4 + x) as f64 * 0.5);
    let mut smoothed = flux.clone();
    smoothed[[3, 1, 2]] = f64::NAN;
    CubeDataset::new("ngc 4151", [7, 3, 4], coords)
        .unwrap()
        .with_component("flux", flux)
        .unwrap()
        .with_component("flux [Spectrally Smoothed]", smoothed)
        .unwrap()
}

fn same_values(a: &Array3<f64>, b: &Array3<f64>) -> bool {
    a.shape() == b.shape()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

#[test]
fn test_dataset_survives_write_and_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cube.json");
    let original = dataset();

    write_dataset(&path, &original).unwrap();
    let loaded = read_dataset(&path).unwrap();

    assert_eq!(loaded.label(), original.label());
    assert_eq!(loaded.shape(), original.shape());
    assert_eq!(loaded.coords(), original.coords());
    assert_relative_eq!(loaded.coords().spectral.world(6), 6507.5);
    assert_eq!(loaded.component_ids(), original.component_ids());
    for id in original.component_ids() {
        assert!(same_values(
            loaded.component(id.as_str()).unwrap(),
            original.component(id.as_str()).unwrap()
        ));
    }
    assert!(loaded
        .component("flux [Spectrally Smoothed]")
        .unwrap()[[3, 1, 2]]
        .is_nan());
}

#[test]
fn test_subset_survives_write_and_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("subset.json");
    let mask = Array2::from_shape_fn((3, 4), |(y, x)| y == x);
    let source = CubeSource::from(Subset::new("diagonal", dataset(), mask.clone()).unwrap());

    write_source(&path, &source).unwrap();

    match read_source(&path).unwrap() {
        CubeSource::Subset(subset) => {
            assert_eq!(subset.label(), "diagonal");
            assert_eq!(subset.to_mask(), &mask);
            assert_eq!(subset.data().len(), 2);
        }
        CubeSource::Dataset(_) => panic!("mask was dropped"),
    }

    // Reading as a plain dataset ignores the mask.
    assert_eq!(read_dataset(&path).unwrap().len(), 2);
}
