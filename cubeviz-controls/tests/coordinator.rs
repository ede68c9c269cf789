#![allow(clippy::cast_precision_loss)]
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cubeviz_controls::{Error, OperationConfig, OperationCoordinator};
use cubeviz_core::{CubeDataset, CubeSource, Subset, WorldCoordinates};
use cubeviz_ops::{FnOperation, OperationError, RunState, SmoothingConfig, SpectralFunction};
use ndarray::{s, Array1, Array2, Array3, ArrayView1};

const TIMEOUT: Duration = Duration::from_secs(10);

fn dataset(ny: usize, nx: usize) -> CubeDataset {
    let data = Array3::from_shape_fn((6, ny, nx), |(s, y, x)| (s * 2 + y + x) as f64);
    CubeDataset::new("cube", [6, ny, nx], WorldCoordinates::default())
        .unwrap()
        .with_component("flux", data)
        .unwrap()
}

fn identity() -> Arc<dyn SpectralFunction> {
    SmoothingConfig::default().with_boxcar(1).build().unwrap()
}

fn slow_identity() -> Arc<dyn SpectralFunction> {
    Arc::new(FnOperation::new("slow", |s: ArrayView1<'_, f64>| {
        thread::sleep(Duration::from_millis(5));
        Ok(s.to_owned())
    }))
}

fn run_to_end(coordinator: &mut OperationCoordinator) -> RunState {
    coordinator.start_run().unwrap();
    coordinator.wait_for_completion(TIMEOUT).unwrap()
}

#[test]
fn test_result_added_under_derived_name() {
    let mut coordinator =
        OperationCoordinator::new(dataset(2, 3), identity(), OperationConfig::default()).unwrap();

    assert_eq!(run_to_end(&mut coordinator), RunState::Finished);
    assert_eq!(
        coordinator.last_result().unwrap().as_str(),
        "flux [Spectrally Smoothed]"
    );
    assert!(!coordinator.dialog().is_open);
    assert_eq!(coordinator.dialog().status_text, "Added flux [Spectrally Smoothed]");

    let data = coordinator.source().data();
    assert_eq!(
        data.component("flux [Spectrally Smoothed]").unwrap(),
        data.component("flux").unwrap()
    );
}

#[test]
fn test_repeated_runs_get_numbered_names() {
    let mut coordinator =
        OperationCoordinator::new(dataset(2, 2), identity(), OperationConfig::default()).unwrap();

    run_to_end(&mut coordinator);
    run_to_end(&mut coordinator);
    run_to_end(&mut coordinator);

    let names: Vec<String> = coordinator
        .component_ids()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        names,
        [
            "flux",
            "flux [Spectrally Smoothed]",
            "flux [Spectrally Smoothed] 1",
            "flux [Spectrally Smoothed] 2",
        ]
    );
}

#[test]
fn test_custom_result_label() {
    let config = OperationConfig::default().with_result_label("Boxcar 1");
    let mut coordinator = OperationCoordinator::new(dataset(2, 2), identity(), config).unwrap();
    assert_eq!(coordinator.result_name(), "flux [Boxcar 1]");
    run_to_end(&mut coordinator);
    assert_eq!(coordinator.result_name(), "flux [Boxcar 1] 1");
}

#[test]
fn test_progress_reaches_dialog() {
    let mut coordinator =
        OperationCoordinator::new(dataset(3, 3), identity(), OperationConfig::default()).unwrap();
    coordinator.start_run().unwrap();
    assert!(coordinator.dialog().progress_visible);
    assert!(coordinator.dialog().abort_enabled);
    assert!(!coordinator.dialog().start_enabled);

    coordinator.on_progress(0.25);
    assert!((coordinator.dialog().progress - 25.0).abs() < 1e-9);
    assert_eq!(coordinator.dialog().status_text, "Running... 25%");

    assert_eq!(
        coordinator.wait_for_completion(TIMEOUT).unwrap(),
        RunState::Finished
    );
    assert!(!coordinator.dialog().progress_visible);
}

#[test]
fn test_abort_keeps_dialog_open_and_dataset_unchanged() {
    let mut coordinator = OperationCoordinator::new(
        dataset(10, 10),
        slow_identity(),
        OperationConfig::default(),
    )
    .unwrap();
    coordinator.start_run().unwrap();
    coordinator.on_aborted();

    assert!((coordinator.dialog().progress).abs() < f64::EPSILON);
    assert!(!coordinator.dialog().progress_visible);
    assert!(!coordinator.dialog().abort_enabled);
    assert!(coordinator.dialog().is_open);

    // Late progress events must not move the reset indicator.
    coordinator.on_progress(0.5);
    assert!((coordinator.dialog().progress).abs() < f64::EPSILON);

    assert_eq!(
        coordinator.wait_for_completion(TIMEOUT).unwrap(),
        RunState::Aborted
    );
    assert!(coordinator.dialog().is_open);
    assert!(coordinator.dialog().start_enabled);
    assert_eq!(coordinator.dialog().status_text, "Aborted");
    assert_eq!(coordinator.component_ids().len(), 1);
    assert!(coordinator.last_result().is_none());
}

#[test]
fn test_rerun_after_abort() {
    let mut coordinator =
        OperationCoordinator::new(dataset(6, 6), slow_identity(), OperationConfig::default())
            .unwrap();
    coordinator.start_run().unwrap();
    coordinator.on_aborted();
    coordinator.wait_for_completion(TIMEOUT).unwrap();

    assert_eq!(run_to_end(&mut coordinator), RunState::Finished);
    assert_eq!(
        coordinator.last_result().unwrap().as_str(),
        "flux [Spectrally Smoothed]"
    );
}

#[test]
fn test_start_while_running_is_rejected() {
    let mut coordinator = OperationCoordinator::new(
        dataset(10, 10),
        slow_identity(),
        OperationConfig::default(),
    )
    .unwrap();
    coordinator.start_run().unwrap();
    let before = coordinator.dialog().clone();

    assert!(matches!(coordinator.start_run(), Err(Error::RunInProgress)));
    assert_eq!(coordinator.dialog(), &before);
    assert!(coordinator.is_running());

    coordinator.on_aborted();
    coordinator.wait_for_completion(TIMEOUT).unwrap();
}

#[test]
fn test_failed_run_leaves_dataset_unchanged() {
    let broken: Arc<dyn SpectralFunction> =
        Arc::new(FnOperation::new("broken", |_: ArrayView1<'_, f64>| {
            Err::<Array1<f64>, _>(OperationError::Failed("no continuum".into()))
        }));
    let mut coordinator =
        OperationCoordinator::new(dataset(2, 2), broken, OperationConfig::default()).unwrap();

    assert_eq!(run_to_end(&mut coordinator), RunState::Failed);
    assert_eq!(coordinator.component_ids().len(), 1);
    assert!(coordinator.dialog().is_open);
    assert!(coordinator
        .dialog()
        .last_error
        .as_deref()
        .unwrap()
        .contains("no continuum"));
}

#[test]
fn test_subset_result_is_nan_outside_mask() {
    let mut mask = Array2::from_elem((3, 3), false);
    mask[[0, 0]] = true;
    mask[[2, 1]] = true;
    let subset = Subset::new("two spaxels", dataset(3, 3), mask).unwrap();
    let mut coordinator =
        OperationCoordinator::new(subset, identity(), OperationConfig::default()).unwrap();

    assert_eq!(run_to_end(&mut coordinator), RunState::Finished);

    let source = coordinator.into_source();
    assert!(matches!(source, CubeSource::Subset(_)));
    let data = source.data();
    let input = data.component("flux").unwrap();
    let output = data.component("flux [Spectrally Smoothed]").unwrap();
    assert_eq!(output.slice(s![.., 0, 0]), input.slice(s![.., 0, 0]));
    assert_eq!(output.slice(s![.., 2, 1]), input.slice(s![.., 2, 1]));
    assert!(output.slice(s![.., 1, 1]).iter().all(|v| v.is_nan()));
    assert!(output.slice(s![.., 0, 2]).iter().all(|v| v.is_nan()));
}

#[test]
fn test_select_component_changes_operand() {
    let data = dataset(2, 2)
        .with_component("error", Array3::from_elem((6, 2, 2), 0.5))
        .unwrap();
    let mut coordinator =
        OperationCoordinator::new(data, identity(), OperationConfig::default()).unwrap();
    assert_eq!(coordinator.selected_component().as_str(), "flux");

    coordinator.select_component(1);
    assert_eq!(coordinator.selected_component().as_str(), "error");
    run_to_end(&mut coordinator);
    assert_eq!(
        coordinator.last_result().unwrap().as_str(),
        "error [Spectrally Smoothed]"
    );
}

#[test]
#[should_panic(expected = "out of range")]
fn test_select_component_out_of_range_panics() {
    let mut coordinator =
        OperationCoordinator::new(dataset(2, 2), identity(), OperationConfig::default()).unwrap();
    coordinator.select_component(5);
}

#[test]
fn test_dataset_without_components_is_rejected() {
    let empty = CubeDataset::new("empty", [4, 2, 2], WorldCoordinates::default()).unwrap();
    let err = OperationCoordinator::new(empty, identity(), OperationConfig::default()).unwrap_err();
    assert!(matches!(err, Error::NoComponents));
}

#[test]
fn test_wait_without_run_is_an_error() {
    let mut coordinator =
        OperationCoordinator::new(dataset(2, 2), identity(), OperationConfig::default()).unwrap();
    assert!(matches!(
        coordinator.wait_for_completion(TIMEOUT),
        Err(Error::NotRunning)
    ));
    assert_eq!(coordinator.handle_messages().unwrap(), RunState::Idle);
}

#[test]
fn test_close_aborts_active_run() {
    let mut coordinator = OperationCoordinator::new(
        dataset(10, 10),
        slow_identity(),
        OperationConfig::default(),
    )
    .unwrap();
    coordinator.start_run().unwrap();
    coordinator.close();
    assert!(!coordinator.dialog().is_open);
    assert_eq!(
        coordinator.wait_for_completion(TIMEOUT).unwrap(),
        RunState::Aborted
    );
}

#[test]
fn test_parallel_run_matches_sequential() {
    let smooth = SmoothingConfig::default().with_gaussian(1.5).build().unwrap();

    let mut sequential =
        OperationCoordinator::new(dataset(4, 5), Arc::clone(&smooth), OperationConfig::default())
            .unwrap();
    run_to_end(&mut sequential);

    let mut parallel = OperationCoordinator::new(
        dataset(4, 5),
        smooth,
        OperationConfig::default().with_parallel(true),
    )
    .unwrap();
    run_to_end(&mut parallel);

    let name = "flux [Spectrally Smoothed]";
    assert_eq!(
        sequential.source().data().component(name).unwrap(),
        parallel.source().data().component(name).unwrap()
    );
}
