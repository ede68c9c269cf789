//! Command-line front end for spectral cube operations.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines
)]

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use cubeviz_controls::{
    CubeLayout, OperationConfig, OperationCoordinator, RedshiftDispatch, UnitController,
};
use cubeviz_core::{CubeDataset, CubeSource, SpectralAxis, WavelengthUnit, WorldCoordinates};
use cubeviz_ops::{RunState, SmoothingConfig};
use ndarray::{Array1, Array3};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    CubeIo(#[from] cubeviz_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] cubeviz_core::Error),

    #[error("Operation error: {0}")]
    Operation(#[from] cubeviz_ops::OperationError),

    #[error("{0}")]
    Control(#[from] cubeviz_controls::Error),

    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    #[error("Operation ended as {state:?}: {detail}")]
    RunEnded { state: RunState, detail: String },
}

/// Smoothing kernel selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kernel {
    /// Moving average over `width` samples
    Boxcar,
    /// Gaussian with standard deviation `width` samples
    Gaussian,
}

/// Spectral cube operations.
#[derive(Parser)]
#[command(name = "cubeviz")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic emission-line cube
    Synth {
        /// Output cube file
        #[arg(short, long)]
        output: PathBuf,

        /// Cube shape as SPECTRAL,Y,X
        #[arg(long, value_parser = parse_shape, default_value = "64,16,16")]
        shape: [usize; 3],
    },

    /// Show information about a cube file
    Info {
        /// Input cube file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Smooth a component along the spectral axis and add the result
    Smooth {
        /// Input cube file
        #[arg(short, long)]
        input: PathBuf,

        /// Output cube file
        #[arg(short, long)]
        output: PathBuf,

        /// Component to smooth (default: the first one)
        #[arg(short, long)]
        component: Option<String>,

        /// Smoothing kernel
        #[arg(short, long, value_enum, default_value = "boxcar")]
        kernel: Kernel,

        /// Boxcar width or Gaussian standard deviation, in samples
        #[arg(short, long, default_value = "3")]
        width: f64,

        /// Process spectra on the rayon pool
        #[arg(long)]
        parallel: bool,

        /// Abort once this fraction of the cube is done (0-1)
        #[arg(long)]
        abort_after: Option<f64>,
    },

    /// Convert the spectral axis to another unit
    Wavelengths {
        /// Input cube file
        #[arg(short, long)]
        input: PathBuf,

        /// Target unit title, name or symbol (e.g. Nanometer, nm)
        #[arg(short, long)]
        unit: String,

        /// Redshift of the source
        #[arg(short, long)]
        redshift: Option<f64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { output, shape } => synth(&output, shape),
        Commands::Info { input } => info(&input),
        Commands::Smooth {
            input,
            output,
            component,
            kernel,
            width,
            parallel,
            abort_after,
        } => {
            let smoothing = match kernel {
                Kernel::Boxcar => SmoothingConfig::default().with_boxcar(width.round() as usize),
                Kernel::Gaussian => SmoothingConfig::default().with_gaussian(width),
            };
            smooth(
                &input,
                &output,
                component.as_deref(),
                &smoothing,
                parallel,
                abort_after,
            )
        }
        Commands::Wavelengths {
            input,
            unit,
            redshift,
        } => wavelengths(&input, &unit, redshift),
    }
}

fn parse_shape(s: &str) -> std::result::Result<[usize; 3], String> {
    let dims: Vec<usize> = s
        .split(',')
        .map(|d| d.trim().parse::<usize>().map_err(|e| format!("'{d}': {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match dims.as_slice() {
        [ns, ny, nx] => Ok([*ns, *ny, *nx]),
        _ => Err(format!("expected SPECTRAL,Y,X, got {} values", dims.len())),
    }
}

/// Gaussian emission line over a sloped continuum, brighter towards the
/// cube center, with a deterministic ripple standing in for noise.
fn synth(output: &Path, shape: [usize; 3]) -> Result<()> {
    let [ns, ny, nx] = shape;
    let axis = SpectralAxis::linear(6500.0, 1.0, WavelengthUnit::Angstrom);
    let line_center = axis.world(ns / 2);
    let (cy, cx) = (ny as f64 / 2.0, nx as f64 / 2.0);

    let flux = Array3::from_shape_fn((ns, ny, nx), |(s, y, x)| {
        let wavelength = axis.world(s);
        let r2 = (y as f64 - cy).powi(2) + (x as f64 - cx).powi(2);
        let amplitude = 10.0 * (-r2 / (2.0 * (cx.max(cy) / 2.0).powi(2))).exp();
        let line = amplitude * (-(wavelength - line_center).powi(2) / 8.0).exp();
        let continuum = 1.0 + 0.001 * s as f64;
        let ripple = 0.2 * ((s * 7 + y * 13 + x * 29) as f64).sin();
        continuum + line + ripple
    });

    let dataset = CubeDataset::new("synthetic", shape, WorldCoordinates::new(axis))?
        .with_component("flux", flux)?;
    cubeviz_io::write_dataset(output, &dataset)?;
    println!("Wrote {}x{}x{} cube to {}", ns, ny, nx, output.display());
    Ok(())
}

fn info(input: &Path) -> Result<()> {
    let source = cubeviz_io::read_source(input)?;
    let data = source.data();
    let [ns, ny, nx] = data.shape();
    let axis = data.coords().spectral;

    println!("File: {}", input.display());
    println!("Label: {}", data.label());
    println!("Shape: {} spectral x {} y x {} x", ns, ny, nx);
    println!(
        "Spectral range: {:.4} - {:.4} {}",
        axis.world(0),
        axis.world(ns - 1),
        axis.unit
    );
    if let CubeSource::Subset(subset) = &source {
        println!(
            "Subset: {} ({} of {} spaxels)",
            subset.label(),
            subset.count(),
            ny * nx
        );
    }
    println!("Components:");
    for id in data.component_ids() {
        println!("  {id}");
    }
    Ok(())
}

fn smooth(
    input: &Path,
    output: &Path,
    component: Option<&str>,
    smoothing: &SmoothingConfig,
    parallel: bool,
    abort_after: Option<f64>,
) -> Result<()> {
    let source = cubeviz_io::read_source(input)?;
    let function = smoothing.build()?;
    let config = OperationConfig::default().with_parallel(parallel);
    let mut coordinator = OperationCoordinator::new(source, function, config)?;

    if let Some(name) = component {
        let index = coordinator
            .component_ids()
            .iter()
            .position(|id| id.as_str() == name)
            .ok_or_else(|| CliError::UnknownComponent(name.to_string()))?;
        coordinator.select_component(index);
    }

    let start = Instant::now();
    coordinator.start_run()?;
    let mut shown = -1.0;
    while coordinator.is_running() {
        coordinator.handle_messages()?;
        let progress = coordinator.dialog().progress;
        if progress - shown >= 10.0 {
            eprintln!("{}", coordinator.dialog().status_text);
            shown = progress;
        }
        if coordinator.is_running()
            && abort_after.is_some_and(|fraction| progress >= fraction * 100.0)
        {
            eprintln!("Aborting at {progress:.0}%");
            coordinator.on_aborted();
            let state = coordinator.wait_for_completion(Duration::from_secs(60))?;
            log::info!("run ended as {state:?}");
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    let state = coordinator.state();
    if state != RunState::Finished {
        return Err(CliError::RunEnded {
            state,
            detail: coordinator
                .dialog()
                .last_error
                .clone()
                .unwrap_or_else(|| "no result added".to_string()),
        });
    }

    let added = coordinator
        .last_result()
        .map(ToString::to_string)
        .unwrap_or_default();
    let source = coordinator.into_source();
    cubeviz_io::write_source(output, &source)?;
    println!(
        "Added '{}' in {:.2}s, wrote {}",
        added,
        start.elapsed().as_secs_f64(),
        output.display()
    );
    Ok(())
}

/// Layout that prints what the controller pushes to it.
struct PrintingLayout {
    wavelengths: Option<Array1<f64>>,
}

impl CubeLayout for PrintingLayout {
    fn wavelengths(&self) -> Option<Array1<f64>> {
        self.wavelengths.clone()
    }

    fn set_wavelengths(&mut self, wavelengths: &Array1<f64>, unit: WavelengthUnit) {
        println!("Wavelengths ({unit}):");
        for value in wavelengths {
            println!("  {value}");
        }
        self.wavelengths = Some(wavelengths.clone());
    }

    fn set_wavelength_label(&mut self, label: &str) {
        println!("Label: {label}");
    }
}

/// Redshift listener that only logs.
struct LogDispatch;

impl RedshiftDispatch for LogDispatch {
    fn redshift_changed(&mut self, z: f64) {
        log::info!("redshift broadcast z={z}");
    }
}

fn wavelengths(input: &Path, unit: &str, redshift: Option<f64>) -> Result<()> {
    let dataset = cubeviz_io::read_dataset(input)?;
    let coords = dataset.coords().clone();
    let values = coords.spectral.values(dataset.shape()[0]);

    let mut controller = UnitController::new(PrintingLayout { wavelengths: None }, LogDispatch);
    controller.enable(coords, values);
    if let Some(z) = redshift {
        controller.set_redshift(Some(z));
    }

    // Accept symbols and names as well as selector titles.
    let title = unit
        .parse::<WavelengthUnit>()
        .map_or_else(|_| unit.to_string(), WavelengthUnit::title);
    controller.on_unit_selected(&title)?;
    Ok(())
}
