//! map-scale CLI: calibrate a map image and convert between pixels and millimetres.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use map_scale::{calibrate_from_config, CalibrationReport, MapScaleRunConfig};
use nalgebra::Point2;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "map-scale")]
#[command(about = "Compute pixel-per-millimetre scale of a map image from fiducial markers")]
#[command(version)]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace (`RUST_LOG` wins under `tracing`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the calibration pipeline and emit the report as JSON.
    Calibrate(CalibrateArgs),

    /// Convert a pixel position to millimetres relative to the reference marker.
    ToMm(ConvertArgs),

    /// Convert millimetres relative to the reference marker to a pixel position.
    ToPx(ConvertArgs),
}

#[derive(Debug, Clone, Args)]
struct CalibrateArgs {
    /// Run config (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Override the detections file.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Override the map image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Override the intrinsics file.
    #[arg(long)]
    intrinsics: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ConvertArgs {
    /// Calibration report (JSON).
    #[arg(long)]
    report: PathBuf,

    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    #[arg(long, allow_hyphen_values = true)]
    y: f64,
}

/// With `tracing`, `RUST_LOG` takes precedence over `--log-level` when set.
#[cfg(feature = "tracing")]
fn init_logging(level: &str) -> CliResult<()> {
    map_scale::core::init_tracing_with_level(false, map_scale::core::parse_level(level));
    let _ = tracing_log::LogTracer::init();
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: &str) -> CliResult<()> {
    map_scale::core::init_with_level(map_scale::core::parse_level(level))?;
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Calibrate(args) => run_calibrate(args),
        Commands::ToMm(args) => run_convert(&args, |r, p| r.pixel_to_mm(p)),
        Commands::ToPx(args) => run_convert(&args, |r, p| r.mm_to_pixel(p)),
    }
}

fn run_calibrate(args: CalibrateArgs) -> CliResult<()> {
    let mut cfg = MapScaleRunConfig::load_json(&args.config)?;
    if let Some(path) = args.detections {
        cfg.detections_path = path;
    }
    if let Some(path) = args.image {
        cfg.image_path = path;
    }
    if let Some(path) = args.intrinsics {
        cfg.intrinsics_path = path;
    }
    if let Some(path) = args.out {
        cfg.output_path = Some(path);
    }

    let report = calibrate_from_config(&cfg)?;
    if report.is_degenerate_x() || report.is_degenerate_y() {
        log::warn!("report contains a degenerate axis; its scale is a placeholder");
    }

    match cfg.output_path() {
        Some(path) => {
            report.write_json(path)?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn run_convert(
    args: &ConvertArgs,
    convert: impl Fn(&CalibrationReport, Point2<f64>) -> Point2<f64>,
) -> CliResult<()> {
    let report = CalibrationReport::load_json(&args.report)?;
    let p = convert(&report, Point2::new(args.x, args.y));
    println!("{}", serde_json::json!({ "x": p.x, "y": p.y }));
    Ok(())
}
