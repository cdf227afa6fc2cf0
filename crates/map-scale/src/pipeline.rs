//! End-to-end helpers: assets in, calibration report out.

use std::fs;
use std::path::{Path, PathBuf};

use map_scale_calib::{
    compute_scale, read_json, CalibrationConfig, CalibrationReport, ConfigLoadError,
    ReportIoError,
};
use map_scale_core::{CameraIntrinsics, PlanarSolverParams, PoseSolver};
use serde::{Deserialize, Serialize};

use crate::detector::MarkerDetector;
use crate::error::MapScaleError;
use crate::MapImage;

#[cfg(feature = "image")]
use crate::{assets::load_map_image, detector::PrecomputedDetections, PlanarSquareSolver};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything a calibration run reads from disk, as one JSON document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapScaleRunConfig {
    pub image_path: PathBuf,
    pub intrinsics_path: PathBuf,
    pub detections_path: PathBuf,
    /// Where to write the report; stdout when absent.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub solver: PlanarSolverParams,
}

impl MapScaleRunConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

/// Detect markers on `image` and compute its scale.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, detector, intrinsics, config, solver),
        fields(width = image.size.width, height = image.size.height)
    )
)]
pub fn calibrate_image<D, S>(
    image: &MapImage,
    detector: &D,
    intrinsics: &CameraIntrinsics,
    config: &CalibrationConfig,
    solver: &S,
) -> Result<CalibrationReport, MapScaleError>
where
    D: MarkerDetector + ?Sized,
    S: PoseSolver + ?Sized,
{
    let detections = detector.detect(image);
    log::info!(
        "{} markers detected on {}",
        detections.len(),
        image.path.display()
    );
    Ok(compute_scale(
        &detections,
        intrinsics,
        image.size,
        config,
        solver,
    )?)
}

/// Load every asset named by `cfg` and run the planar-solver pipeline.
///
/// All loading happens before any geometry, so a missing file never yields a
/// partial result.
#[cfg(feature = "image")]
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn calibrate_from_config(cfg: &MapScaleRunConfig) -> Result<CalibrationReport, MapScaleError> {
    let image = load_map_image(&cfg.image_path)?;
    let intrinsics = map_scale_calib::load_intrinsics(&cfg.intrinsics_path)?;
    let detector = PrecomputedDetections::load_json(&cfg.detections_path)?;
    let solver = PlanarSquareSolver::new(cfg.solver);

    calibrate_image(&image, &detector, &intrinsics, &cfg.calibration, &solver)
}
