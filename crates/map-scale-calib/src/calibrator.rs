//! End-to-end calibration: poses -> reference frame -> extrema -> report.

use std::collections::HashSet;

use map_scale_core::{CameraIntrinsics, MarkerDetection, PlanarSquareSolver, PoseSolver};

use crate::config::CalibrationConfig;
use crate::error::CalibrationError;
use crate::extremal::locate_extrema;
use crate::frame::ReferenceFrame;
use crate::report::{CalibrationReport, ImageSize};
use crate::resolver::resolve_poses;
use crate::scale::synthesize_report;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Compute per-axis pixel-per-millimetre scale from marker detections.
///
/// Pure function of its inputs: detections are processed in the given order,
/// which decides ties between equally distant markers.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(detections, intrinsics, config, solver),
        fields(
            num_detections = detections.len(),
            reference_id = config.reference_id,
            width = image_size.width,
            height = image_size.height
        )
    )
)]
pub fn compute_scale<S: PoseSolver + ?Sized>(
    detections: &[MarkerDetection],
    intrinsics: &CameraIntrinsics,
    image_size: ImageSize,
    config: &CalibrationConfig,
    solver: &S,
) -> Result<CalibrationReport, CalibrationError> {
    if !config.marker_size_cm.is_finite() || config.marker_size_cm <= 0.0 {
        return Err(CalibrationError::InvalidMarkerSize {
            size_cm: config.marker_size_cm,
        });
    }
    let tolerance = config.orthonormality_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(CalibrationError::InvalidTolerance { tolerance });
    }
    let mut seen = HashSet::with_capacity(detections.len());
    if let Some(dup) = detections.iter().find(|d| !seen.insert(d.id)) {
        return Err(CalibrationError::DuplicateMarkerId { id: dup.id });
    }

    let resolved = resolve_poses(
        detections,
        config.marker_size_cm,
        intrinsics,
        solver,
        config.orthonormality_tolerance,
    );
    let frame = ReferenceFrame::build(&resolved, config.reference_id)?;
    let extrema = locate_extrema(&resolved.markers, &frame);
    let report = synthesize_report(&extrema, &frame, image_size);

    log::info!(
        "map scale: x={:.5} px/mm (marker {:?}), y={:.5} px/mm (marker {:?})",
        report.scale.x,
        report.reference_markers.max_x,
        report.scale.y,
        report.reference_markers.max_y
    );
    Ok(report)
}

/// Calibration config bundled with a pose solver.
pub struct MapScaleCalibrator<S = PlanarSquareSolver> {
    config: CalibrationConfig,
    solver: S,
}

impl MapScaleCalibrator<PlanarSquareSolver> {
    /// Calibrator using the built-in planar square solver.
    pub fn new(config: CalibrationConfig) -> Self {
        Self::with_solver(config, PlanarSquareSolver::default())
    }
}

impl<S: PoseSolver> MapScaleCalibrator<S> {
    pub fn with_solver(config: CalibrationConfig, solver: S) -> Self {
        Self { config, solver }
    }

    #[inline]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    #[inline]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn calibrate(
        &self,
        detections: &[MarkerDetection],
        intrinsics: &CameraIntrinsics,
        image_size: ImageSize,
    ) -> Result<CalibrationReport, CalibrationError> {
        compute_scale(detections, intrinsics, image_size, &self.config, &self.solver)
    }
}
