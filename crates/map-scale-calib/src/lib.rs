//! Map scale calibration from fiducial markers.
//!
//! Pipeline:
//! - solve one pose per detected marker through a [`PoseSolver`] port,
//! - anchor a reference frame at the configured reference marker,
//! - find the marker farthest from the reference along each axis,
//! - turn those distances into per-axis pixel-per-millimetre scale factors.
//!
//! The two axes are calibrated independently. This is an approximation that
//! holds when the physical layout is aligned with the image axes; no full
//! homography between map and ground is produced.
//!
//! ```
//! use map_scale_calib::{compute_scale, CalibrationConfig, ImageSize};
//! use map_scale_core::{CameraIntrinsics, MarkerDetection, PlanarSquareSolver};
//!
//! let intrinsics = CameraIntrinsics::pinhole(1000.0, 1000.0, 640.0, 360.0).unwrap();
//! let detections: Vec<MarkerDetection> = Vec::new();
//! let size = ImageSize { width: 1280, height: 720 };
//! let cfg = CalibrationConfig::new(15.0);
//!
//! let err = compute_scale(&detections, &intrinsics, size, &cfg, &PlanarSquareSolver::default());
//! assert!(err.is_err());
//! ```
//!
//! [`PoseSolver`]: map_scale_core::PoseSolver

mod calibrator;
mod config;
mod error;
mod extremal;
mod frame;
mod io;
mod report;
mod resolver;
mod scale;

pub use calibrator::{compute_scale, MapScaleCalibrator};
pub use config::CalibrationConfig;
pub use error::CalibrationError;
pub use extremal::{locate_extrema, AxisExtrema, AxisExtremum};
pub use frame::{ReferenceFrame, CM_TO_MM};
pub use io::{load_intrinsics, read_json, ConfigLoadError, ReportIoError};
pub use report::{
    AxisScale, CalibrationReport, ExtremalDistances, ImageSize, PhysicalSize, PixelPosition,
    ReferenceMarkers,
};
pub use resolver::{resolve_poses, MarkerPoseFailure, PoseFailure, ResolvedMarker, ResolvedPoses};
pub use scale::{axis_scale, synthesize_report, DEGENERATE_SCALE};
