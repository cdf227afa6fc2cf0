//! Fiducial-marker map scale calibration.
//!
//! This crate ties the workspace together:
//! - re-exports of the geometry core and the calibration engine,
//! - the [`MarkerDetector`] port with a JSON-backed [`PrecomputedDetections`],
//! - (feature `image`) map image loading and end-to-end helpers driven by a
//!   [`MapScaleRunConfig`],
//! - (feature `cli`) the `map-scale` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use map_scale::{calibrate_from_config, MapScaleRunConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = MapScaleRunConfig::load_json("run.json")?;
//! let report = calibrate_from_config(&cfg)?;
//! println!("{:.4} px/mm by {:.4} px/mm", report.scale.x, report.scale.y);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `map_scale::core`: intrinsics, marker detections and poses, the
//!   [`PoseSolver`] port and the planar square solver.
//! - `map_scale::calib`: reference frame, extremal search and report synthesis.
//! - `map_scale::calibrate_image`: run any detector and solver on a [`MapImage`].

pub use map_scale_calib as calib;
pub use map_scale_core as core;

pub use map_scale_calib::{
    compute_scale, CalibrationConfig, CalibrationError, CalibrationReport, ConfigLoadError,
    ImageSize, MapScaleCalibrator, ReportIoError,
};
pub use map_scale_core::{
    CameraIntrinsics, MarkerDetection, MarkerPose, PlanarSolverParams, PlanarSquareSolver,
    PoseSolution, PoseSolver,
};

mod assets;
mod detector;
mod error;
mod pipeline;

#[cfg(feature = "image")]
pub use assets::load_map_image;
pub use assets::MapImage;
pub use detector::{MarkerDetector, PrecomputedDetections};
pub use error::{AssetLoadError, MapScaleError};
#[cfg(feature = "image")]
pub use pipeline::calibrate_from_config;
pub use pipeline::{calibrate_image, MapScaleRunConfig};
