//! Core geometric types for fiducial-marker map scale calibration.
//!
//! This crate is small and purely geometric: camera intrinsics, marker
//! detections and poses, homographies, and the pose-solving port. It does
//! *not* detect markers or read images.

mod camera;
mod homography;
mod logger;
mod marker;
mod pose;

pub use camera::{CameraIntrinsics, IntrinsicsError, RadialTangentialDistortion};
pub use homography::{homography_from_4pt, Homography};
pub use marker::{
    square_object_points, validate_rotation, MarkerDetection, MarkerPose, PoseError,
    RotationError,
};
pub use pose::{nearest_rotation, PlanarSolverParams, PlanarSquareSolver, PoseSolution, PoseSolver};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, init_tracing_with_level};

pub use logger::{init_with_level, parse_level};
