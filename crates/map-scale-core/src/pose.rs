//! Pose-solving port and a planar square solver.
//!
//! The calibration engine only needs `solve(object, image, intrinsics)`. Any
//! PnP implementation can be plugged in through [`PoseSolver`]; closures with
//! the same signature implement it too, which keeps tests free of geometry.

use nalgebra::{Matrix3, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraIntrinsics;
use crate::homography::homography_from_4pt;

/// Rotation and translation mapping object points into the camera frame:
/// `X_cam = rotation * X_obj + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSolution {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

/// Pose estimation from four 2D-3D correspondences.
///
/// Returning `None` signals a per-marker failure; the caller drops the marker.
pub trait PoseSolver: Send + Sync {
    fn solve(
        &self,
        object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        intrinsics: &CameraIntrinsics,
    ) -> Option<PoseSolution>;
}

impl<F> PoseSolver for F
where
    F: Fn(&[Point3<f64>; 4], &[Point2<f64>; 4], &CameraIntrinsics) -> Option<PoseSolution>
        + Send
        + Sync,
{
    fn solve(
        &self,
        object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        intrinsics: &CameraIntrinsics,
    ) -> Option<PoseSolution> {
        self(object_points, image_points, intrinsics)
    }
}

/// Settings for [`PlanarSquareSolver`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanarSolverParams {
    /// Reject solutions whose mean corner reprojection error exceeds this (pixels).
    pub max_reprojection_px: f64,
    /// Reject solutions with any corner closer to the camera than this (object units).
    pub min_depth: f64,
}

impl Default for PlanarSolverParams {
    fn default() -> Self {
        Self {
            max_reprojection_px: 2.0,
            min_depth: 1e-6,
        }
    }
}

/// Closed-form pose of a planar square from its plane-to-image homography.
///
/// Corners are undistorted into normalized coordinates, `H = [h1 h2 h3]` is
/// decomposed into `λ[r1 r2 t]`, and the rotation is projected onto SO(3).
#[derive(Clone, Debug, Default)]
pub struct PlanarSquareSolver {
    params: PlanarSolverParams,
}

impl PlanarSquareSolver {
    pub fn new(params: PlanarSolverParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlanarSolverParams {
        &self.params
    }

    fn decompose(
        &self,
        object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        intrinsics: &CameraIntrinsics,
    ) -> Option<PoseSolution> {
        if object_points.iter().any(|p| p.z != 0.0) {
            return None;
        }
        let plane = object_points.map(|p| Point2::new(p.x, p.y));
        let mut normalized = [Point2::origin(); 4];
        for (dst, &px) in normalized.iter_mut().zip(image_points) {
            *dst = intrinsics.pixel_to_normalized(px)?;
        }

        let h = homography_from_4pt(&plane, &normalized)?.h;
        let h1 = h.column(0).into_owned();
        let h2 = h.column(1).into_owned();
        let h3 = h.column(2).into_owned();

        let norm = 0.5 * (h1.norm() + h2.norm());
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        let mut lambda = 1.0 / norm;
        if h3.z * lambda < 0.0 {
            lambda = -lambda;
        }

        let r1 = h1 * lambda;
        let r2 = h2 * lambda;
        let r3 = r1.cross(&r2);
        let translation = h3 * lambda;

        let rotation = nearest_rotation(&Matrix3::from_columns(&[r1, r2, r3]))?;
        Some(PoseSolution {
            rotation,
            translation,
        })
    }

    fn mean_reprojection_error(
        &self,
        pose: &PoseSolution,
        object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        intrinsics: &CameraIntrinsics,
    ) -> Option<f64> {
        let mut sum = 0.0;
        for (obj, img) in object_points.iter().zip(image_points) {
            let cam = pose.rotation * obj.coords + pose.translation;
            if cam.z < self.params.min_depth {
                return None;
            }
            let projected = intrinsics.normalized_to_pixel(Point2::new(cam.x / cam.z, cam.y / cam.z));
            sum += (projected - img).norm();
        }
        Some(sum / 4.0)
    }
}

impl PoseSolver for PlanarSquareSolver {
    fn solve(
        &self,
        object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        intrinsics: &CameraIntrinsics,
    ) -> Option<PoseSolution> {
        let pose = self.decompose(object_points, image_points, intrinsics)?;
        let err = self.mean_reprojection_error(&pose, object_points, image_points, intrinsics)?;
        if !err.is_finite() || err > self.params.max_reprojection_px {
            log::debug!(
                "planar pose rejected: reprojection error {:.3}px > {:.3}px",
                err,
                self.params.max_reprojection_px
            );
            return None;
        }
        Some(pose)
    }
}

/// Closest rotation matrix in the Frobenius sense (`U * V^T`, det forced to +1).
pub fn nearest_rotation(m: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let svd = m.svd(true, true);
    let mut u = svd.u?;
    let v_t = svd.v_t?;
    if (u * v_t).determinant() < 0.0 {
        let flipped = -u.column(2);
        u.set_column(2, &flipped);
    }
    let r = u * v_t;
    r.iter().all(|v| v.is_finite()).then_some(r)
}
