//! Marker pose resolution through an injected [`PoseSolver`].

use map_scale_core::{
    square_object_points, CameraIntrinsics, MarkerDetection, MarkerPose, PoseError, PoseSolver,
    RotationError,
};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Why a marker has no pose.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PoseFailure {
    #[error("pose solver returned no solution")]
    SolverFailed,
    #[error(transparent)]
    InvalidRotation(#[from] RotationError),
    #[error("pose solver returned a non-finite translation")]
    NonFiniteTranslation,
}

impl From<PoseError> for PoseFailure {
    fn from(err: PoseError) -> Self {
        match err {
            PoseError::Rotation(reason) => Self::InvalidRotation(reason),
            PoseError::NonFiniteTranslation => Self::NonFiniteTranslation,
        }
    }
}

/// A marker that was dropped from the pose set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPoseFailure {
    pub id: u32,
    pub reason: PoseFailure,
}

/// A solved marker together with its pixel-space center.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMarker {
    pub pose: MarkerPose,
    pub center: Point2<f64>,
}

impl ResolvedMarker {
    #[inline]
    pub fn id(&self) -> u32 {
        self.pose.id()
    }
}

/// Output of [`resolve_poses`]. `markers` keeps the input detection order.
#[derive(Clone, Debug, Default)]
pub struct ResolvedPoses {
    pub markers: Vec<ResolvedMarker>,
    pub failures: Vec<MarkerPoseFailure>,
}

impl ResolvedPoses {
    pub fn get(&self, id: u32) -> Option<&ResolvedMarker> {
        self.markers.iter().find(|m| m.id() == id)
    }

    pub fn failure(&self, id: u32) -> Option<&MarkerPoseFailure> {
        self.failures.iter().find(|f| f.id == id)
    }
}

/// Solve one pose per detection; markers whose pose fails are dropped.
///
/// `marker_size_cm` sets the object-space square, so translations come out in
/// centimetres. Rotations are validated against `tolerance`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(detections, intrinsics, solver),
        fields(num_detections = detections.len())
    )
)]
pub fn resolve_poses<S: PoseSolver + ?Sized>(
    detections: &[MarkerDetection],
    marker_size_cm: f64,
    intrinsics: &CameraIntrinsics,
    solver: &S,
    tolerance: f64,
) -> ResolvedPoses {
    let object = square_object_points(marker_size_cm);
    let mut out = ResolvedPoses::default();

    for det in detections {
        let result = solver
            .solve(&object, &det.corners, intrinsics)
            .ok_or(PoseFailure::SolverFailed)
            .and_then(|sol| {
                MarkerPose::new(det.id, sol.rotation, sol.translation, tolerance)
                    .map_err(PoseFailure::from)
            });

        match result {
            Ok(pose) => out.markers.push(ResolvedMarker {
                pose,
                center: det.center(),
            }),
            Err(reason) => {
                log::warn!("marker {}: pose dropped ({})", det.id, reason);
                out.failures.push(MarkerPoseFailure { id: det.id, reason });
            }
        }
    }

    log::debug!(
        "resolved {} of {} marker poses",
        out.markers.len(),
        detections.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_scale_core::PoseSolution;
    use nalgebra::{Matrix3, Point3, Vector3};

    fn camera() -> CameraIntrinsics {
        CameraIntrinsics::pinhole(800.0, 800.0, 320.0, 240.0).expect("intrinsics")
    }

    #[test]
    fn drops_failed_markers_and_keeps_order() {
        // fails for any marker left of x = 150
        let solver = |_: &[Point3<f64>; 4], img: &[Point2<f64>; 4], _: &CameraIntrinsics| {
            (img[0].x >= 150.0).then(|| PoseSolution {
                rotation: Matrix3::identity(),
                translation: Vector3::new(img[0].x, 0.0, 100.0),
            })
        };
        let detections = vec![
            MarkerDetection::square(4, 300.0, 100.0, 10.0),
            MarkerDetection::square(1, 100.0, 100.0, 10.0),
            MarkerDetection::square(2, 200.0, 100.0, 10.0),
        ];

        let resolved = resolve_poses(&detections, 10.0, &camera(), &solver, 1e-6);

        let ids: Vec<u32> = resolved.markers.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![4, 2]);
        assert_eq!(resolved.failures.len(), 1);
        assert_eq!(resolved.failure(1).map(|f| f.reason), Some(PoseFailure::SolverFailed));
        assert_eq!(resolved.get(4).map(|m| m.center), Some(Point2::new(300.0, 100.0)));
    }

    #[test]
    fn non_orthonormal_rotation_is_a_failure() {
        let solver = |_: &[Point3<f64>; 4], _: &[Point2<f64>; 4], _: &CameraIntrinsics| {
            Some(PoseSolution {
                rotation: Matrix3::identity() * 2.0,
                translation: Vector3::zeros(),
            })
        };
        let detections = vec![MarkerDetection::square(0, 10.0, 10.0, 5.0)];

        let resolved = resolve_poses(&detections, 10.0, &camera(), &solver, 1e-6);

        assert!(resolved.markers.is_empty());
        assert!(matches!(
            resolved.failures[0].reason,
            PoseFailure::InvalidRotation(RotationError::NotOrthonormal { .. })
        ));
    }

    #[test]
    fn non_finite_translation_is_its_own_failure() {
        let solver = |_: &[Point3<f64>; 4], _: &[Point2<f64>; 4], _: &CameraIntrinsics| {
            Some(PoseSolution {
                rotation: Matrix3::identity(),
                translation: Vector3::new(f64::NAN, 0.0, 100.0),
            })
        };
        let detections = vec![MarkerDetection::square(5, 10.0, 10.0, 5.0)];

        let resolved = resolve_poses(&detections, 10.0, &camera(), &solver, 1e-6);

        assert!(resolved.markers.is_empty());
        assert_eq!(
            resolved.failure(5).map(|f| f.reason),
            Some(PoseFailure::NonFiniteTranslation)
        );
    }

    #[test]
    fn object_points_scale_with_marker_size() {
        let solver = |obj: &[Point3<f64>; 4], _: &[Point2<f64>; 4], _: &CameraIntrinsics| {
            Some(PoseSolution {
                rotation: Matrix3::identity(),
                translation: Vector3::new(obj[1].x, obj[1].y, 1.0),
            })
        };
        let detections = vec![MarkerDetection::square(0, 10.0, 10.0, 5.0)];

        let resolved = resolve_poses(&detections, 12.0, &camera(), &solver, 1e-6);

        let t = resolved.markers[0].pose.translation();
        assert_eq!((t.x, t.y), (6.0, 6.0));
    }
}
