//! Reference coordinate frame anchored at the reference marker.

use map_scale_core::MarkerPose;
use nalgebra::{Matrix3, Point2, Vector3};

use crate::error::CalibrationError;
use crate::resolver::{PoseFailure, ResolvedPoses};

/// Marker translations are in centimetres; reference-frame output is in millimetres.
pub const CM_TO_MM: f64 = 10.0;

/// Frame of the reference marker: origin at its center, axes along its edges.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceFrame {
    id: u32,
    translation: Vector3<f64>,
    /// `R_ref^T`, the inverse of the reference rotation (orthonormal by construction).
    rotation_t: Matrix3<f64>,
    pixel_center: Point2<f64>,
}

impl ReferenceFrame {
    /// Select the pose of `reference_id` and build its frame.
    ///
    /// A reference whose pose was rejected for a bad rotation reports
    /// [`CalibrationError::InvalidReferencePose`]; any other absence reports
    /// [`CalibrationError::MissingReferenceMarker`].
    pub fn build(resolved: &ResolvedPoses, reference_id: u32) -> Result<Self, CalibrationError> {
        let Some(reference) = resolved.get(reference_id) else {
            return Err(match resolved.failure(reference_id).map(|f| f.reason) {
                Some(PoseFailure::InvalidRotation(reason)) => {
                    CalibrationError::InvalidReferencePose {
                        id: reference_id,
                        reason,
                    }
                }
                _ => CalibrationError::MissingReferenceMarker { id: reference_id },
            });
        };

        Ok(Self {
            id: reference_id,
            translation: *reference.pose.translation(),
            rotation_t: reference.pose.rotation().transpose(),
            pixel_center: reference.center,
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    #[inline]
    pub fn rotation_transpose(&self) -> &Matrix3<f64> {
        &self.rotation_t
    }

    /// Pixel-space center of the reference marker.
    #[inline]
    pub fn pixel_center(&self) -> Point2<f64> {
        self.pixel_center
    }

    /// Position of `pose` in the reference marker's local frame, in millimetres.
    pub fn to_reference_frame(&self, pose: &MarkerPose) -> Vector3<f64> {
        self.rotation_t * (pose.translation() - self.translation) * CM_TO_MM
    }
}
