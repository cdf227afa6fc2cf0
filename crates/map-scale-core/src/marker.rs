//! Marker observations and poses.

use nalgebra::{Matrix3, Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A detected fiducial marker: id and its four image corners.
///
/// Corners follow the detector convention TL, TR, BR, BL in pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    pub id: u32,
    pub corners: [Point2<f64>; 4],
}

impl MarkerDetection {
    pub fn new(id: u32, corners: [Point2<f64>; 4]) -> Self {
        Self { id, corners }
    }

    /// Axis-aligned square of half-size `half` centered at `(cx, cy)`.
    pub fn square(id: u32, cx: f64, cy: f64, half: f64) -> Self {
        Self::new(
            id,
            [
                Point2::new(cx - half, cy - half),
                Point2::new(cx + half, cy - half),
                Point2::new(cx + half, cy + half),
                Point2::new(cx - half, cy + half),
            ],
        )
    }

    /// Mean of the four corners.
    pub fn center(&self) -> Point2<f64> {
        let sum = self
            .corners
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }
}

/// Object-space corners of a square marker with edge `size`, centered at the
/// origin in the `z = 0` plane, in detector corner order (TL, TR, BR, BL).
pub fn square_object_points(size: f64) -> [Point3<f64>; 4] {
    let h = size * 0.5;
    [
        Point3::new(-h, h, 0.0),
        Point3::new(h, h, 0.0),
        Point3::new(h, -h, 0.0),
        Point3::new(-h, -h, 0.0),
    ]
}

/// Reasons a rotation matrix is not a proper rotation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RotationError {
    #[error("rotation contains non-finite entries")]
    NonFinite,
    #[error("rotation is not orthonormal (max |R*R^T - I| = {deviation:e})")]
    NotOrthonormal { deviation: f64 },
    #[error("rotation is a reflection (det = {det})")]
    Reflection { det: f64 },
}

/// Check `R * R^T = I` and `det R = +1` within `tolerance`.
pub fn validate_rotation(r: &Matrix3<f64>, tolerance: f64) -> Result<(), RotationError> {
    if r.iter().any(|v| !v.is_finite()) {
        return Err(RotationError::NonFinite);
    }
    let deviation = (r * r.transpose() - Matrix3::identity()).amax();
    if deviation > tolerance {
        return Err(RotationError::NotOrthonormal { deviation });
    }
    let det = r.determinant();
    if (det - 1.0).abs() > tolerance {
        return Err(RotationError::Reflection { det });
    }
    Ok(())
}

/// Why a solved pose cannot become a [`MarkerPose`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PoseError {
    #[error(transparent)]
    Rotation(#[from] RotationError),
    #[error("translation contains non-finite entries")]
    NonFiniteTranslation,
}

/// Estimated pose of a marker relative to the camera.
///
/// The translation is in the unit of the marker size (centimetres throughout
/// this workspace). The rotation is guaranteed orthonormal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerPose {
    id: u32,
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl MarkerPose {
    /// Build a pose, rejecting rotations outside `tolerance` of orthonormal
    /// and non-finite translations.
    pub fn new(
        id: u32,
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
        tolerance: f64,
    ) -> Result<Self, PoseError> {
        validate_rotation(&rotation, tolerance)?;
        if translation.iter().any(|v| !v.is_finite()) {
            return Err(PoseError::NonFiniteTranslation);
        }
        Ok(Self {
            id,
            rotation,
            translation,
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }
}
