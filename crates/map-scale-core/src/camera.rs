//! Pinhole camera intrinsics with Brown-Conrady distortion.
//!
//! Intrinsics are stored the way calibration tools export them: a 3×3
//! projection matrix `K` plus a distortion coefficient vector in OpenCV order
//! `k1, k2, p1, p2[, k3]`. Deserialization validates both.

use nalgebra::{Matrix3, Point2};
use serde::{Deserialize, Serialize};

/// Intrinsics validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IntrinsicsError {
    #[error("camera matrix contains non-finite entries")]
    NonFiniteMatrix,
    #[error("focal lengths must be > 0 (fx={fx}, fy={fy})")]
    InvalidFocalLength { fx: f64, fy: f64 },
    #[error("camera matrix last row must be [0, 0, 1], got {row:?}")]
    InvalidLastRow { row: [f64; 3] },
    #[error("distortion must have 0, 4 or 5 coefficients, got {len}")]
    InvalidDistortionLength { len: usize },
    #[error("distortion contains non-finite coefficients")]
    NonFiniteDistortion,
}

/// Brown-Conrady radial-tangential distortion coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RadialTangentialDistortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl RadialTangentialDistortion {
    fn from_slice(coeffs: &[f64]) -> Result<Self, IntrinsicsError> {
        if !matches!(coeffs.len(), 0 | 4 | 5) {
            return Err(IntrinsicsError::InvalidDistortionLength { len: coeffs.len() });
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(IntrinsicsError::NonFiniteDistortion);
        }
        let at = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
        Ok(Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
        })
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.p1 == 0.0 && self.p2 == 0.0 && self.k3 == 0.0
    }

    /// Apply distortion to normalized coordinates.
    pub fn distort_normalized(&self, p: Point2<f64>) -> Point2<f64> {
        let (x, y) = (p.x, p.y);
        let r2 = x * x + y * y;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2;
        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        Point2::new(x * radial + x_tan, y * radial + y_tan)
    }

    /// Invert [`Self::distort_normalized`] by fixed-point iteration.
    pub fn undistort_normalized(&self, distorted: Point2<f64>) -> Option<Point2<f64>> {
        const MAX_ITERS: usize = 20;
        const EPS: f64 = 1e-12;

        if self.is_zero() {
            return Some(distorted);
        }

        let mut p = distorted;
        for _ in 0..MAX_ITERS {
            let r2 = p.x * p.x + p.y * p.y;
            let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2;
            if !radial.is_finite() || radial.abs() < 1e-12 {
                return None;
            }
            let dx_tan = 2.0 * self.p1 * p.x * p.y + self.p2 * (r2 + 2.0 * p.x * p.x);
            let dy_tan = self.p1 * (r2 + 2.0 * p.y * p.y) + 2.0 * self.p2 * p.x * p.y;
            let next = Point2::new(
                (distorted.x - dx_tan) / radial,
                (distorted.y - dy_tan) / radial,
            );
            if !next.x.is_finite() || !next.y.is_finite() {
                return None;
            }
            let step = (next - p).norm();
            p = next;
            if step <= EPS {
                break;
            }
        }
        Some(p)
    }
}

/// On-disk representation, validated into [`CameraIntrinsics`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawIntrinsics {
    camera_matrix: [[f64; 3]; 3],
    #[serde(default)]
    distortion: Vec<f64>,
}

/// Camera projection matrix and distortion coefficients.
///
/// Immutable once constructed; every instance satisfies the validation rules
/// in [`CameraIntrinsics::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIntrinsics", into = "RawIntrinsics")]
pub struct CameraIntrinsics {
    k: Matrix3<f64>,
    coeffs: Vec<f64>,
    distortion: RadialTangentialDistortion,
}

impl TryFrom<RawIntrinsics> for CameraIntrinsics {
    type Error = IntrinsicsError;

    fn try_from(raw: RawIntrinsics) -> Result<Self, Self::Error> {
        let m = raw.camera_matrix;
        let k = Matrix3::new(
            m[0][0], m[0][1], m[0][2], //
            m[1][0], m[1][1], m[1][2], //
            m[2][0], m[2][1], m[2][2],
        );
        Self::new(k, raw.distortion)
    }
}

impl From<CameraIntrinsics> for RawIntrinsics {
    fn from(c: CameraIntrinsics) -> Self {
        let k = c.k;
        Self {
            camera_matrix: [
                [k[(0, 0)], k[(0, 1)], k[(0, 2)]],
                [k[(1, 0)], k[(1, 1)], k[(1, 2)]],
                [k[(2, 0)], k[(2, 1)], k[(2, 2)]],
            ],
            distortion: c.coeffs,
        }
    }
}

impl CameraIntrinsics {
    /// Validate and build intrinsics from a projection matrix and distortion vector.
    pub fn new(k: Matrix3<f64>, distortion: Vec<f64>) -> Result<Self, IntrinsicsError> {
        if k.iter().any(|v| !v.is_finite()) {
            return Err(IntrinsicsError::NonFiniteMatrix);
        }
        let (fx, fy) = (k[(0, 0)], k[(1, 1)]);
        if fx <= 0.0 || fy <= 0.0 {
            return Err(IntrinsicsError::InvalidFocalLength { fx, fy });
        }
        let row = [k[(2, 0)], k[(2, 1)], k[(2, 2)]];
        if row != [0.0, 0.0, 1.0] {
            return Err(IntrinsicsError::InvalidLastRow { row });
        }
        let model = RadialTangentialDistortion::from_slice(&distortion)?;
        Ok(Self {
            k,
            coeffs: distortion,
            distortion: model,
        })
    }

    /// Distortion-free pinhole intrinsics.
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, IntrinsicsError> {
        Self::new(
            Matrix3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0),
            Vec::new(),
        )
    }

    #[inline]
    pub fn camera_matrix(&self) -> &Matrix3<f64> {
        &self.k
    }

    /// Raw distortion coefficients as supplied.
    #[inline]
    pub fn distortion_coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    #[inline]
    pub fn distortion(&self) -> RadialTangentialDistortion {
        self.distortion
    }

    #[inline]
    pub fn fx(&self) -> f64 {
        self.k[(0, 0)]
    }

    #[inline]
    pub fn fy(&self) -> f64 {
        self.k[(1, 1)]
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.k[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.k[(1, 2)]
    }

    #[inline]
    fn skew(&self) -> f64 {
        self.k[(0, 1)]
    }

    /// Map a pixel to normalized, undistorted camera coordinates.
    ///
    /// Returns `None` if the distortion inversion diverges.
    pub fn pixel_to_normalized(&self, pixel: Point2<f64>) -> Option<Point2<f64>> {
        let y = (pixel.y - self.cy()) / self.fy();
        let x = (pixel.x - self.cx() - self.skew() * y) / self.fx();
        self.distortion.undistort_normalized(Point2::new(x, y))
    }

    /// Project normalized, undistorted camera coordinates to a (distorted) pixel.
    pub fn normalized_to_pixel(&self, normalized: Point2<f64>) -> Point2<f64> {
        let d = self.distortion.distort_normalized(normalized);
        Point2::new(
            self.fx() * d.x + self.skew() * d.y + self.cx(),
            self.fy() * d.y + self.cy(),
        )
    }
}
