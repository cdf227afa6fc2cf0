//! Calibration report: the engine's only externally visible artifact.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Map image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Estimated physical extent of the map (the winning extremal distances).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
}

/// Pixels per millimetre along each image axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

impl From<Point2<f64>> for PixelPosition {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Winning marker ids; `None` for a degenerate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMarkers {
    pub max_x: Option<u32>,
    pub max_y: Option<u32>,
}

/// Raw extremal distances that produced the scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtremalDistances {
    pub max_x_mm: f64,
    pub max_y_mm: f64,
    pub max_x_px: f64,
    pub max_y_px: f64,
}

/// Result of a successful calibration run.
///
/// Axes without a winning marker carry a scale of `1.0`; check
/// [`CalibrationReport::is_degenerate_x`] / [`CalibrationReport::is_degenerate_y`]
/// before trusting them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub image_size: ImageSize,
    #[serde(rename = "physical_size_mm")]
    pub physical_size: PhysicalSize,
    pub scale: AxisScale,
    pub reference_pixel: PixelPosition,
    pub reference_markers: ReferenceMarkers,
    pub distances: ExtremalDistances,
}

impl CalibrationReport {
    #[inline]
    pub fn is_degenerate_x(&self) -> bool {
        self.reference_markers.max_x.is_none()
    }

    #[inline]
    pub fn is_degenerate_y(&self) -> bool {
        self.reference_markers.max_y.is_none()
    }

    /// Pixel position to millimetres relative to the reference marker.
    pub fn pixel_to_mm(&self, pixel: Point2<f64>) -> Point2<f64> {
        Point2::new(
            (pixel.x - self.reference_pixel.x) / self.scale.x,
            (pixel.y - self.reference_pixel.y) / self.scale.y,
        )
    }

    /// Millimetres relative to the reference marker to a pixel position.
    pub fn mm_to_pixel(&self, mm: Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.reference_pixel.x + mm.x * self.scale.x,
            self.reference_pixel.y + mm.y * self.scale.y,
        )
    }
}
