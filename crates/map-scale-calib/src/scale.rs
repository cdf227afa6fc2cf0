//! Per-axis scale synthesis and report assembly.

use crate::extremal::{AxisExtrema, AxisExtremum};
use crate::frame::ReferenceFrame;
use crate::report::{
    AxisScale, CalibrationReport, ExtremalDistances, ImageSize, PhysicalSize, ReferenceMarkers,
};

/// Scale used for an axis with no physical extent.
pub const DEGENERATE_SCALE: f64 = 1.0;

/// Pixels per millimetre for one axis, or [`DEGENERATE_SCALE`] without extent.
pub fn axis_scale(extremum: &AxisExtremum) -> f64 {
    if extremum.physical_distance_mm > 0.0 {
        extremum.pixel_distance / extremum.physical_distance_mm
    } else {
        DEGENERATE_SCALE
    }
}

/// Combine the axis extrema into the final report.
pub fn synthesize_report(
    extrema: &AxisExtrema,
    frame: &ReferenceFrame,
    image_size: ImageSize,
) -> CalibrationReport {
    for (axis, ext) in [("x", &extrema.x), ("y", &extrema.y)] {
        if ext.is_degenerate() {
            log::warn!(
                "no marker displaced from reference {} along {}; scale falls back to {}",
                frame.id(),
                axis,
                DEGENERATE_SCALE
            );
        }
    }

    CalibrationReport {
        image_size,
        physical_size: PhysicalSize {
            width: extrema.x.physical_distance_mm,
            height: extrema.y.physical_distance_mm,
        },
        scale: AxisScale {
            x: axis_scale(&extrema.x),
            y: axis_scale(&extrema.y),
        },
        reference_pixel: frame.pixel_center().into(),
        reference_markers: ReferenceMarkers {
            max_x: extrema.x.marker_id,
            max_y: extrema.y.marker_id,
        },
        distances: ExtremalDistances {
            max_x_mm: extrema.x.physical_distance_mm,
            max_y_mm: extrema.y.physical_distance_mm,
            max_x_px: extrema.x.pixel_distance,
            max_y_px: extrema.y.pixel_distance,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_pixels_over_millimetres() {
        let ext = AxisExtremum {
            marker_id: Some(3),
            pixel_distance: 250.0,
            physical_distance_mm: 500.0,
        };
        assert_eq!(axis_scale(&ext), 0.5);
    }

    #[test]
    fn empty_axis_falls_back() {
        assert_eq!(axis_scale(&AxisExtremum::default()), DEGENERATE_SCALE);
    }
}
