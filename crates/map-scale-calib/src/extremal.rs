//! Extremal marker search along the two image axes.

use serde::{Deserialize, Serialize};

use crate::frame::ReferenceFrame;
use crate::resolver::ResolvedMarker;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Farthest marker from the reference along one axis.
///
/// Starts with no marker and zero distances. [`AxisExtremum::offer`] replaces
/// the current winner only on a strictly greater physical distance, so among
/// equal candidates the first one offered stays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisExtremum {
    pub marker_id: Option<u32>,
    /// Absolute pixel displacement from the reference center.
    pub pixel_distance: f64,
    /// Absolute physical displacement in the reference frame (mm).
    pub physical_distance_mm: f64,
}

impl AxisExtremum {
    /// Returns `true` if the candidate became the new extremum.
    pub fn offer(&mut self, id: u32, pixel_distance: f64, physical_distance_mm: f64) -> bool {
        if physical_distance_mm > self.physical_distance_mm {
            *self = Self {
                marker_id: Some(id),
                pixel_distance,
                physical_distance_mm,
            };
            true
        } else {
            false
        }
    }

    /// No marker was ever displaced on this axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.marker_id.is_none()
    }
}

/// Independent X and Y extrema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisExtrema {
    pub x: AxisExtremum,
    pub y: AxisExtremum,
}

/// Scan every non-reference marker, in order, for the largest displacement per axis.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(markers, frame), fields(reference_id = frame.id()))
)]
pub fn locate_extrema(markers: &[ResolvedMarker], frame: &ReferenceFrame) -> AxisExtrema {
    let ref_center = frame.pixel_center();
    let mut extrema = AxisExtrema::default();

    for marker in markers.iter().filter(|m| m.id() != frame.id()) {
        let dx_px = (marker.center.x - ref_center.x).abs();
        let dy_px = (marker.center.y - ref_center.y).abs();
        let local = frame.to_reference_frame(&marker.pose);
        let (dx_mm, dy_mm) = (local.x.abs(), local.y.abs());

        log::trace!(
            "marker {}: dx={:.2}px/{:.2}mm dy={:.2}px/{:.2}mm",
            marker.id(),
            dx_px,
            dx_mm,
            dy_px,
            dy_mm
        );

        if extrema.x.offer(marker.id(), dx_px, dx_mm) {
            log::debug!("marker {} is the new x extremum ({:.2}mm)", marker.id(), dx_mm);
        }
        if extrema.y.offer(marker.id(), dy_px, dy_mm) {
            log::debug!("marker {} is the new y extremum ({:.2}mm)", marker.id(), dy_mm);
        }
    }

    extrema
}
