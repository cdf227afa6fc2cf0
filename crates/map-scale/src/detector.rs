//! Marker detection port.

use map_scale_core::MarkerDetection;

use crate::MapImage;

/// Source of marker detections for a map image.
///
/// Detection failures are reported as an empty (or partial) set; the
/// calibration then fails on the missing reference marker if needed.
pub trait MarkerDetector {
    fn detect(&self, image: &MapImage) -> Vec<MarkerDetection>;
}

/// Detections produced ahead of time, e.g. by an external ArUco detector.
#[derive(Clone, Debug, Default)]
pub struct PrecomputedDetections {
    detections: Vec<MarkerDetection>,
}

impl PrecomputedDetections {
    pub fn new(detections: Vec<MarkerDetection>) -> Self {
        Self { detections }
    }

    pub fn detections(&self) -> &[MarkerDetection] {
        &self.detections
    }
}

impl MarkerDetector for PrecomputedDetections {
    fn detect(&self, image: &MapImage) -> Vec<MarkerDetection> {
        log::debug!(
            "{} precomputed detections for {}",
            self.detections.len(),
            image.path.display()
        );
        self.detections.clone()
    }
}

impl<F> MarkerDetector for F
where
    F: Fn(&MapImage) -> Vec<MarkerDetection>,
{
    fn detect(&self, image: &MapImage) -> Vec<MarkerDetection> {
        self(image)
    }
}
