use serde::{Deserialize, Serialize};

fn default_reference_id() -> u32 {
    0
}

fn default_orthonormality_tolerance() -> f64 {
    1e-6
}

/// Parameters of a single calibration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Physical marker edge length in centimetres.
    pub marker_size_cm: f64,
    /// Identifier of the marker that anchors the coordinate origin.
    #[serde(default = "default_reference_id")]
    pub reference_id: u32,
    /// Maximum allowed `|R*R^T - I|` entry for a solved rotation.
    #[serde(default = "default_orthonormality_tolerance")]
    pub orthonormality_tolerance: f64,
}

impl CalibrationConfig {
    pub fn new(marker_size_cm: f64) -> Self {
        Self {
            marker_size_cm,
            reference_id: default_reference_id(),
            orthonormality_tolerance: default_orthonormality_tolerance(),
        }
    }

    pub fn with_reference_id(mut self, reference_id: u32) -> Self {
        self.reference_id = reference_id;
        self
    }
}
