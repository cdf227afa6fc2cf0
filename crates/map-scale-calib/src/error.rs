use map_scale_core::RotationError;

/// Fatal calibration failures. No report is produced when one of these occurs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("no valid pose for reference marker {id}")]
    MissingReferenceMarker { id: u32 },
    #[error("reference marker {id} has an invalid pose: {reason}")]
    InvalidReferencePose { id: u32, reason: RotationError },
    #[error("marker id {id} appears more than once in the detection set")]
    DuplicateMarkerId { id: u32 },
    #[error("marker size must be finite and > 0 (got {size_cm} cm)")]
    InvalidMarkerSize { size_cm: f64 },
    #[error("orthonormality tolerance must be finite and >= 0 (got {tolerance})")]
    InvalidTolerance { tolerance: f64 },
}
