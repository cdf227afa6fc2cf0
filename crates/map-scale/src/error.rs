use std::path::PathBuf;

use map_scale_calib::{CalibrationError, ConfigLoadError};

/// Map image or detection input could not be loaded.
#[derive(thiserror::Error, Debug)]
pub enum AssetLoadError {
    #[cfg(feature = "image")]
    #[error("cannot read map image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("cannot read detections {path}: {source}")]
    DetectionsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse detections {path}: {source}")]
    DetectionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors produced by the end-to-end helpers.
#[derive(thiserror::Error, Debug)]
pub enum MapScaleError {
    #[error(transparent)]
    ConfigLoad(#[from] ConfigLoadError),
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
