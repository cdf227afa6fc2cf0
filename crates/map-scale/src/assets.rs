//! Map image and detection inputs.

use std::fs;
use std::path::{Path, PathBuf};

use map_scale_calib::ImageSize;
use map_scale_core::MarkerDetection;

use crate::detector::PrecomputedDetections;
use crate::error::AssetLoadError;

/// A map image known by its path and pixel dimensions.
///
/// Pixels are not decoded; detectors that need them open `path` themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapImage {
    pub path: PathBuf,
    pub size: ImageSize,
}

impl MapImage {
    pub fn new(path: impl Into<PathBuf>, size: ImageSize) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Read the image header to get its dimensions.
#[cfg(feature = "image")]
pub fn load_map_image(path: impl AsRef<Path>) -> Result<MapImage, AssetLoadError> {
    let path = path.as_ref();
    let (width, height) =
        ::image::image_dimensions(path).map_err(|source| AssetLoadError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("map image {}: {}x{}", path.display(), width, height);
    Ok(MapImage::new(path, ImageSize { width, height }))
}

impl PrecomputedDetections {
    /// Load `[{"id": .., "corners": [[x,y] x4]}, ..]` from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AssetLoadError::DetectionsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let detections: Vec<MarkerDetection> =
            serde_json::from_str(&raw).map_err(|source| AssetLoadError::DetectionsParse {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded {} detections from {}", detections.len(), path.display());
        Ok(Self::new(detections))
    }
}
