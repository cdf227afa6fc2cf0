//! JSON loading for calibration parameters and report persistence.

use std::fs;
use std::path::{Path, PathBuf};

use map_scale_core::CameraIntrinsics;
use serde::de::DeserializeOwned;

use crate::config::CalibrationConfig;
use crate::report::CalibrationReport;

/// Calibration parameters are missing or corrupt.
#[derive(thiserror::Error, Debug)]
pub enum ConfigLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ReportIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Read and deserialize a JSON parameter file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigLoadError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl CalibrationConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        read_json(path)
    }
}

/// Load and validate camera intrinsics
/// (`{"camera_matrix": [[..],[..],[..]], "distortion": [..]}`).
pub fn load_intrinsics(path: impl AsRef<Path>) -> Result<CameraIntrinsics, ConfigLoadError> {
    read_json(path)
}

impl CalibrationReport {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ReportIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReportIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportIoError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
