//! Render a synthetic overhead scene to disk and calibrate it end to end.
//!
//! Usage: `synthetic_scene [output_dir]` (defaults to the system temp dir).

use std::fs;
use std::path::PathBuf;

use map_scale::core::square_object_points;
use map_scale::{
    calibrate_from_config, CalibrationConfig, MapScaleRunConfig, MarkerDetection,
    PlanarSolverParams,
};
use nalgebra::{Matrix3, Point2};

#[cfg(feature = "tracing")]
use map_scale::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use map_scale::core::init_with_level;

const FOCAL_PX: f64 = 1200.0;
const DEPTH_CM: f64 = 300.0;
const MARKER_CM: f64 = 20.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_with_level(log::LevelFilter::Info)?;

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    fs::create_dir_all(&dir)?;

    let (width, height) = (1600u32, 1200u32);
    let k = Matrix3::new(
        FOCAL_PX,
        0.0,
        width as f64 / 2.0,
        0.0,
        FOCAL_PX,
        height as f64 / 2.0,
        0.0,
        0.0,
        1.0,
    );
    let project = |x: f64, y: f64| {
        let p = k * nalgebra::Vector3::new(x, y, DEPTH_CM);
        Point2::new(p.x / p.z, p.y / p.z)
    };

    // reference in the middle, a 3x3 layout of markers 50 cm apart
    let layout = [(0, 0), (-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
    let detections: Vec<MarkerDetection> = layout
        .iter()
        .enumerate()
        .map(|(id, &(gx, gy))| {
            let (cx, cy) = (gx as f64 * 50.0, gy as f64 * 50.0);
            let corners = square_object_points(MARKER_CM).map(|p| project(cx + p.x, cy + p.y));
            MarkerDetection::new(id as u32, corners)
        })
        .collect();

    let image_path = dir.join("synthetic_map.png");
    image::GrayImage::from_pixel(width, height, image::Luma([255])).save(&image_path)?;

    let intrinsics_path = dir.join("synthetic_camera.json");
    fs::write(
        &intrinsics_path,
        serde_json::to_string_pretty(&serde_json::json!({
            "camera_matrix": [
                [FOCAL_PX, 0.0, width as f64 / 2.0],
                [0.0, FOCAL_PX, height as f64 / 2.0],
                [0.0, 0.0, 1.0]
            ],
            "distortion": []
        }))?,
    )?;

    let detections_path = dir.join("synthetic_markers.json");
    fs::write(&detections_path, serde_json::to_string_pretty(&detections)?)?;

    let cfg = MapScaleRunConfig {
        image_path,
        intrinsics_path,
        detections_path,
        output_path: Some(dir.join("synthetic_report.json")),
        calibration: CalibrationConfig::new(MARKER_CM),
        solver: PlanarSolverParams::default(),
    };
    cfg.write_json(dir.join("synthetic_run.json"))?;

    let report = calibrate_from_config(&cfg)?;
    if let Some(out) = cfg.output_path() {
        report.write_json(out)?;
    }

    // expected: FOCAL_PX / DEPTH_CM px per cm
    println!(
        "scale x={:.4} y={:.4} px/mm (expected {:.4})",
        report.scale.x,
        report.scale.y,
        FOCAL_PX / DEPTH_CM / 10.0
    );
    Ok(())
}
