use approx::assert_abs_diff_eq;
use map_scale_calib::{
    compute_scale, CalibrationConfig, CalibrationError, ImageSize, MapScaleCalibrator,
};
use map_scale_core::{CameraIntrinsics, MarkerDetection, PoseSolution, PoseSolver};
use nalgebra::{Matrix3, Point2, Point3, Vector3};

/// Returns a fixed pose per marker, keyed by the pixel center of its corners.
struct TableSolver {
    entries: Vec<(Point2<f64>, Vector3<f64>)>,
}

impl TableSolver {
    /// `(pixel center, physical position in mm)`; stored as camera-frame cm.
    fn new(entries: &[((f64, f64), (f64, f64, f64))]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&((px, py), (x, y, z))| {
                    (
                        Point2::new(px, py),
                        Vector3::new(x / 10.0, y / 10.0, 200.0 + z / 10.0),
                    )
                })
                .collect(),
        }
    }
}

impl PoseSolver for TableSolver {
    fn solve(
        &self,
        _object_points: &[Point3<f64>; 4],
        image_points: &[Point2<f64>; 4],
        _intrinsics: &CameraIntrinsics,
    ) -> Option<PoseSolution> {
        let center = Point2::from(
            image_points
                .iter()
                .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords)
                / 4.0,
        );
        self.entries
            .iter()
            .find(|(c, _)| (c - center).norm() < 1e-9)
            .map(|(_, t)| PoseSolution {
                rotation: Matrix3::identity(),
                translation: *t,
            })
    }
}

fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::pinhole(1000.0, 1000.0, 320.0, 240.0).expect("intrinsics")
}

fn image_size() -> ImageSize {
    ImageSize {
        width: 640,
        height: 480,
    }
}

const REF: u32 = 0;
const A: u32 = 11;
const B: u32 = 22;

fn scene_detections() -> Vec<MarkerDetection> {
    vec![
        MarkerDetection::square(REF, 100.0, 100.0, 8.0),
        MarkerDetection::square(A, 300.0, 100.0, 8.0),
        MarkerDetection::square(B, 100.0, 400.0, 8.0),
    ]
}

fn scene_solver() -> TableSolver {
    TableSolver::new(&[
        ((100.0, 100.0), (0.0, 0.0, 0.0)),
        ((300.0, 100.0), (500.0, 0.0, 0.0)),
        ((100.0, 400.0), (0.0, 600.0, 0.0)),
    ])
}

#[test]
fn reference_scene_produces_expected_report() {
    let cfg = CalibrationConfig::new(10.0);
    let report = compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &cfg,
        &scene_solver(),
    )
    .expect("report");

    assert_abs_diff_eq!(report.scale.x, 0.4, epsilon = 1e-12);
    assert_abs_diff_eq!(report.scale.y, 0.5, epsilon = 1e-12);
    assert_eq!(report.reference_markers.max_x, Some(A));
    assert_eq!(report.reference_markers.max_y, Some(B));
    assert_abs_diff_eq!(report.distances.max_x_mm, 500.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.distances.max_y_mm, 600.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.distances.max_x_px, 200.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.distances.max_y_px, 300.0, epsilon = 1e-9);
    assert_eq!(report.physical_size.width, report.distances.max_x_mm);
    assert_eq!(report.physical_size.height, report.distances.max_y_mm);
    assert_eq!((report.reference_pixel.x, report.reference_pixel.y), (100.0, 100.0));
    assert_eq!(report.image_size, image_size());
    assert!(!report.is_degenerate_x() && !report.is_degenerate_y());
}

#[test]
fn failed_x_marker_degrades_only_x_axis() {
    // marker A has no table entry, so its pose solve fails
    let solver = TableSolver::new(&[
        ((100.0, 100.0), (0.0, 0.0, 0.0)),
        ((100.0, 400.0), (0.0, 600.0, 0.0)),
    ]);
    let cfg = CalibrationConfig::new(10.0);
    let report = compute_scale(&scene_detections(), &intrinsics(), image_size(), &cfg, &solver)
        .expect("report");

    assert_eq!(report.scale.x, 1.0);
    assert_eq!(report.reference_markers.max_x, None);
    assert!(report.is_degenerate_x());
    assert_abs_diff_eq!(report.scale.y, 0.5, epsilon = 1e-12);
    assert_eq!(report.reference_markers.max_y, Some(B));
}

#[test]
fn all_other_markers_failing_gives_unit_scales() {
    let solver = TableSolver::new(&[((100.0, 100.0), (0.0, 0.0, 0.0))]);
    let cfg = CalibrationConfig::new(10.0);
    let report = compute_scale(&scene_detections(), &intrinsics(), image_size(), &cfg, &solver)
        .expect("report");

    assert_eq!((report.scale.x, report.scale.y), (1.0, 1.0));
    assert_eq!(report.reference_markers.max_x, None);
    assert_eq!(report.reference_markers.max_y, None);
    assert_eq!(report.distances.max_x_mm, 0.0);
}

#[test]
fn missing_reference_id_is_fatal() {
    let cfg = CalibrationConfig::new(10.0).with_reference_id(99);
    let err = compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &cfg,
        &scene_solver(),
    )
    .unwrap_err();
    assert_eq!(err, CalibrationError::MissingReferenceMarker { id: 99 });
}

#[test]
fn empty_detection_set_reports_missing_reference() {
    let cfg = CalibrationConfig::new(10.0);
    let err = compute_scale(&[], &intrinsics(), image_size(), &cfg, &scene_solver()).unwrap_err();
    assert_eq!(err, CalibrationError::MissingReferenceMarker { id: 0 });
}

#[test]
fn ties_keep_the_earlier_detection() {
    let detections = vec![
        MarkerDetection::square(REF, 100.0, 100.0, 8.0),
        MarkerDetection::square(5, 300.0, 100.0, 8.0),
        MarkerDetection::square(6, 100.0, 300.0, 8.0),
        MarkerDetection::square(7, 310.0, 120.0, 8.0),
    ];
    let solver = TableSolver::new(&[
        ((100.0, 100.0), (0.0, 0.0, 0.0)),
        ((300.0, 100.0), (400.0, 0.0, 0.0)),
        ((100.0, 300.0), (0.0, 400.0, 0.0)),
        ((310.0, 120.0), (-400.0, 50.0, 0.0)),
    ]);
    let cfg = CalibrationConfig::new(10.0);

    let report =
        compute_scale(&detections, &intrinsics(), image_size(), &cfg, &solver).expect("report");
    assert_eq!(report.reference_markers.max_x, Some(5));
    assert_abs_diff_eq!(report.distances.max_x_px, 200.0, epsilon = 1e-9);

    let mut swapped = detections.clone();
    swapped.swap(1, 3);
    let report =
        compute_scale(&swapped, &intrinsics(), image_size(), &cfg, &solver).expect("report");
    assert_eq!(report.reference_markers.max_x, Some(7));
    assert_abs_diff_eq!(report.distances.max_x_px, 210.0, epsilon = 1e-9);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let calibrator = MapScaleCalibrator::with_solver(CalibrationConfig::new(10.0), scene_solver());
    let a = calibrator
        .calibrate(&scene_detections(), &intrinsics(), image_size())
        .expect("report");
    let b = calibrator
        .calibrate(&scene_detections(), &intrinsics(), image_size())
        .expect("report");
    assert_eq!(a, b);
    assert_eq!(a.to_json().expect("json"), b.to_json().expect("json"));
}

#[test]
fn positive_scale_when_any_marker_is_displaced() {
    let detections = vec![
        MarkerDetection::square(REF, 50.0, 50.0, 5.0),
        MarkerDetection::square(3, 90.0, 70.0, 5.0),
    ];
    let solver = TableSolver::new(&[((50.0, 50.0), (0.0, 0.0, 0.0)), ((90.0, 70.0), (120.0, 60.0, 0.0))]);
    let report = compute_scale(
        &detections,
        &intrinsics(),
        image_size(),
        &CalibrationConfig::new(5.0),
        &solver,
    )
    .expect("report");
    assert!(report.scale.x > 0.0 && report.scale.y > 0.0);
    assert_eq!(report.reference_markers.max_x, Some(3));
    assert_eq!(report.reference_markers.max_y, Some(3));
}

#[test]
fn duplicate_ids_are_rejected() {
    let detections = vec![
        MarkerDetection::square(REF, 100.0, 100.0, 8.0),
        MarkerDetection::square(A, 300.0, 100.0, 8.0),
        MarkerDetection::square(A, 100.0, 400.0, 8.0),
    ];
    let err = compute_scale(
        &detections,
        &intrinsics(),
        image_size(),
        &CalibrationConfig::new(10.0),
        &scene_solver(),
    )
    .unwrap_err();
    assert_eq!(err, CalibrationError::DuplicateMarkerId { id: A });
}

#[test]
fn non_positive_marker_size_is_rejected() {
    let err = compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &CalibrationConfig::new(0.0),
        &scene_solver(),
    )
    .unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidMarkerSize { .. }));
}

#[test]
fn unusable_orthonormality_tolerance_is_rejected() {
    let skewed = |_: &[Point3<f64>; 4], _: &[Point2<f64>; 4], _: &CameraIntrinsics| {
        Some(PoseSolution {
            rotation: Matrix3::new(1.0, 0.9, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
            translation: Vector3::new(0.0, 0.0, 100.0),
        })
    };
    let mut cfg = CalibrationConfig::new(10.0);
    cfg.orthonormality_tolerance = f64::NAN;
    let err = compute_scale(&scene_detections(), &intrinsics(), image_size(), &cfg, &skewed)
        .unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidTolerance { tolerance } if tolerance.is_nan()));

    cfg.orthonormality_tolerance = -1.0;
    let err = compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &cfg,
        &scene_solver(),
    )
    .unwrap_err();
    assert_eq!(err, CalibrationError::InvalidTolerance { tolerance: -1.0 });

    cfg.orthonormality_tolerance = 0.0;
    assert!(compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &cfg,
        &scene_solver()
    )
    .is_ok());
}

#[test]
fn skewed_reference_rotation_is_fatal() {
    let solver = |_: &[Point3<f64>; 4], _: &[Point2<f64>; 4], _: &CameraIntrinsics| {
        Some(PoseSolution {
            rotation: Matrix3::new(1.0, 0.2, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
            translation: Vector3::new(0.0, 0.0, 100.0),
        })
    };
    let err = compute_scale(
        &scene_detections(),
        &intrinsics(),
        image_size(),
        &CalibrationConfig::new(10.0),
        &solver,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::InvalidReferencePose { id: REF, .. }
    ));
}
