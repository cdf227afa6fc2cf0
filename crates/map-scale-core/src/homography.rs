//! Four-point plane-to-plane homographies.

use nalgebra::{Matrix3, Point2, Vector3};

/// Planar projective transform `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x / v.z, v.y / v.z)
    }
}

/// Projective map sending the unit square `(0,0) (1,0) (1,1) (0,1)` onto `quad`.
///
/// Closed form; `None` when three of the corners are collinear.
fn unit_square_to_quad(quad: &[Point2<f64>; 4]) -> Option<Matrix3<f64>> {
    let [p0, p1, p2, p3] = *quad;
    let d1 = p1 - p2;
    let d2 = p3 - p2;
    let d3 = (p0 - p1) + (p2 - p3);

    let den = d1.x * d2.y - d2.x * d1.y;
    if !den.is_finite() || den.abs() < 1e-14 {
        return None;
    }
    let g = (d3.x * d2.y - d2.x * d3.y) / den;
    let h = (d1.x * d3.y - d3.x * d1.y) / den;

    Some(Matrix3::new(
        p1.x - p0.x + g * p1.x,
        p3.x - p0.x + h * p3.x,
        p0.x,
        p1.y - p0.y + g * p1.y,
        p3.y - p0.y + h * p3.y,
        p0.y,
        g,
        h,
        1.0,
    ))
}

/// Compute H such that `dst ~ H * src` from exactly four correspondences.
///
/// Both quads go through the unit square: `H = Q_dst * Q_src^-1`. Corner
/// order must be consistent between `src` and `dst`. The result is scaled to
/// `H[2][2] = 1`.
pub fn homography_from_4pt(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Homography> {
    let from_src = unit_square_to_quad(src)?.try_inverse()?;
    let to_dst = unit_square_to_quad(dst)?;
    let h = to_dst * from_src;

    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    let h = h / s;
    h.iter().all(|v| v.is_finite()).then(|| Homography::new(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    fn perspective() -> Homography {
        Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ))
    }

    #[test]
    fn unit_square_maps_onto_quad() {
        let quad = [
            Point2::new(10.0, 20.0),
            Point2::new(110.0, 25.0),
            Point2::new(120.0, 140.0),
            Point2::new(5.0, 130.0),
        ];
        let q = Homography::new(unit_square_to_quad(&quad).expect("quad"));
        let unit = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        for (u, p) in unit.iter().zip(&quad) {
            assert_close(q.apply(*u), *p, 1e-9);
        }
    }

    #[test]
    fn recovers_perspective_map() {
        let gt = perspective();
        let src = [
            Point2::new(-7.5, 7.5),
            Point2::new(7.5, 7.5),
            Point2::new(7.5, -7.5),
            Point2::new(-7.5, -7.5),
        ];
        let dst = src.map(|p| gt.apply(p));
        let h = homography_from_4pt(&src, &dst).expect("recoverable");

        assert_abs_diff_eq!((h.h - gt.h).amax(), 0.0, epsilon = 1e-9);
        for p in [Point2::new(2.0, -3.0), Point2::new(-6.0, 1.5)] {
            assert_close(h.apply(p), gt.apply(p), 1e-9);
        }
    }

    #[test]
    fn collinear_corners_fail() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        assert!(homography_from_4pt(&src, &line).is_none());
        assert!(homography_from_4pt(&src, &[Point2::new(4.0, 4.0); 4]).is_none());
    }
}
