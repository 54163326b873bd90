//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
use std::f64::consts::PI;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Computes the Euclidean distance between two points.
pub fn distance(a: Point2d, b: Point2d) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    (dx * dx + dy * dy).sqrt()
}

/// Computes the bearing from `a` to `b` in radians.
pub fn bearing(a: Point2d, b: Point2d) -> f64 {
    f64::atan2(b.y - a.y, b.x - a.x)
}

/// Returns `p` moved `dist` units along the given angle.
pub fn offset(p: Point2d, angle: f64, dist: f64) -> Point2d {
    Point2d::new(p.x + angle.cos() * dist, p.y + angle.sin() * dist)
}

/// Computes the absolute difference between two angles,
/// taking the shorter way around the circle. Result is in `[0, pi]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % (2.0 * PI);
    f64::min(diff, 2.0 * PI - diff)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn distance_between_points() {
        let a = Point2d::new(0.0, 0.0);
        let b = Point2d::new(3.0, 4.0);
        assert_approx_eq!(distance(a, b), 5.0);
        assert_approx_eq!(distance(b, a), 5.0);
        assert_approx_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn bearing_cardinals() {
        let o = Point2d::new(0.0, 0.0);
        assert_approx_eq!(bearing(o, Point2d::new(1.0, 0.0)), 0.0);
        assert_approx_eq!(bearing(o, Point2d::new(0.0, 1.0)), PI / 2.0);
        assert_approx_eq!(bearing(o, Point2d::new(-1.0, 0.0)), PI);
    }

    #[test]
    fn offset_round_trip() {
        let p = Point2d::new(10.0, 20.0);
        let q = offset(p, 0.3, 5.0);
        assert_approx_eq!(distance(p, q), 5.0);
        assert_approx_eq!(bearing(p, q), 0.3);
    }

    #[test]
    fn angle_difference_wraps() {
        assert_approx_eq!(angle_difference(0.1, -0.1), 0.2);
        // 350 degrees apart is really 10 degrees apart
        let a = 355.0_f64.to_radians();
        let b = 5.0_f64.to_radians();
        assert_approx_eq!(angle_difference(a, b), 10.0_f64.to_radians());
        assert!(angle_difference(0.0, PI) <= PI);
    }
}
