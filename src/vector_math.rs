//! # 3-vector primitives
//!
//! Small helpers over [`nalgebra::Vector3`] shared by every geometric routine of the crate
//! (look angles, shadow test, phase angle).

use nalgebra::Vector3;

use crate::constants::Radian;

/// Euclidean norm of a vector.
#[inline]
pub fn magnitude(v: &Vector3<f64>) -> f64 {
    v.norm()
}

/// Scalar product of two vectors.
#[inline]
pub fn dot(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b)
}

/// Vector product `a × b`.
#[inline]
pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

/// Angle between two vectors, in radians within `[0, π]`.
///
/// The cosine is clamped to `[-1, 1]` before `acos` so that rounding on (anti)parallel
/// vectors cannot produce a NaN. A zero-length input yields NaN.
///
/// Arguments
/// ---------
/// * `a`, `b`: the two vectors (any common unit).
///
/// Return
/// ------
/// * The angle in radians.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Radian {
    let denom = magnitude(a) * magnitude(b);
    (dot(a, b) / denom).clamp(-1.0, 1.0).acos()
}

/// Perpendicular distance from `point` to the line through the origin along `direction`.
///
/// Computed as `|direction × point| / |direction|`, in the unit of `point`.
pub fn distance_to_line(direction: &Vector3<f64>, point: &Vector3<f64>) -> f64 {
    magnitude(&cross(direction, point)) / magnitude(direction)
}

#[cfg(test)]
mod vector_math_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_basic_products() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(-2.0, 0.5, 4.0);
        assert_relative_eq!(magnitude(&a), 14f64.sqrt());
        assert_relative_eq!(dot(&a, &b), 11.0);
        assert_eq!(cross(&a, &b), Vector3::new(6.5, -10.0, 4.5));
    }

    #[test]
    fn test_angle_between() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_relative_eq!(angle_between(&x, &y), FRAC_PI_2);
        assert_relative_eq!(angle_between(&x, &(-x)), PI);
        assert_eq!(angle_between(&(x * 3.0), &x), 0.0);
        assert!(angle_between(&Vector3::zeros(), &x).is_nan());
    }

    #[test]
    fn test_distance_to_line() {
        let dir = Vector3::new(10.0, 0.0, 0.0);
        let p = Vector3::new(-4.0, 3.0, 4.0);
        assert_relative_eq!(distance_to_line(&dir, &p), 5.0);
    }
}
