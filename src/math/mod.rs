/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Step used for central-difference derivatives of curves.
pub const DERIVATIVE_EPSILON: f64 = 0.001;

/// Converts degrees to radians.
#[must_use]
pub fn radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Normalizes an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed difference `to - from` in degrees, wrapped into `(-180, 180]`.
#[must_use]
pub fn signed_degrees_between(from: f64, to: f64) -> f64 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negative() {
        assert!((normalize_degrees(-90.0) - 270.0).abs() < TOLERANCE);
        assert!((normalize_degrees(720.0)).abs() < TOLERANCE);
        assert!((normalize_degrees(-1e-20)).abs() < TOLERANCE);
    }

    #[test]
    fn signed_difference_takes_short_way() {
        assert!((signed_degrees_between(350.0, 10.0) - 20.0).abs() < TOLERANCE);
        assert!((signed_degrees_between(10.0, 350.0) + 20.0).abs() < TOLERANCE);
        assert!((signed_degrees_between(0.0, 180.0) - 180.0).abs() < TOLERANCE);
    }
}
