use std::sync::Arc;

use crate::curve::{ConstantCurve, CurveRef, FunctionCurve};
use crate::error::{ConfigError, Result};
use crate::math::TOLERANCE;

/// A straight run of tube starting at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Straight {
    length: f64,
    heading: f64,
    num_time_steps: usize,
}

impl Straight {
    /// Creates a straight path of `length` along `heading` (degrees, 0 = +y).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the length is not positive or there are
    /// no time steps.
    pub fn new(length: f64, heading: f64, num_time_steps: usize) -> Result<Self> {
        if length < TOLERANCE {
            return Err(ConfigError::InvalidParameter {
                name: "length",
                reason: format!("must be positive, got {length}"),
            }
            .into());
        }
        if num_time_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_time_steps",
                reason: "must be positive".into(),
            }
            .into());
        }
        Ok(Self {
            length,
            heading,
            num_time_steps,
        })
    }

    #[must_use]
    pub fn num_time_steps(&self) -> usize {
        self.num_time_steps
    }

    /// The x, y and heading curves of the path.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn curves(&self) -> (CurveRef, CurveRef, CurveRef) {
        let per_step = self.length / self.num_time_steps as f64;
        let h = self.heading.to_radians();
        let (dx, dy) = (-h.sin() * per_step, h.cos() * per_step);
        (
            FunctionCurve::shared(move |t| dx * t),
            FunctionCurve::shared(move |t| dy * t),
            Arc::new(ConstantCurve::new(self.heading)),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use crate::path::arclength::calculate_arclengths;
    use crate::path::rotation::RotationCurve;

    #[test]
    fn length_and_heading() {
        let straight = Straight::new(50.0, 90.0, 20).unwrap();
        let (x, y, r) = straight.curves();
        let arcs = calculate_arclengths(x.as_ref(), y.as_ref(), 20).unwrap();
        assert!((arcs[20] - 50.0).abs() < 1e-9);
        // heading 90 points along -x
        assert!((x.evaluate(20.0).unwrap() + 50.0).abs() < 1e-9);
        let numeric = RotationCurve::new(x, y).evaluate(3.0).unwrap();
        assert!((numeric - r.evaluate(3.0).unwrap()).abs() < 1e-6);
    }

    #[test]
    fn empty_straight_rejected() {
        assert!(Straight::new(0.0, 0.0, 10).is_err());
        assert!(Straight::new(10.0, 0.0, 0).is_err());
    }
}
