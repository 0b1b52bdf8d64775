use std::sync::Arc;

use crate::curve::{Curve, CurveRef};
use crate::error::{ConfigError, Result};
use crate::math::{normalize_degrees, TOLERANCE};

/// A circular path seen from above.
///
/// The path starts with heading `initial_heading` and turns left
/// (counterclockwise) or right by `360 / sides_per_rotation` degrees per step.
/// Its first point sits at `radius` from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    radius: f64,
    initial_heading: f64,
    clockwise: bool,
    sides_per_rotation: f64,
    rotations: f64,
}

impl Helix {
    /// Creates a helix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the radius, rotation count or sides per
    /// rotation are not positive.
    pub fn new(
        radius: f64,
        initial_heading: f64,
        clockwise: bool,
        sides_per_rotation: f64,
        rotations: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(ConfigError::InvalidParameter {
                name: "helix_radius",
                reason: format!("must be positive, got {radius}"),
            }
            .into());
        }
        if rotations <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "rotations",
                reason: "must complete some positive fraction of a rotation".into(),
            }
            .into());
        }
        if sides_per_rotation <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "helix_sides",
                reason: format!("must be positive, got {sides_per_rotation}"),
            }
            .into());
        }
        Ok(Self {
            radius,
            initial_heading,
            clockwise,
            sides_per_rotation,
            rotations,
        })
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn clockwise(&self) -> bool {
        self.clockwise
    }

    /// Number of time steps needed to cover all rotations.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn num_time_steps(&self) -> usize {
        (self.rotations * self.sides_per_rotation - TOLERANCE).ceil().max(1.0) as usize
    }

    /// Position angle of the first point around the origin, in degrees.
    fn initial_position(&self) -> f64 {
        if self.clockwise {
            self.initial_heading - 180.0
        } else {
            self.initial_heading
        }
    }

    /// Position angle around the origin at step `t`, in degrees.
    fn position_angle(&self, t: f64) -> f64 {
        let turned = 360.0 * t / self.sides_per_rotation;
        if self.clockwise {
            self.initial_position() - turned
        } else {
            self.initial_position() + turned
        }
    }

    /// Heading at step `t`, in degrees within `[0, 360)`.
    #[must_use]
    pub fn heading(&self, t: f64) -> f64 {
        let phi = self.position_angle(t);
        normalize_degrees(if self.clockwise { phi + 180.0 } else { phi })
    }

    /// The x, y and heading curves of the helix.
    #[must_use]
    pub fn curves(&self) -> (CurveRef, CurveRef, CurveRef) {
        let x: CurveRef = Arc::new(HelixCurve {
            helix: *self,
            part: HelixPart::X,
        });
        let y: CurveRef = Arc::new(HelixCurve {
            helix: *self,
            part: HelixPart::Y,
        });
        let r: CurveRef = Arc::new(HelixCurve {
            helix: *self,
            part: HelixPart::Heading,
        });
        (x, y, r)
    }

    /// Slope angle in degrees of a helix that rises `vertical_displacement`
    /// per full turn.
    #[must_use]
    pub fn slope_for_displacement(radius: f64, vertical_displacement: f64) -> f64 {
        let around = radius * std::f64::consts::TAU;
        let along = around.hypot(vertical_displacement);
        if along < TOLERANCE {
            return 0.0;
        }
        (vertical_displacement / along).asin().to_degrees()
    }
}

#[derive(Debug, Clone, Copy)]
enum HelixPart {
    X,
    Y,
    Heading,
}

struct HelixCurve {
    helix: Helix,
    part: HelixPart,
}

impl Curve for HelixCurve {
    fn evaluate(&self, t: f64) -> Result<f64> {
        let phi = self.helix.position_angle(t).to_radians();
        Ok(match self.part {
            HelixPart::X => self.helix.radius * phi.cos(),
            HelixPart::Y => self.helix.radius * phi.sin(),
            HelixPart::Heading => self.helix.heading(t),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::signed_degrees_between;
    use crate::path::rotation::RotationCurve;

    #[test]
    fn analytic_heading_matches_numeric() {
        for clockwise in [false, true] {
            let helix = Helix::new(20.0, 30.0, clockwise, 36.0, 0.75).unwrap();
            let (x, y, r) = helix.curves();
            let numeric = RotationCurve::new(x, y);
            assert_eq!(helix.num_time_steps(), 27);
            for step in 0..=27_u32 {
                let t = f64::from(step);
                let a = r.evaluate(t).unwrap();
                let b = numeric.evaluate(t).unwrap();
                assert!(signed_degrees_between(a, b).abs() < 0.01, "{clockwise} {step}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn initial_heading_respected() {
        let helix = Helix::new(5.0, 300.0, true, 10.0, 1.0).unwrap();
        assert!((helix.heading(0.0) - 300.0).abs() < 1e-9);
        // clockwise turns lower the heading
        assert!((helix.heading(1.0) - 264.0).abs() < 1e-9);
    }

    #[test]
    fn radius_is_constant() {
        let helix = Helix::new(12.0, 0.0, false, 16.0, 2.0).unwrap();
        let (x, y, _) = helix.curves();
        for step in 0..32 {
            let t = f64::from(step) * 0.5;
            let d = x.evaluate(t).unwrap().hypot(y.evaluate(t).unwrap());
            assert!((d - 12.0).abs() < 1e-9);
        }
        assert_eq!(helix.num_time_steps(), 32);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(Helix::new(0.0, 0.0, false, 16.0, 1.0).is_err());
        assert!(Helix::new(5.0, 0.0, false, 16.0, 0.0).is_err());
        assert!(Helix::new(5.0, 0.0, false, -3.0, 1.0).is_err());
    }

    #[test]
    fn slope_from_displacement() {
        let slope = Helix::slope_for_displacement(10.0, 20.0 * std::f64::consts::PI);
        assert!((slope - 45.0).abs() < 1e-9);
        assert!(Helix::slope_for_displacement(10.0, 0.0).abs() < 1e-12);
    }
}
