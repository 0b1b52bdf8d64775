//! Radial softening of a centerline.
//!
//! Every method reduces to one contract, `factor(length) -> multiplier`, where
//! `length` is the distance of a point from the origin. Multiplying both x and y
//! by the factor moves the point radially without changing its direction.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::math::TOLERANCE;

use super::{Curve, CurveRef};

/// Selects and parameterizes a radial regularization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regularization {
    /// `1 / (strength * max(0, length - radius) + 1)`. The y coordinate uses
    /// `strength + y_strength`, which flattens long vertical lobes.
    InverseQuadratic {
        strength: f64,
        radius: f64,
        y_strength: f64,
    },
    /// Identity below `cap / sqrt(2)`, a circular blend, then a hard cap at `cap`.
    CappedLinear { cap: f64 },
    /// Output length follows `0.5 (s (x - xt) + sqrt(yt^2 + s^2 (x - xt)^2)) + yt`,
    /// a hyperbola that is flat far left and has slope `s` far right.
    Hyperbolic { x_trans: f64, y_trans: f64, slope: f64 },
    /// Output length follows a sigmoid `ys / (1 + exp(-(x - xt) / xs)) + yt`.
    Logistic {
        x_trans: f64,
        y_trans: f64,
        x_scale: f64,
        y_scale: f64,
    },
}

impl Regularization {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for negative strengths or non-positive scales.
    pub fn validate(&self) -> Result<()> {
        let bad = |name: &'static str, reason: &str| -> Result<()> {
            Err(ConfigError::InvalidParameter {
                name,
                reason: reason.to_owned(),
            }
            .into())
        };
        match *self {
            Self::InverseQuadratic {
                strength,
                radius,
                y_strength,
            } => {
                if strength < 0.0 {
                    return bad("regularization", "strength must not be negative");
                }
                if strength + y_strength < 0.0 {
                    return bad("y_regularization", "combined y strength must not be negative");
                }
                if radius < 0.0 {
                    return bad("regularization_radius", "radius must not be negative");
                }
            }
            Self::CappedLinear { cap } => {
                if cap <= 0.0 {
                    return bad("regularization_cap", "cap must be positive");
                }
            }
            Self::Hyperbolic { slope, .. } => {
                if slope <= 0.0 {
                    return bad("regularization_slope", "slope must be positive");
                }
            }
            Self::Logistic { x_scale, .. } => {
                if x_scale <= 0.0 {
                    return bad("regularization_x_scale", "scale must be positive");
                }
            }
        }
        Ok(())
    }

    /// Multiplier for a point at distance `length` from the origin.
    #[must_use]
    pub fn factor(&self, length: f64) -> f64 {
        match *self {
            Self::InverseQuadratic {
                strength, radius, ..
            } => inverse_quadratic_factor(strength, radius, length),
            Self::CappedLinear { cap } => capped_linear_factor(cap, length),
            Self::Hyperbolic {
                x_trans,
                y_trans,
                slope,
            } => {
                let u = length - x_trans;
                let y = 0.5 * (slope * u + (y_trans * y_trans + slope * slope * u * u).sqrt())
                    + y_trans;
                ratio(y, length)
            }
            Self::Logistic {
                x_trans,
                y_trans,
                x_scale,
                y_scale,
            } => {
                let y = y_scale / (1.0 + (-(length - x_trans) / x_scale).exp()) + y_trans;
                ratio(y, length)
            }
        }
    }

    /// Wraps `x` and `y` so both are scaled by this regularization.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn apply(&self, x: &CurveRef, y: &CurveRef) -> Result<(CurveRef, CurveRef)> {
        self.validate()?;
        let reg_x: CurveRef = Arc::new(Regularized::new(
            Arc::clone(x),
            Arc::clone(y),
            *self,
            Axis::X,
        ));
        let reg_y: CurveRef = Arc::new(Regularized::new(
            Arc::clone(x),
            Arc::clone(y),
            *self,
            Axis::Y,
        ));
        Ok((reg_x, reg_y))
    }

    /// Multiplier applied to one coordinate. Only the inverse quadratic
    /// method treats the axes differently.
    #[must_use]
    pub fn axis_factor(&self, axis: Axis, length: f64) -> f64 {
        match (*self, axis) {
            (
                Self::InverseQuadratic {
                    strength,
                    radius,
                    y_strength,
                },
                Axis::Y,
            ) => inverse_quadratic_factor(strength + y_strength, radius, length),
            _ => self.factor(length),
        }
    }
}

fn inverse_quadratic_factor(strength: f64, radius: f64, length: f64) -> f64 {
    1.0 / (strength * (length - radius).max(0.0) + 1.0)
}

/// Factor that turns an input length into an output length `y`.
fn ratio(y: f64, length: f64) -> f64 {
    if length.abs() < TOLERANCE {
        1.0
    } else {
        y / length
    }
}

fn capped_linear_factor(cap: f64, length: f64) -> f64 {
    let knee = cap / std::f64::consts::SQRT_2;
    let flat = cap * std::f64::consts::SQRT_2;
    if length <= knee {
        1.0
    } else if length >= flat {
        cap / length
    } else {
        // circle of radius `cap` centred at (flat, 0), tangent to y = x at the knee
        let dx = flat - length;
        (cap * cap - dx * dx).sqrt() / length
    }
}

impl fmt::Display for Regularization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::InverseQuadratic {
                strength,
                radius,
                y_strength,
            } => {
                write!(
                    f,
                    "Inverse quadratic regularization: factor = 1 / ({strength:?} max(0, x - {radius:?}) + 1)"
                )?;
                if y_strength.abs() > 0.0 {
                    write!(f, ", y strength {:?}", strength + y_strength)?;
                }
                Ok(())
            }
            Self::CappedLinear { cap } => {
                write!(f, "Capped linear regularization: cap at {cap:?}")
            }
            Self::Hyperbolic {
                x_trans,
                y_trans,
                slope,
            } => write!(
                f,
                "Hyperbolic regularization: y = 0.5 ({slope:?} (x - {x_trans:?}) + ({:?} + {:?} (x - {x_trans:?})^{{2}})^{{0.5}}) + {y_trans:?}",
                y_trans * y_trans,
                slope * slope,
            ),
            Self::Logistic {
                x_trans,
                y_trans,
                x_scale,
                y_scale,
            } => write!(
                f,
                "Logistic regularization: y = {y_scale:?} / (1 + e^{{-(x - {x_trans:?}) / {x_scale:?}}}) + {y_trans:?}"
            ),
        }
    }
}

/// Which coordinate a [`Regularized`] curve produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// One coordinate of a regularized centerline.
pub struct Regularized {
    x: CurveRef,
    y: CurveRef,
    method: Regularization,
    axis: Axis,
}

impl Regularized {
    /// Creates the regularized view of one coordinate.
    #[must_use]
    pub fn new(x: CurveRef, y: CurveRef, method: Regularization, axis: Axis) -> Self {
        Self { x, y, method, axis }
    }
}

impl Curve for Regularized {
    fn evaluate(&self, t: f64) -> Result<f64> {
        let x = self.x.evaluate(t)?;
        let y = self.y.evaluate(t)?;
        let factor = self.method.axis_factor(self.axis, x.hypot(y));
        Ok(match self.axis {
            Axis::X => x * factor,
            Axis::Y => y * factor,
        })
    }
}
