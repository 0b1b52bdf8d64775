use std::sync::Arc;

use crate::curve::{derivative, Curve, CurveRef};
use crate::error::{NumericalError, Result};
use crate::math::normalize_degrees;

/// Heading of an (x, y) path in degrees, derived numerically.
///
/// 0° points along +y (north) and angles grow counterclockwise, so a path
/// heading along -x has heading 90°. The result lies in `[0, 360)`.
pub struct RotationCurve {
    x: CurveRef,
    y: CurveRef,
}

impl RotationCurve {
    /// Creates the heading curve of the path `(x, y)`.
    #[must_use]
    pub fn new(x: CurveRef, y: CurveRef) -> Self {
        Self { x, y }
    }

    /// Creates the heading curve as a shared [`CurveRef`].
    #[must_use]
    pub fn shared(x: &CurveRef, y: &CurveRef) -> CurveRef {
        Arc::new(Self::new(Arc::clone(x), Arc::clone(y)))
    }
}

impl Curve for RotationCurve {
    #[allow(clippy::float_cmp)]
    fn evaluate(&self, t: f64) -> Result<f64> {
        let dx = derivative(self.x.as_ref(), t)?;
        let dy = derivative(self.y.as_ref(), t)?;
        if dx == 0.0 && dy == 0.0 {
            return Err(NumericalError::ZeroDerivative { t }.into());
        }
        Ok(heading_degrees(dx, dy))
    }
}

/// Heading in degrees of the direction `(dx, dy)`.
#[must_use]
pub fn heading_degrees(dx: f64, dy: f64) -> f64 {
    normalize_degrees((-dx).atan2(dy).to_degrees())
}
