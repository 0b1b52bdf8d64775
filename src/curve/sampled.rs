use crate::error::{DomainError, Result};
use crate::math::TOLERANCE;

use super::{Curve, CurveDomain};

/// A curve stored as one value per integer time step.
///
/// Fractional steps interpolate linearly between neighbours. Evaluating
/// outside `[0, N]` is a domain error.
#[derive(Debug, Clone)]
pub struct SampledCurve {
    values: Vec<f64>,
}

impl SampledCurve {
    /// Creates a curve from per-step values. `values[i]` is the value at step `i`.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Returns the per-step values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the valid domain `[0, N]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, self.values.len().saturating_sub(1) as f64)
    }
}

impl Curve for SampledCurve {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn evaluate(&self, t: f64) -> Result<f64> {
        let domain = self.domain();
        if self.values.is_empty() || t < domain.t_min - TOLERANCE || t > domain.t_max + TOLERANCE {
            return Err(DomainError::OutOfRange {
                t,
                min: domain.t_min,
                max: domain.t_max,
            }
            .into());
        }
        let t = t.clamp(domain.t_min, domain.t_max);
        let lower = t.floor() as usize;
        let frac = t - t.floor();
        if frac < TOLERANCE || lower + 1 >= self.values.len() {
            return Ok(self.values[lower]);
        }
        let a = self.values[lower];
        let b = self.values[lower + 1];
        Ok(a + (b - a) * frac)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MarbleError;

    #[test]
    fn exact_steps_return_samples() {
        let c = SampledCurve::new(vec![0.0, -1.0, -3.0]);
        assert!((c.evaluate(1.0).unwrap() + 1.0).abs() < TOLERANCE);
        assert!((c.evaluate(2.0).unwrap() + 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn fractional_steps_interpolate() {
        let c = SampledCurve::new(vec![0.0, -1.0, -3.0]);
        assert!((c.evaluate(1.5).unwrap() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn outside_domain_is_range_error() {
        let c = SampledCurve::new(vec![0.0, 1.0]);
        assert!(matches!(
            c.evaluate(1.5),
            Err(MarbleError::Domain(DomainError::OutOfRange { .. }))
        ));
        assert!(c.evaluate(-0.5).is_err());
    }
}
