//! Straight run-in and run-out added past the ends of a path.

use std::sync::Arc;

use tracing::info;

use crate::curve::{CurveRef, Extend, Shift, TimeMap};
use crate::error::{ConfigError, Result};
use crate::math::TOLERANCE;

/// Extra curve time to build as a straight line before and after the path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extension {
    pub start: f64,
    pub end: f64,
}

impl Extension {
    /// Extends both ends by `extra` curve time.
    #[must_use]
    pub fn both(extra: f64) -> Self {
        Self {
            start: extra,
            end: extra,
        }
    }

    /// Combines the shared `extra_t` with the per-end settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `extra_t` and a per-end value are
    /// both given but differ, or when any value is negative.
    pub fn from_flags(extra_t: Option<f64>, extra_start_t: Option<f64>, extra_end_t: Option<f64>) -> Result<Self> {
        let pick = |name: &'static str, own: Option<f64>| -> Result<f64> {
            match (extra_t, own) {
                (Some(shared), Some(own)) if (shared - own).abs() > TOLERANCE => Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("{name} and extra_t both set, but do not agree ({own} vs {shared})"),
                }
                .into()),
                (Some(value), _) | (None, Some(value)) => Ok(value),
                (None, None) => Ok(0.0),
            }
        };
        let extension = Self {
            start: pick("extra_start_t", extra_start_t)?,
            end: pick("extra_end_t", extra_end_t)?,
        };
        if extension.start < 0.0 || extension.end < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "extra_t",
                reason: "extensions must not be negative".into(),
            }
            .into());
        }
        Ok(extension)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start <= 0.0 && self.end <= 0.0
    }

    /// Whole time steps needed to cover the extension at each end, using the
    /// spacing of the first and last step of `times`.
    #[must_use]
    pub fn steps(&self, times: &TimeMap) -> (usize, usize) {
        let last = times.num_time_steps();
        if last == 0 {
            return (0, 0);
        }
        let head = (times.time(1) - times.time(0)).abs();
        let tail = (times.time(last) - times.time(last - 1)).abs();
        (steps_covering(self.start, head), steps_covering(self.end, tail))
    }

    /// Continues `x` and `y` along their end tangents and widens `times` to
    /// match. The original step 0 moves to step `before`.
    ///
    /// # Errors
    ///
    /// Returns an error if either curve cannot be differentiated at its ends.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(&self, x: &CurveRef, y: &CurveRef, times: &TimeMap) -> Result<(CurveRef, CurveRef, TimeMap)> {
        let (before, after) = self.steps(times);
        let last = times.num_time_steps() as f64;
        let extend = |curve: &CurveRef| -> Result<CurveRef> {
            let lines: CurveRef = Arc::new(Extend::new(Arc::clone(curve), 0.0, last)?);
            Ok(Arc::new(Shift::new(lines, -(before as f64))))
        };
        info!(
            extra_start_t = self.start,
            extra_end_t = self.end,
            before,
            after,
            "extending path with straight lines"
        );
        Ok((extend(x)?, extend(y)?, times.extended(before, after)))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn steps_covering(extra: f64, per_step: f64) -> usize {
    if extra <= 0.0 || per_step < TOLERANCE {
        return 0;
    }
    (extra / per_step - TOLERANCE).ceil() as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::{Curve, FunctionCurve};
    use crate::error::MarbleError;

    #[test]
    fn shared_flag_fills_both_ends() {
        let extension = Extension::from_flags(Some(0.5), None, Some(0.5)).unwrap();
        assert_eq!(extension, Extension::both(0.5));
        let only_end = Extension::from_flags(None, None, Some(2.0)).unwrap();
        assert!(only_end.start.abs() < f64::EPSILON);
        assert!(Extension::from_flags(None, None, None).unwrap().is_empty());
    }

    #[test]
    fn disagreeing_flags_are_rejected() {
        for (start, end) in [(Some(1.0), None), (None, Some(0.25))] {
            assert!(matches!(
                Extension::from_flags(Some(0.5), start, end),
                Err(MarbleError::Config(ConfigError::InvalidParameter { .. }))
            ));
        }
        assert!(Extension::from_flags(None, Some(-1.0), None).is_err());
    }

    #[test]
    fn extension_rounds_up_to_whole_steps() {
        let times = TimeMap::linear(0.0, 2.0, 8).unwrap();
        let extension = Extension { start: 0.5, end: 0.6 };
        // each step covers 0.25 of curve time
        assert_eq!(extension.steps(&times), (2, 3));
    }

    #[test]
    fn parabola_continues_along_its_end_tangents() {
        let times = TimeMap::identity(4);
        let x = FunctionCurve::shared(|t| t * t);
        let y = FunctionCurve::shared(|t| t);
        let (ex, ey, extended) = Extension::both(2.0).apply(&x, &y, &times).unwrap();

        assert_eq!(extended.num_time_steps(), 8);
        // old step 0 is now step 2
        assert!((ex.evaluate(2.0).unwrap()).abs() < 1e-12);
        assert!((ey.evaluate(3.0).unwrap() - 1.0).abs() < 1e-12);
        // before the start the tangent of t^2 is flat
        assert!((ex.evaluate(0.0).unwrap()).abs() < 1e-6);
        assert!((ey.evaluate(0.0).unwrap() + 2.0).abs() < 1e-6);
        // after the end x follows 16 + 8 (t - 4)
        assert!((ex.evaluate(8.0).unwrap() - 32.0).abs() < 1e-5);
        assert!((extended.time(8) - 6.0).abs() < 1e-12);
    }
}
