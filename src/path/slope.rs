use std::sync::Arc;

use tracing::debug;

use crate::curve::{CurveRef, SampledCurve, TimeMap};
use crate::error::{ConfigError, DomainError, Result};

/// How a blended slope combines with the slope already in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendPolicy {
    /// Keep the steeper of the two; used to add clearance.
    Max,
    /// Keep the gentler of the two; used to soften corners.
    Min,
}

/// Per-time-step slope angles in degrees, one per step `0..=N`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeProfile {
    base: f64,
    angles: Vec<f64>,
}

impl SlopeProfile {
    /// A profile with the same slope at every step.
    #[must_use]
    pub fn constant(base: f64, num_time_steps: usize) -> Self {
        Self {
            base,
            angles: vec![base; num_time_steps + 1],
        }
    }

    /// The slope the profile started from.
    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    /// All slope angles.
    #[must_use]
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Number of time steps `N`.
    #[must_use]
    pub fn num_time_steps(&self) -> usize {
        self.angles.len().saturating_sub(1)
    }

    /// Blends `target` into steps `start..=end`.
    ///
    /// The new slope ramps linearly from the base slope to `target` over the
    /// first `sharpness` fraction of the window, holds, and ramps back over the
    /// last `sharpness` fraction. Each step keeps the max or min of the old and
    /// new value depending on `policy`.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the window leaves the profile or is reversed.
    #[allow(clippy::cast_precision_loss)]
    pub fn blend(
        &mut self,
        start: usize,
        end: usize,
        target: f64,
        sharpness: f64,
        policy: BlendPolicy,
    ) -> Result<()> {
        if end < start || end > self.num_time_steps() {
            return Err(DomainError::EmptyInterval { start, end }.into());
        }
        let width = (end - start) as f64;
        for k in 0..=(end - start) {
            let kf = k as f64;
            let weight = if kf < width * sharpness {
                kf / (width * sharpness)
            } else if kf > width * (1.0 - sharpness) {
                (width - kf) / (width * sharpness)
            } else {
                1.0
            };
            let blended = self.base + (target - self.base) * weight;
            let slot = &mut self.angles[start + k];
            *slot = match policy {
                BlendPolicy::Max => slot.max(blended),
                BlendPolicy::Min => slot.min(blended),
            };
        }
        Ok(())
    }

    /// The profile as a curve over time steps.
    #[must_use]
    pub fn as_curve(&self) -> CurveRef {
        Arc::new(SampledCurve::new(self.angles.clone()))
    }
}

/// Gentler slope around sharp corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinkSlope {
    /// Half-width of the softened window, in curve time.
    pub width: f64,
    /// Slope used at the centre of the window, in degrees.
    pub slope: f64,
    /// Fraction of the window spent ramping at each end, in `[0, 0.5]`.
    pub sharpness: f64,
}

impl Default for KinkSlope {
    fn default() -> Self {
        Self {
            width: 0.1,
            slope: 0.5,
            sharpness: 0.2,
        }
    }
}

impl KinkSlope {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the sharpness is outside `[0, 0.5]` or
    /// the width is negative.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=0.5).contains(&self.sharpness) {
            return Err(ConfigError::InvalidParameter {
                name: "kink_sharpness",
                reason: format!("must be between 0 and 0.5, got {}", self.sharpness),
            }
            .into());
        }
        if self.width < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "kink_width",
                reason: format!("must not be negative, got {}", self.width),
            }
            .into());
        }
        Ok(())
    }

    /// Softens the slope around curve time `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the time map does not
    /// match the profile.
    pub fn apply(&self, profile: &mut SlopeProfile, times: &TimeMap, t: f64) -> Result<()> {
        self.validate()?;
        let a = times.step_for(t - self.width);
        let b = times.step_for(t + self.width);
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        debug!(t, start, end, slope = self.slope, "softening slope around kink");
        profile.blend(start, end, self.slope, self.sharpness, BlendPolicy::Min)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blend_ramps_and_holds() {
        let mut p = SlopeProfile::constant(2.0, 20);
        p.blend(5, 15, 12.0, 0.2, BlendPolicy::Max).unwrap();
        let a = p.angles();
        // untouched outside the window
        assert!((a[4] - 2.0).abs() < 1e-12);
        assert!((a[16] - 2.0).abs() < 1e-12);
        // ramp over the first two steps
        assert!((a[5] - 2.0).abs() < 1e-12);
        assert!((a[6] - 7.0).abs() < 1e-12);
        // plateau
        for &s in &a[7..=13] {
            assert!((s - 12.0).abs() < 1e-12);
        }
        // ramp back
        assert!((a[14] - 7.0).abs() < 1e-12);
        assert!((a[15] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn max_policy_never_flattens() {
        let mut p = SlopeProfile::constant(5.0, 10);
        p.blend(0, 10, 20.0, 0.2, BlendPolicy::Max).unwrap();
        p.blend(0, 10, 1.0, 0.2, BlendPolicy::Max).unwrap();
        assert!(p.angles().iter().all(|&s| s >= 5.0));
        assert!((p.angles()[5] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn min_policy_never_steepens() {
        let mut p = SlopeProfile::constant(5.0, 10);
        p.blend(2, 8, 0.5, 0.2, BlendPolicy::Min).unwrap();
        p.blend(2, 8, 30.0, 0.2, BlendPolicy::Min).unwrap();
        assert!(p.angles().iter().all(|&s| s <= 5.0));
        assert!((p.angles()[5] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn blend_outside_profile_rejected() {
        let mut p = SlopeProfile::constant(5.0, 10);
        assert!(p.blend(4, 11, 1.0, 0.2, BlendPolicy::Min).is_err());
        assert!(p.blend(6, 4, 1.0, 0.2, BlendPolicy::Min).is_err());
    }

    #[test]
    fn kink_slope_uses_curve_time() {
        let times = TimeMap::linear(-1.0, 1.0, 20).unwrap();
        let mut p = SlopeProfile::constant(4.0, 20);
        let kink = KinkSlope {
            width: 0.3,
            ..KinkSlope::default()
        };
        kink.apply(&mut p, &times, 0.0).unwrap();
        // t = 0 is step 10; the window spans about three steps either side
        assert!((p.angles()[10] - 0.5).abs() < 1e-12);
        assert!((p.angles()[6] - 4.0).abs() < 1e-12);
        assert!((p.angles()[14] - 4.0).abs() < 1e-12);
        assert!(p.angles()[8] < 4.0);
    }

    #[test]
    fn kink_sharpness_validated() {
        let kink = KinkSlope {
            sharpness: 0.7,
            ..KinkSlope::default()
        };
        assert!(kink.validate().is_err());
        assert!(KinkSlope::default().validate().is_ok());
    }
}
