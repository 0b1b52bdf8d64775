//! Steepening the slope where two strands of the path cross.
//!
//! An overlap interval names a stretch of the path that passes over or under
//! another stretch. The resolver finds the gentlest slope that still drops the
//! path by the required separation across that stretch, then blends it into
//! the slope profile without flattening anything already steeper.

use tracing::{debug, info};

use crate::curve::TimeMap;
use crate::error::{DomainError, NumericalError, Result};
use crate::math::radians;

use super::slope::{BlendPolicy, SlopeProfile};

/// Steepest slope the resolver will use, in degrees.
pub const MAX_OVERLAP_SLOPE: f64 = 45.0;

/// Angle tolerance of the binary search, in degrees.
pub const OVERLAP_ANGLE_TOLERANCE: f64 = 0.01;

/// Fraction of the interval used for each ramp.
pub const OVERLAP_SHARPNESS: f64 = 0.2;

/// A stretch of the path, in curve time, that must drop by `separation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapInterval {
    pub start: f64,
    pub end: f64,
    pub separation: f64,
}

impl OverlapInterval {
    #[must_use]
    pub fn new(start: f64, end: f64, separation: f64) -> Self {
        Self {
            start,
            end,
            separation,
        }
    }

    /// The interval as ordered time steps.
    #[must_use]
    pub fn steps(&self, times: &TimeMap) -> (usize, usize) {
        let a = times.step_for(self.start);
        let b = times.step_for(self.end);
        if b < a {
            (b, a)
        } else {
            (a, b)
        }
    }
}

/// Total drop over steps `start..end` when the slope ramps from `base` to
/// `angle` and back, with the same window shape [`SlopeProfile::blend`] uses.
///
/// `end` must index into `arclengths`; [`ResolveOverlaps`] checks this.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn get_drop(arclengths: &[f64], base: f64, angle: f64, start: usize, end: usize) -> f64 {
    let width = end.saturating_sub(start) as f64;
    let ramp = width * OVERLAP_SHARPNESS;
    let mut drop = 0.0;
    for k in 0..end.saturating_sub(start) {
        let kf = k as f64;
        let weight = if kf < ramp {
            kf / ramp
        } else if kf > width - ramp {
            (width - kf) / ramp
        } else {
            1.0
        };
        let slope = base + (angle - base) * weight;
        let length = arclengths[start + k + 1] - arclengths[start + k];
        drop += length * radians(slope).tan();
    }
    drop
}

/// Finds the smallest peak slope that drops `separation` over `start..end`.
///
/// Returns `None` when the base slope alone already drops far enough.
///
/// # Errors
///
/// Returns [`NumericalError::UnreachableSeparation`] if even a 45° peak is not
/// steep enough.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn get_drop_angle(
    arclengths: &[f64],
    base: f64,
    start: usize,
    end: usize,
    separation: f64,
) -> Result<Option<f64>> {
    if get_drop(arclengths, base, base, start, end) >= separation {
        return Ok(None);
    }
    if get_drop(arclengths, base, MAX_OVERLAP_SLOPE, start, end) < separation {
        return Err(NumericalError::UnreachableSeparation {
            start: start as f64,
            end: end as f64,
            separation,
        }
        .into());
    }

    let mut lo = base;
    let mut hi = MAX_OVERLAP_SLOPE;
    while hi - lo > OVERLAP_ANGLE_TOLERANCE {
        let mid = (lo + hi) / 2.0;
        if get_drop(arclengths, base, mid, start, end) < separation {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(Some(hi))
}

/// Raises the slope profile so every overlap interval drops far enough.
pub struct ResolveOverlaps<'a> {
    arclengths: &'a [f64],
    times: &'a TimeMap,
    intervals: &'a [OverlapInterval],
}

impl<'a> ResolveOverlaps<'a> {
    /// Creates a new overlap resolution.
    #[must_use]
    pub fn new(arclengths: &'a [f64], times: &'a TimeMap, intervals: &'a [OverlapInterval]) -> Self {
        Self {
            arclengths,
            times,
            intervals,
        }
    }

    /// Executes the resolution, returning the peak angle used for each interval
    /// (`None` where nothing had to change).
    ///
    /// # Errors
    ///
    /// Returns an error if an interval is empty or its separation cannot be
    /// reached at 45°.
    pub fn execute(&self, profile: &mut SlopeProfile) -> Result<Vec<Option<f64>>> {
        self.intervals
            .iter()
            .map(|interval| self.resolve_one(profile, interval))
            .collect()
    }

    fn resolve_one(&self, profile: &mut SlopeProfile, interval: &OverlapInterval) -> Result<Option<f64>> {
        let (start, end) = interval.steps(self.times);
        if start == end || end >= self.arclengths.len() {
            return Err(DomainError::EmptyInterval { start, end }.into());
        }
        let base = profile.base();
        let angle = get_drop_angle(self.arclengths, base, start, end, interval.separation)?;
        match angle {
            Some(angle) => {
                info!(
                    start = interval.start,
                    end = interval.end,
                    start_step = start,
                    end_step = end,
                    angle,
                    "steepened overlap"
                );
                profile.blend(start, end, angle, OVERLAP_SHARPNESS, BlendPolicy::Max)?;
            }
            None => debug!(
                start = interval.start,
                end = interval.end,
                "overlap already has enough drop"
            ),
        }
        Ok(angle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MarbleError;
    use crate::path::arclength::height_profile;

    #[allow(clippy::cast_precision_loss)]
    fn straight(n: usize) -> Vec<f64> {
        (0..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn flat_drop_is_tangent_times_length() {
        let arcs = straight(50);
        let drop = get_drop(&arcs, 10.0, 10.0, 10, 30);
        assert!((drop - 20.0 * 10.0_f64.to_radians().tan()).abs() < 1e-9);
    }

    #[test]
    fn drop_grows_with_angle() {
        let arcs = straight(50);
        let a = get_drop(&arcs, 2.0, 10.0, 0, 40);
        let b = get_drop(&arcs, 2.0, 20.0, 0, 40);
        assert!(b > a);
    }

    #[test]
    fn no_change_when_base_is_enough() {
        let arcs = straight(100);
        assert!(get_drop_angle(&arcs, 10.0, 0, 100, 5.0).unwrap().is_none());
    }

    #[test]
    fn unreachable_separation_errors() {
        let arcs = straight(10);
        assert!(matches!(
            get_drop_angle(&arcs, 1.0, 0, 10, 100.0),
            Err(MarbleError::Numerical(NumericalError::UnreachableSeparation { .. }))
        ));
    }

    #[test]
    fn resolved_profile_meets_clearance() {
        let n = 100;
        let arcs = straight(n);
        let times = TimeMap::identity(n);
        let intervals = [OverlapInterval::new(20.0, 60.0, 15.0)];
        let mut profile = SlopeProfile::constant(2.0, n);
        let angles = ResolveOverlaps::new(&arcs, &times, &intervals)
            .execute(&mut profile)
            .unwrap();
        let angle = angles[0].unwrap();
        assert!(angle > 2.0 && angle <= MAX_OVERLAP_SLOPE);

        let z = height_profile(&arcs, profile.angles()).unwrap();
        assert!(z[20] - z[60] >= 15.0 - 1e-9, "drop {}", z[20] - z[60]);
        // the search is tight: one tolerance gentler would not do
        let slacker = get_drop(&arcs, 2.0, angle - 2.0 * OVERLAP_ANGLE_TOLERANCE, 20, 60);
        assert!(slacker < 15.0);
        // outside the interval the base slope is untouched
        assert!((profile.angles()[10] - 2.0).abs() < 1e-12);
        assert!((profile.angles()[70] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_interval_is_ordered() {
        let times = TimeMap::identity(30);
        let interval = OverlapInterval::new(25.0, 5.0, 1.0);
        assert_eq!(interval.steps(&times), (5, 25));
    }

    #[test]
    fn empty_interval_rejected() {
        let arcs = straight(30);
        let times = TimeMap::identity(30);
        let intervals = [OverlapInterval::new(4.2, 4.7, 1.0)];
        let mut profile = SlopeProfile::constant(2.0, 30);
        assert!(ResolveOverlaps::new(&arcs, &times, &intervals)
            .execute(&mut profile)
            .is_err());
    }

    #[test]
    fn interval_past_the_arclengths_is_a_domain_error() {
        let arcs = straight(10);
        let times = TimeMap::identity(30);
        let intervals = [OverlapInterval::new(2.0, 25.0, 1.0)];
        let mut profile = SlopeProfile::constant(2.0, 10);
        assert!(matches!(
            ResolveOverlaps::new(&arcs, &times, &intervals).execute(&mut profile),
            Err(MarbleError::Domain(DomainError::EmptyInterval { start: 2, end: 25 }))
        ));
    }
}
