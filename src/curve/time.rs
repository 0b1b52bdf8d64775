//! Mapping between integer time steps and the underlying curve parameter.

use std::sync::Arc;

use crate::error::{ConfigError, DomainError, NumericalError, Result};
use crate::math::TOLERANCE;

use super::{Curve, CurveRef};

/// The curve parameter `t` at each time step `0..=N`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMap {
    times: Vec<f64>,
}

impl TimeMap {
    /// Evenly spaced times from `start_t` to `end_t` over `num_time_steps` steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_time_steps` is zero or the range is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn linear(start_t: f64, end_t: f64, num_time_steps: usize) -> Result<Self> {
        if num_time_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_time_steps",
                reason: "must be positive".into(),
            }
            .into());
        }
        if (end_t - start_t).abs() < TOLERANCE {
            return Err(ConfigError::InvalidParameter {
                name: "end_t",
                reason: format!("time range [{start_t}, {end_t}] is empty"),
            }
            .into());
        }
        let n = num_time_steps as f64;
        let times = (0..=num_time_steps)
            .map(|step| start_t + step as f64 * (end_t - start_t) / n)
            .collect();
        Ok(Self { times })
    }

    /// The map where time equals the step index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn identity(num_time_steps: usize) -> Self {
        Self {
            times: (0..=num_time_steps).map(|step| step as f64).collect(),
        }
    }

    /// Number of time steps `N`.
    #[must_use]
    pub fn num_time_steps(&self) -> usize {
        self.times.len().saturating_sub(1)
    }

    /// The curve time at an integer step.
    #[must_use]
    pub fn time(&self, step: usize) -> f64 {
        self.times[step.min(self.num_time_steps())]
    }

    /// The curve time at a fractional step, interpolated linearly.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn time_at(&self, step: f64) -> f64 {
        let last = self.num_time_steps();
        let clamped = step.clamp(0.0, last as f64);
        let lower = (clamped.floor() as usize).min(last);
        if lower == last {
            return self.times[last];
        }
        let frac = clamped - lower as f64;
        self.times[lower] + (self.times[lower + 1] - self.times[lower]) * frac
    }

    /// The step whose time is the last one not after `t`, clamped to the domain.
    ///
    /// Works for both increasing and decreasing time maps.
    #[must_use]
    pub fn step_for(&self, t: f64) -> usize {
        let last = self.num_time_steps();
        let increasing = self.times[last] >= self.times[0];
        let reached = |time: f64| if increasing { time <= t } else { time >= t };
        let count = self.times.partition_point(|&time| reached(time));
        count.saturating_sub(1).min(last)
    }

    /// Adds `before` steps ahead of step 0 and `after` steps past step `N`,
    /// continuing the spacing of the first and last step.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn extended(&self, before: usize, after: usize) -> Self {
        let last = self.num_time_steps();
        let head = if last == 0 { 0.0 } else { self.times[1] - self.times[0] };
        let tail = if last == 0 { 0.0 } else { self.times[last] - self.times[last - 1] };
        let first = self.times[0];
        let end = self.times[last];

        let mut times = Vec::with_capacity(self.times.len() + before + after);
        times.extend((1..=before).rev().map(|k| first - head * k as f64));
        times.extend_from_slice(&self.times);
        times.extend((1..=after).map(|k| end + tail * k as f64));
        Self { times }
    }

    /// Applies a tick remapping: step `k` of the result has the time of
    /// fractional step `ticks.map(k)` of `self`.
    #[must_use]
    pub fn remapped(&self, ticks: &TickMap) -> Self {
        Self {
            times: ticks.ticks.iter().map(|&tick| self.time_at(tick)).collect(),
        }
    }
}

/// Fractional original step for each rebalanced step.
#[derive(Debug, Clone)]
pub struct TickMap {
    ticks: Vec<f64>,
}

impl TickMap {
    /// Maps a (possibly fractional) rebalanced step to an original step.
    ///
    /// Up to one step of linear extrapolation is allowed on either side so that
    /// numerical derivatives work at the ends.
    ///
    /// # Errors
    ///
    /// Returns a domain error outside `[-1, N + 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn map(&self, t: f64) -> Result<f64> {
        let n = self.ticks.len() - 1;
        let nf = n as f64;
        if t < -1.0 || t > nf + 1.0 {
            return Err(DomainError::OutOfRange {
                t,
                min: -1.0,
                max: nf + 1.0,
            }
            .into());
        }
        if t < 0.0 {
            return Ok(self.ticks[0] + (self.ticks[1] - self.ticks[0]) * t);
        }
        if t > nf {
            return Ok(self.ticks[n] + (self.ticks[n] - self.ticks[n - 1]) * (t - nf));
        }
        let segment = (t.floor() as usize).min(n);
        let remainder = t - segment as f64;
        if remainder < TOLERANCE || segment == n {
            Ok(self.ticks[segment])
        } else {
            Ok(self.ticks[segment] + (self.ticks[segment + 1] - self.ticks[segment]) * remainder)
        }
    }

    /// The original step for each rebalanced step.
    #[must_use]
    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }
}

/// A curve evaluated through a [`TickMap`].
pub struct Reparameterized {
    base: CurveRef,
    ticks: Arc<TickMap>,
}

impl Curve for Reparameterized {
    fn evaluate(&self, t: f64) -> Result<f64> {
        self.base.evaluate(self.ticks.map(t)?)
    }
}

/// Remaps time so that every step covers roughly the same chord length.
///
/// Returns the remapped x and y curves along with the tick map used.
///
/// # Errors
///
/// Returns an error if the curves fail to evaluate, `num_time_steps` is zero, or
/// the path has no length.
#[allow(clippy::cast_precision_loss)]
pub fn rebalance_time(
    x: &CurveRef,
    y: &CurveRef,
    num_time_steps: usize,
) -> Result<(CurveRef, CurveRef, Arc<TickMap>)> {
    if num_time_steps == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "num_time_steps",
            reason: "must be positive".into(),
        }
        .into());
    }

    let mut cumulative = Vec::with_capacity(num_time_steps + 1);
    cumulative.push(0.0);
    let mut prev = (x.evaluate(0.0)?, y.evaluate(0.0)?);
    for step in 1..=num_time_steps {
        let t = step as f64;
        let next = (x.evaluate(t)?, y.evaluate(t)?);
        let chord = (next.0 - prev.0).hypot(next.1 - prev.1);
        let total = cumulative.last().copied().unwrap_or(0.0) + chord;
        cumulative.push(total);
        prev = next;
    }

    let total = cumulative[num_time_steps];
    if total < TOLERANCE {
        return Err(NumericalError::Degenerate("cannot rebalance a path with no length".into()).into());
    }
    let per_tick = total / num_time_steps as f64;

    let mut ticks = Vec::with_capacity(num_time_steps + 1);
    ticks.push(0.0);
    for k in 1..num_time_steps {
        let target = per_tick * k as f64;
        // first segment whose end reaches the target
        let end = cumulative.partition_point(|&len| len < target).clamp(1, num_time_steps);
        let start = end - 1;
        let seg = cumulative[end] - cumulative[start];
        let frac = if seg < TOLERANCE {
            0.0
        } else {
            (target - cumulative[start]) / seg
        };
        ticks.push(start as f64 + frac);
    }
    ticks.push(num_time_steps as f64);

    let ticks = Arc::new(TickMap { ticks });
    let new_x: CurveRef = Arc::new(Reparameterized {
        base: Arc::clone(x),
        ticks: Arc::clone(&ticks),
    });
    let new_y: CurveRef = Arc::new(Reparameterized {
        base: Arc::clone(y),
        ticks: Arc::clone(&ticks),
    });
    Ok((new_x, new_y, ticks))
}
