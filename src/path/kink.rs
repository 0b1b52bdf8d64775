//! Replacing sharp corners with circular arcs.

use std::sync::Arc;

use tracing::{info, warn};

use crate::curve::{splice, splice_unshifted, Curve, CurveRef, TimeMap};
use crate::error::{NumericalError, Result};
use crate::math::{normalize_degrees, signed_degrees_between, TOLERANCE};
use crate::shapes::Helix;

/// A sharp turn between two curve times.
///
/// Without a radius, the arc is sized so that it ends exactly where the
/// original path was at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinkInterval {
    pub start: f64,
    pub end: f64,
    pub radius: Option<f64>,
}

impl KinkInterval {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            radius: None,
        }
    }

    /// Uses a fixed arc radius instead of fitting the chord.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// Splices a circular arc over every kink interval.
///
/// The arc starts on the heading the path has at the start of the interval and
/// turns the short way round to the heading at its end.
pub struct ReplaceKinks<'a> {
    x: CurveRef,
    y: CurveRef,
    rotation: CurveRef,
    times: &'a TimeMap,
    kinks: &'a [KinkInterval],
}

impl<'a> ReplaceKinks<'a> {
    /// Creates a new kink replacement.
    #[must_use]
    pub fn new(
        x: CurveRef,
        y: CurveRef,
        rotation: CurveRef,
        times: &'a TimeMap,
        kinks: &'a [KinkInterval],
    ) -> Self {
        Self {
            x,
            y,
            rotation,
            times,
            kinks,
        }
    }

    /// Executes the replacement, returning the new x, y and heading curves.
    ///
    /// # Errors
    ///
    /// Returns [`NumericalError::StraightKink`] when an interval starts and ends
    /// on the same heading, or any error from building or splicing the arc.
    pub fn execute(&self) -> Result<(CurveRef, CurveRef, CurveRef)> {
        let mut x = Arc::clone(&self.x);
        let mut y = Arc::clone(&self.y);
        let mut rotation = Arc::clone(&self.rotation);

        for kink in self.kinks {
            let a = self.times.step_for(kink.start);
            let b = self.times.step_for(kink.end);
            let (start, end) = if b < a { (b, a) } else { (a, b) };
            if start == end {
                warn!(start = kink.start, end = kink.end, "kink covers no time steps");
                continue;
            }
            let (t0, t1) = (as_time(start), as_time(end));

            let heading_start = normalize_degrees(rotation.evaluate(t0)?);
            let heading_end = normalize_degrees(rotation.evaluate(t1)?);
            let turn = signed_degrees_between(heading_start, heading_end);
            if turn.abs() < TOLERANCE {
                return Err(NumericalError::StraightKink {
                    start: kink.start,
                    end: kink.end,
                }
                .into());
            }
            let clockwise = turn < 0.0;

            let radius = match kink.radius {
                Some(radius) => radius,
                None => {
                    let chord = (x.evaluate(t1)? - x.evaluate(t0)?).hypot(y.evaluate(t1)? - y.evaluate(t0)?);
                    (chord / 2.0) / (turn.abs() / 2.0).to_radians().sin()
                }
            };
            let rotations = turn.abs() / 360.0;
            let helix = Helix::new(radius, heading_start, clockwise, (t1 - t0) / rotations, rotations)?;
            info!(
                start_step = start,
                end_step = end,
                heading_start,
                heading_end,
                clockwise,
                radius,
                "replacing kink with arc"
            );

            let (arc_x, arc_y, arc_rotation) = helix.curves();
            x = splice(x, arc_x, t0, t1)?;
            y = splice(y, arc_y, t0, t1)?;
            rotation = splice_unshifted(rotation, arc_rotation, t0, t1);
        }
        Ok((x, y, rotation))
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_time(step: usize) -> f64 {
    step as f64
}
