use crate::curve::{Curve, SampledCurve};
use crate::error::{ConfigError, Result};
use crate::math::radians;

use super::slope::SlopeProfile;

/// Micro-steps per unit time step used when integrating path length.
pub const ARCLENGTH_SUBDIVISIONS: u32 = 1000;

/// Integrates the (x, y) path length between two time steps.
///
/// # Errors
///
/// Returns an error if either curve fails to evaluate in `[start, end]`.
pub fn segment_arclength(x: &dyn Curve, y: &dyn Curve, start: usize, end: usize) -> Result<f64> {
    let mut total = 0.0;
    let mut prev = (x.evaluate(as_time(start))?, y.evaluate(as_time(start))?);
    for step in start..end {
        for j in 1..=ARCLENGTH_SUBDIVISIONS {
            let t = as_time(step) + f64::from(j) / f64::from(ARCLENGTH_SUBDIVISIONS);
            let next = (x.evaluate(t)?, y.evaluate(t)?);
            total += (next.0 - prev.0).hypot(next.1 - prev.1);
            prev = next;
        }
    }
    Ok(total)
}

/// Cumulative path length at every time step `0..=num_time_steps`.
///
/// # Errors
///
/// Returns an error if either curve fails to evaluate on `[0, num_time_steps]`.
pub fn calculate_arclengths(x: &dyn Curve, y: &dyn Curve, num_time_steps: usize) -> Result<Vec<f64>> {
    let mut arclengths = Vec::with_capacity(num_time_steps + 1);
    arclengths.push(0.0);
    let mut total = 0.0;
    for step in 0..num_time_steps {
        total += segment_arclength(x, y, step, step + 1)?;
        arclengths.push(total);
    }
    Ok(arclengths)
}

/// Turns cumulative arclengths and per-step slope angles (degrees) into heights.
///
/// The segment from step `i - 1` to `i` drops by `tan(slope[i - 1])` times its
/// length, so a positive slope always descends.
///
/// # Errors
///
/// Returns an error if `slopes` is shorter than the number of segments.
pub fn height_profile(arclengths: &[f64], slopes: &[f64]) -> Result<Vec<f64>> {
    let segments = arclengths.len().saturating_sub(1);
    if slopes.len() < segments {
        return Err(ConfigError::InvalidParameter {
            name: "slopes",
            reason: format!("{} slopes for {segments} segments", slopes.len()),
        }
        .into());
    }
    let mut heights = Vec::with_capacity(arclengths.len());
    heights.push(0.0);
    for i in 1..arclengths.len() {
        let drop = radians(slopes[i - 1]).tan() * (arclengths[i] - arclengths[i - 1]);
        heights.push(heights[i - 1] - drop);
    }
    Ok(heights)
}

/// Derives the height curve of a path from its length and a slope profile.
pub struct HeightFromSlope<'a> {
    arclengths: &'a [f64],
    slopes: &'a SlopeProfile,
}

impl<'a> HeightFromSlope<'a> {
    /// Creates a new height derivation.
    #[must_use]
    pub fn new(arclengths: &'a [f64], slopes: &'a SlopeProfile) -> Self {
        Self { arclengths, slopes }
    }

    /// Executes the derivation, returning a curve defined on `[0, N]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slope profile does not cover every segment.
    pub fn execute(&self) -> Result<SampledCurve> {
        Ok(SampledCurve::new(height_profile(
            self.arclengths,
            self.slopes.angles(),
        )?))
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_time(step: usize) -> f64 {
    step as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::{ConstantCurve, FunctionCurve};
    use approx::assert_relative_eq;

    #[test]
    fn straight_line_length() {
        let x = FunctionCurve::new(|t| 3.0 * t);
        let y = FunctionCurve::new(|t| 4.0 * t);
        let arcs = calculate_arclengths(&x, &y, 10).unwrap();
        assert_eq!(arcs.len(), 11);
        assert_relative_eq!(arcs[10], 50.0, max_relative = 1e-12);
    }

    #[test]
    fn circle_length() {
        let r = 7.0;
        let x = FunctionCurve::new(move |t: f64| r * (t * std::f64::consts::TAU / 20.0).cos());
        let y = FunctionCurve::new(move |t: f64| r * (t * std::f64::consts::TAU / 20.0).sin());
        let arcs = calculate_arclengths(&x, &y, 20).unwrap();
        assert_relative_eq!(arcs[20], std::f64::consts::TAU * r, max_relative = 1e-6);
    }

    #[test]
    fn arclength_is_additive() {
        let x = FunctionCurve::new(|t: f64| (t * 0.7).sin() * 12.0 + t);
        let y = FunctionCurve::new(|t: f64| (t * 0.4).cos() * 8.0);
        let whole = segment_arclength(&x, &y, 0, 12).unwrap();
        let parts: f64 = [(0, 3), (3, 4), (4, 9), (9, 12)]
            .iter()
            .map(|&(a, b)| segment_arclength(&x, &y, a, b).unwrap())
            .sum();
        assert_relative_eq!(parts, whole, max_relative = 1e-6);
        let arcs = calculate_arclengths(&x, &y, 12).unwrap();
        assert_relative_eq!(arcs[12], whole, max_relative = 1e-6);
    }

    #[test]
    fn constant_slope_height() {
        let x = ConstantCurve::new(0.0);
        let y = FunctionCurve::new(|t| t * 2.0);
        let arcs = calculate_arclengths(&x, &y, 25).unwrap();
        let slopes = SlopeProfile::constant(10.0, 25);
        let z = HeightFromSlope::new(&arcs, &slopes).execute().unwrap();
        let expected = -50.0 * 10.0_f64.to_radians().tan();
        assert_relative_eq!(z.evaluate(25.0).unwrap(), expected, max_relative = 1e-9);
        assert!((expected + 8.8163).abs() < 1e-3);
        assert!(z.evaluate(26.0).is_err());
    }

    #[test]
    fn height_depends_only_on_length_and_slope() {
        // a wiggly curve and a straight line with the same step lengths
        let wiggle_x = FunctionCurve::new(|t: f64| 5.0 * (t * 0.5).cos());
        let wiggle_y = FunctionCurve::new(|t: f64| 5.0 * (t * 0.5).sin());
        let arcs = calculate_arclengths(&wiggle_x, &wiggle_y, 8).unwrap();
        let slopes = vec![3.0, 4.0, 5.0, 6.0, 6.0, 5.0, 4.0, 3.0, 3.0];
        let straight: Vec<f64> = (0..=8).map(|i| 2.5 * f64::from(i)).collect();
        let a = height_profile(&arcs, &slopes).unwrap();
        let b = height_profile(&straight, &slopes).unwrap();
        for (za, zb) in a.iter().zip(&b) {
            assert_relative_eq!(*za, *zb, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn short_slope_list_rejected() {
        assert!(height_profile(&[0.0, 1.0, 2.0], &[5.0]).is_err());
    }
}
