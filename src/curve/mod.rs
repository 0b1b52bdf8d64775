//! Scalar curve functions of time and the bundle that describes a centerline.
//!
//! A curve maps a time step to one scalar (x, y, z or a heading in degrees).
//! Time steps are integers in the mesh, but every curve also accepts
//! fractional steps so it can be differentiated numerically.

mod compose;
pub mod regularize;
mod sampled;
pub mod time;

use std::fmt;
use std::sync::Arc;

pub use compose::{splice, splice_unshifted, Append, Extend, Shift};
pub use regularize::{Regularization, Regularized};
pub use sampled::SampledCurve;
pub use time::TimeMap;

use crate::error::Result;
use crate::math::{Point3, DERIVATIVE_EPSILON};

/// Closed interval of time steps a curve is defined on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Returns whether `t` lies inside the domain.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }
}

/// A scalar function of time.
///
/// Implementations are pure: evaluating never mutates the curve, so curves can be
/// shared freely between compositions.
pub trait Curve: Send + Sync {
    /// Evaluates the curve at time step `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the curve's domain.
    fn evaluate(&self, t: f64) -> Result<f64>;
}

/// Shared handle to a curve.
pub type CurveRef = Arc<dyn Curve>;

/// Central-difference derivative of `curve` at `t`.
///
/// # Errors
///
/// Returns an error if the curve cannot be evaluated at `t ± ε`.
pub fn derivative(curve: &dyn Curve, t: f64) -> Result<f64> {
    let ahead = curve.evaluate(t + DERIVATIVE_EPSILON)?;
    let behind = curve.evaluate(t - DERIVATIVE_EPSILON)?;
    Ok((ahead - behind) / (2.0 * DERIVATIVE_EPSILON))
}

/// A curve backed by a plain formula, e.g. a shape generator.
pub struct FunctionCurve<F> {
    f: F,
}

impl<F> FunctionCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Wraps a formula.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> FunctionCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    /// Wraps a formula into a shared [`CurveRef`].
    #[must_use]
    pub fn shared(f: F) -> CurveRef {
        Arc::new(Self::new(f))
    }
}

impl<F> Curve for FunctionCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, t: f64) -> Result<f64> {
        Ok((self.f)(t))
    }
}

impl<F> fmt::Debug for FunctionCurve<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionCurve")
    }
}

/// A curve with the same value everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantCurve {
    value: f64,
}

impl ConstantCurve {
    /// Creates a constant curve.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Creates a shared constant curve.
    #[must_use]
    pub fn shared(value: f64) -> CurveRef {
        Arc::new(Self::new(value))
    }
}

impl Curve for ConstantCurve {
    fn evaluate(&self, _t: f64) -> Result<f64> {
        Ok(self.value)
    }
}

/// The four curves describing a swept centerline, valid on `[0, num_time_steps]`.
///
/// `z` and `rotation` are usually derived from `x` and `y` by the height and
/// rotation engines rather than authored directly.
#[derive(Clone)]
pub struct CurveBundle {
    /// X coordinate of the centerline.
    pub x: CurveRef,
    /// Y coordinate of the centerline.
    pub y: CurveRef,
    /// Height of the centerline.
    pub z: CurveRef,
    /// Heading in degrees (0 = north, counterclockwise positive).
    pub rotation: CurveRef,
    /// Number of time steps; the domain is `[0, num_time_steps]`.
    pub num_time_steps: usize,
}

impl CurveBundle {
    /// Evaluates the centerline position at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate curve fails to evaluate.
    pub fn center(&self, t: f64) -> Result<Point3> {
        Ok(Point3::new(
            self.x.evaluate(t)?,
            self.y.evaluate(t)?,
            self.z.evaluate(t)?,
        ))
    }

    /// Returns the domain of the bundle.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, self.num_time_steps as f64)
    }
}

impl fmt::Debug for CurveBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveBundle")
            .field("num_time_steps", &self.num_time_steps)
            .finish_non_exhaustive()
    }
}
