use std::sync::Arc;

use tracing::debug;

use crate::error::Result;

use super::{derivative, Curve, CurveRef};

/// Evaluates `first` before `inflection` and `second` from `inflection` on.
///
/// `second` is evaluated on its own local time (`t - inflection`) and translated
/// by a constant offset. A positional append picks the offset so that the value
/// is continuous at `inflection`; derivatives are not matched.
pub struct Append {
    first: CurveRef,
    second: CurveRef,
    inflection: f64,
    offset: f64,
}

impl Append {
    /// Appends `second` to `first` at `inflection`, translating `second` so that
    /// its value at local time 0 equals `first(inflection)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either curve cannot be evaluated at the join.
    pub fn new(first: CurveRef, second: CurveRef, inflection: f64) -> Result<Self> {
        let offset = first.evaluate(inflection)? - second.evaluate(0.0)?;
        Ok(Self {
            first,
            second,
            inflection,
            offset,
        })
    }

    /// Appends without any translation, for quantities such as slope or heading
    /// that must keep their absolute values.
    #[must_use]
    pub fn unshifted(first: CurveRef, second: CurveRef, inflection: f64) -> Self {
        Self {
            first,
            second,
            inflection,
            offset: 0.0,
        }
    }

    /// Returns the translation applied to the second curve.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Curve for Append {
    fn evaluate(&self, t: f64) -> Result<f64> {
        if t < self.inflection {
            self.first.evaluate(t)
        } else {
            Ok(self.second.evaluate(t - self.inflection)? + self.offset)
        }
    }
}

/// A curve advanced in time: `shifted(t) = base(t + delay)`.
pub struct Shift {
    base: CurveRef,
    delay: f64,
}

impl Shift {
    /// Creates a time-shifted view of `base`.
    #[must_use]
    pub fn new(base: CurveRef, delay: f64) -> Self {
        Self { base, delay }
    }
}

impl Curve for Shift {
    fn evaluate(&self, t: f64) -> Result<f64> {
        self.base.evaluate(t + self.delay)
    }
}

/// Replaces `base` on `[start, end)` with `insert`, keeping positions continuous.
///
/// The result follows `base` up to `start`, then `insert` (translated to meet
/// `base(start)`), then resumes `base`'s own timeline from `end` on, translated
/// to meet wherever `insert` finished.
///
/// # Errors
///
/// Returns an error if any curve cannot be evaluated at a join.
pub fn splice(base: CurveRef, insert: CurveRef, start: f64, end: f64) -> Result<CurveRef> {
    let head: CurveRef = Arc::new(Append::new(Arc::clone(&base), insert, start)?);
    let tail: CurveRef = Arc::new(Shift::new(base, end));
    Ok(Arc::new(Append::new(head, tail, end)?))
}

/// Like [`splice`] but without any translation; used for headings.
#[must_use]
pub fn splice_unshifted(base: CurveRef, insert: CurveRef, start: f64, end: f64) -> CurveRef {
    let head: CurveRef = Arc::new(Append::unshifted(Arc::clone(&base), insert, start));
    let tail: CurveRef = Arc::new(Shift::new(base, end));
    Arc::new(Append::unshifted(head, tail, end))
}

/// Straight-line extrapolation of a curve outside `[domain_start, domain_end]`.
///
/// Inside the domain the base curve is used. Outside, the curve continues along
/// the tangent line taken at the nearest boundary.
pub struct Extend {
    base: CurveRef,
    start: Tangent,
    end: Tangent,
}

/// Value and slope of a curve at one boundary.
#[derive(Debug, Clone, Copy)]
struct Tangent {
    t0: f64,
    value: f64,
    slope: f64,
}

impl Tangent {
    fn at(base: &dyn Curve, t0: f64) -> Result<Self> {
        let value = base.evaluate(t0)?;
        let slope = derivative(base, t0)?;
        debug!(t0, slope, value, "built curve extension");
        Ok(Self { t0, value, slope })
    }

    fn evaluate(&self, t: f64) -> f64 {
        self.value + self.slope * (t - self.t0)
    }
}

impl Extend {
    /// Builds the extension lines at both boundaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the base curve cannot be evaluated around either boundary.
    pub fn new(base: CurveRef, domain_start: f64, domain_end: f64) -> Result<Self> {
        let start = Tangent::at(base.as_ref(), domain_start)?;
        let end = Tangent::at(base.as_ref(), domain_end)?;
        Ok(Self { base, start, end })
    }
}

impl Curve for Extend {
    fn evaluate(&self, t: f64) -> Result<f64> {
        if t < self.start.t0 {
            Ok(self.start.evaluate(t))
        } else if t > self.end.t0 {
            Ok(self.end.evaluate(t))
        } else {
            self.base.evaluate(t)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::{FunctionCurve, SampledCurve};

    fn sine() -> CurveRef {
        FunctionCurve::shared(|t: f64| (t * 0.3).sin() * 10.0)
    }

    fn parabola() -> CurveRef {
        FunctionCurve::shared(|t: f64| 5.0 + t * t)
    }

    #[test]
    fn append_before_inflection_is_first() {
        let a = sine();
        let joined = Append::new(Arc::clone(&a), parabola(), 4.0).unwrap();
        for t in [0.0, 1.5, 3.999] {
            assert!((joined.evaluate(t).unwrap() - a.evaluate(t).unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn append_after_inflection_is_offset_second() {
        let a = sine();
        let b = parabola();
        let joined = Append::new(Arc::clone(&a), Arc::clone(&b), 4.0).unwrap();
        let offset = a.evaluate(4.0).unwrap() - b.evaluate(0.0).unwrap();
        for t in [4.0, 5.0, 9.25] {
            let expected = b.evaluate(t - 4.0).unwrap() + offset;
            assert!((joined.evaluate(t).unwrap() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn append_is_continuous_at_inflection() {
        let joined = Append::new(sine(), parabola(), 4.0).unwrap();
        let left = joined.evaluate(4.0 - 1e-12).unwrap();
        let right = joined.evaluate(4.0).unwrap();
        assert!((left - right).abs() <= 1e-9);
    }

    #[test]
    fn unshifted_append_keeps_absolute_values() {
        let joined = Append::unshifted(sine(), parabola(), 4.0);
        assert!((joined.offset()).abs() < f64::EPSILON);
        assert!((joined.evaluate(4.0).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn splice_resumes_base_shape() {
        let base = FunctionCurve::shared(|t| t);
        let bump = FunctionCurve::shared(|t| 2.0 * t);
        let spliced = splice(base, bump, 2.0, 5.0).unwrap();
        // before: identity
        assert!((spliced.evaluate(1.0).unwrap() - 1.0).abs() < 1e-12);
        // inside: slope 2 starting from 2
        assert!((spliced.evaluate(4.0).unwrap() - 6.0).abs() < 1e-12);
        // the insert ends at 2 + 2 * 3 = 8, then the base slope resumes
        assert!((spliced.evaluate(5.0).unwrap() - 8.0).abs() < 1e-12);
        assert!((spliced.evaluate(7.0).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn extend_continues_along_tangent() {
        let base: CurveRef = FunctionCurve::shared(|t| t * t);
        let extended = Extend::new(base, 1.0, 3.0).unwrap();
        assert!((extended.evaluate(2.0).unwrap() - 4.0).abs() < 1e-12);
        // tangent at 3 is 9 + 6 (t - 3)
        assert!((extended.evaluate(4.0).unwrap() - 15.0).abs() < 1e-6);
        // tangent at 1 is 1 + 2 (t - 1)
        assert!((extended.evaluate(0.0).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn extend_fails_for_bounded_base() {
        let base: CurveRef = Arc::new(SampledCurve::new(vec![0.0, 1.0, 2.0]));
        // the central difference at the boundary leaves the sampled domain
        assert!(Extend::new(base, 0.0, 2.0).is_err());
    }
}
