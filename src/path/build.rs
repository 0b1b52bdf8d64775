use std::sync::Arc;

use tracing::{debug, info};

use crate::curve::time::rebalance_time;
use crate::curve::{CurveBundle, CurveRef, Regularization, TimeMap};
use crate::error::{ConfigError, Result};
use crate::profile::TubeProfile;
use crate::tessellation::{Sweep, TubeMesh};

use super::arclength::{calculate_arclengths, HeightFromSlope};
use super::extension::Extension;
use super::kink::{KinkInterval, ReplaceKinks};
use super::overlap::{OverlapInterval, ResolveOverlaps};
use super::post::{PostCircle, WrapPosts};
use super::rotation::RotationCurve;
use super::slope::{KinkSlope, SlopeProfile};

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct RampReport {
    /// Number of time steps swept.
    pub num_time_steps: usize,
    /// Path length in the (x, y) plane.
    pub total_arclength: f64,
    /// Lowest centerline height.
    pub z_min: f64,
    /// Highest centerline height.
    pub z_max: f64,
    /// Peak slope used for each overlap interval, `None` where the base slope
    /// already dropped far enough.
    pub overlap_angles: Vec<Option<f64>>,
}

impl RampReport {
    /// Total height lost between the highest and lowest point.
    #[must_use]
    pub fn height_range(&self) -> f64 {
        self.z_max - self.z_min
    }
}

/// Turns an (x, y) centerline into a tube mesh.
///
/// The pipeline runs, in order: regularization, time rebalancing, straight
/// extension, heading derivation, kink arc replacement, post circles,
/// arclength integration, kink slope softening, overlap resolution, height
/// derivation and the sweep.
///
/// A supplied heading is only used when none of the first three stages
/// reshape the path; otherwise the heading is derived from the reshaped path.
pub struct BuildRamp<'a> {
    x: CurveRef,
    y: CurveRef,
    times: TimeMap,
    profile: &'a TubeProfile,
    rotation: Option<CurveRef>,
    regularization: Option<Regularization>,
    rebalance: bool,
    extension: Extension,
    kink_arcs: Vec<KinkInterval>,
    post_start: Option<PostCircle>,
    post_end: Option<PostCircle>,
    kinks: Vec<f64>,
    kink_slope: KinkSlope,
    overlaps: Vec<OverlapInterval>,
}

impl<'a> BuildRamp<'a> {
    /// Creates a build of the centerline `(x, y)` sampled at `times`.
    #[must_use]
    pub fn new(x: CurveRef, y: CurveRef, times: TimeMap, profile: &'a TubeProfile) -> Self {
        Self {
            x,
            y,
            times,
            profile,
            rotation: None,
            regularization: None,
            rebalance: false,
            extension: Extension::default(),
            kink_arcs: Vec::new(),
            post_start: None,
            post_end: None,
            kinks: Vec::new(),
            kink_slope: KinkSlope::default(),
            overlaps: Vec::new(),
        }
    }

    /// Uses a known heading curve instead of differentiating the path.
    #[must_use]
    pub fn with_rotation(mut self, rotation: CurveRef) -> Self {
        self.rotation = Some(rotation);
        self
    }

    #[must_use]
    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    /// Respaces the time steps so each covers a similar length of path.
    #[must_use]
    pub fn with_rebalanced_time(mut self) -> Self {
        self.rebalance = true;
        self
    }

    /// Continues the path as straight lines past either end.
    #[must_use]
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension = extension;
        self
    }

    /// Wraps the start and/or end of the path around a central post.
    #[must_use]
    pub fn with_post_circles(mut self, start: Option<PostCircle>, end: Option<PostCircle>) -> Self {
        self.post_start = start;
        self.post_end = end;
        self
    }

    /// Intervals (in curve time) whose corner is replaced by a circular arc.
    #[must_use]
    pub fn with_kink_arcs(mut self, kink_arcs: Vec<KinkInterval>) -> Self {
        self.kink_arcs = kink_arcs;
        self
    }

    /// Curve times around which the slope is softened.
    #[must_use]
    pub fn with_kinks(mut self, kinks: Vec<f64>, kink_slope: KinkSlope) -> Self {
        self.kinks = kinks;
        self.kink_slope = kink_slope;
        self
    }

    /// Intervals (in curve time) that must drop by a minimum separation.
    #[must_use]
    pub fn with_overlaps(mut self, overlaps: Vec<OverlapInterval>) -> Self {
        self.overlaps = overlaps;
        self
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage: invalid configuration, an
    /// ill-formed centerline, an infeasible overlap, or a sweep failure.
    pub fn execute(&self) -> Result<(TubeMesh, RampReport)> {
        if self.times.num_time_steps() == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_time_steps",
                reason: "must be positive".into(),
            }
            .into());
        }

        let (mut x, mut y) = match &self.regularization {
            Some(method) => method.apply(&self.x, &self.y)?,
            None => (Arc::clone(&self.x), Arc::clone(&self.y)),
        };

        let mut times = if self.rebalance {
            let (new_x, new_y, ticks) = rebalance_time(&x, &y, self.times.num_time_steps())?;
            x = new_x;
            y = new_y;
            self.times.remapped(&ticks)
        } else {
            self.times.clone()
        };

        if !self.extension.is_empty() {
            let (new_x, new_y, new_times) = self.extension.apply(&x, &y, &times)?;
            x = new_x;
            y = new_y;
            times = new_times;
        }

        let reshaped = self.regularization.is_some() || self.rebalance || !self.extension.is_empty();
        let rotation = match &self.rotation {
            Some(rotation) if !reshaped => Arc::clone(rotation),
            Some(_) => {
                debug!("path was reshaped; deriving heading instead of using the supplied one");
                RotationCurve::shared(&x, &y)
            }
            None => RotationCurve::shared(&x, &y),
        };

        let (x, y, rotation) = if self.kink_arcs.is_empty() {
            (x, y, rotation)
        } else {
            ReplaceKinks::new(x, y, rotation, &times, &self.kink_arcs).execute()?
        };

        let (x, y, rotation) = if self.post_start.is_none() && self.post_end.is_none() {
            (x, y, rotation)
        } else {
            let mut wrap = WrapPosts::new(x, y, rotation, times.num_time_steps(), self.profile);
            if let Some(circle) = self.post_start {
                wrap = wrap.with_start(circle);
            }
            if let Some(circle) = self.post_end {
                wrap = wrap.with_end(circle);
            }
            let wrapped = wrap.execute()?;
            times = times.extended(wrapped.before, wrapped.after);
            (wrapped.x, wrapped.y, wrapped.rotation)
        };

        let num_steps = times.num_time_steps();
        let arclengths = calculate_arclengths(x.as_ref(), y.as_ref(), num_steps)?;
        let mut slopes = SlopeProfile::constant(self.profile.slope_angle(), num_steps);
        for &t in &self.kinks {
            self.kink_slope.apply(&mut slopes, &times, t)?;
        }
        let overlap_angles = ResolveOverlaps::new(&arclengths, &times, &self.overlaps).execute(&mut slopes)?;

        let heights = HeightFromSlope::new(&arclengths, &slopes).execute()?;
        let (z_min, z_max) = heights
            .values()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| (lo.min(z), hi.max(z)));
        let report = RampReport {
            num_time_steps: num_steps,
            total_arclength: arclengths.last().copied().unwrap_or(0.0),
            z_min,
            z_max,
            overlap_angles,
        };
        info!(
            arclength = report.total_arclength,
            z_min = report.z_min,
            z_max = report.z_max,
            "path height range"
        );

        let bundle = CurveBundle {
            x,
            y,
            z: Arc::new(heights),
            rotation,
            num_time_steps: num_steps,
        };
        let mesh = Sweep::new(&bundle, self.profile)
            .with_slope(slopes.as_curve())
            .with_times(&times)
            .execute()?;
        Ok((mesh, report))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::curve::{ConstantCurve, Curve, FunctionCurve};
    use crate::error::{MarbleError, NumericalError};
    use crate::shapes::{Helix, Straight};

    fn profile(slope: f64) -> TubeProfile {
        TubeProfile::builder()
            .tube_sides(16)
            .slope_angle(slope)
            .build()
            .unwrap()
    }

    #[test]
    fn straight_tube_drops_with_slope() {
        let p = profile(10.0).rebuild().end_angle(360.0).build().unwrap();
        let straight = Straight::new(50.0, 0.0, 20).unwrap();
        let (x, y, _) = straight.curves();
        let (mesh, report) = BuildRamp::new(x, y, TimeMap::identity(20), &p).execute().unwrap();

        assert_eq!(mesh.vertex_count(), 17 * 21 * 2);
        assert_abs_diff_eq!(report.total_arclength, 50.0, epsilon = 1e-6);
        assert_abs_diff_eq!(report.z_max, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.z_min, -50.0 * 10.0_f64.to_radians().tan(), epsilon = 1e-6);
        assert!(report.overlap_angles.is_empty());
    }

    #[test]
    fn helix_loses_its_vertical_displacement_per_turn() {
        let helix = Helix::new(40.0, 0.0, false, 32.0, 2.0).unwrap();
        let (x, y, r) = helix.curves();
        let slope = Helix::slope_for_displacement(40.0, 30.0);
        let p = profile(slope);
        let steps = helix.num_time_steps();
        let (mesh, report) = BuildRamp::new(x, y, TimeMap::identity(steps), &p)
            .with_rotation(r)
            .execute()
            .unwrap();

        assert!((report.height_range() - 60.0).abs() < 0.5);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn kinks_flatten_and_overlaps_steepen() {
        let p = &profile(5.0);
        let build = || {
            let straight = Straight::new(100.0, 90.0, 100).unwrap();
            let (x, y, _) = straight.curves();
            BuildRamp::new(x, y, TimeMap::identity(100), p)
        };
        let (_, plain) = build().execute().unwrap();

        let soft = KinkSlope {
            width: 10.0,
            slope: 0.0,
            sharpness: 0.2,
        };
        let (_, softened) = build().with_kinks(vec![50.0], soft).execute().unwrap();
        assert!(softened.height_range() < plain.height_range());

        let (_, steep) = build()
            .with_overlaps(vec![OverlapInterval::new(20.0, 60.0, 15.0)])
            .execute()
            .unwrap();
        assert!(steep.height_range() > plain.height_range());
        assert!(steep.overlap_angles[0].unwrap() > 5.0);
    }

    #[test]
    fn rebalanced_time_keeps_the_path_length() {
        let p = profile(3.0);
        // quadratic in time: steps near the end cover far more ground
        let x = FunctionCurve::shared(|t| t * t + t);
        let y = FunctionCurve::shared(|t| 0.5 * (t * t + t));
        let (_, report) = BuildRamp::new(x, y, TimeMap::identity(10), &p)
            .with_rebalanced_time()
            .execute()
            .unwrap();
        let expected = 110.0_f64.hypot(55.0);
        assert_abs_diff_eq!(report.total_arclength, expected, epsilon = 1e-3);
    }

    #[test]
    fn stationary_path_is_rejected() {
        let p = profile(0.0);
        let still = FunctionCurve::shared(|_| 1.0);
        let err = BuildRamp::new(Arc::clone(&still), still, TimeMap::identity(4), &p)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            MarbleError::Numerical(NumericalError::ZeroDerivative { .. })
        ));
    }

    #[test]
    fn regularization_shrinks_the_path() {
        let p = profile(0.0);
        let straight = Straight::new(100.0, 0.0, 50).unwrap();
        let (x, y, _) = straight.curves();
        let (_, report) = BuildRamp::new(x, y, TimeMap::identity(50), &p)
            .with_regularization(Regularization::InverseQuadratic {
                strength: 0.01,
                radius: 0.0,
                y_strength: 0.0,
            })
            .execute()
            .unwrap();
        // 100 / (0.01 * 100 + 1)
        assert_abs_diff_eq!(report.total_arclength, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn supplied_heading_is_rederived_after_rebalancing() {
        let p = profile(0.0);
        // a half circle of radius 40 traversed with growing speed
        let angle = |t: f64| std::f64::consts::PI * (t * t + t) / 120.0;
        let x = FunctionCurve::shared(move |t| 40.0 * angle(t).cos());
        let y = FunctionCurve::shared(move |t| 40.0 * angle(t).sin());
        let heading = FunctionCurve::shared(move |t| angle(t).to_degrees());
        let (mesh, _) = BuildRamp::new(Arc::clone(&x), Arc::clone(&y), TimeMap::identity(10), &p)
            .with_rotation(heading)
            .with_rebalanced_time()
            .execute()
            .unwrap();

        let (rx, ry, _) = rebalance_time(&x, &y, 10).unwrap();
        let centers: Vec<(f64, f64)> = (0..=10_u32)
            .map(|k| (rx.evaluate(f64::from(k)).unwrap(), ry.evaluate(f64::from(k)).unwrap()))
            .collect();
        // a flat ring square to a circular path lies in the vertical plane
        // through the circle's axis and the ring's center
        for v in &mesh.vertices {
            let in_a_ring_plane = centers.iter().any(|&(cx, cy)| {
                let sine = (v.x * cy - v.y * cx) / (v.x.hypot(v.y) * cx.hypot(cy));
                sine.abs() < 1e-3 && v.x * cx + v.y * cy > 0.0
            });
            assert!(in_a_ring_plane, "vertex {v:?} is off every cross-section plane");
        }
    }

    #[test]
    fn supplied_heading_is_kept_for_an_unchanged_path() {
        let p = profile(0.0);
        // deliberately wrong: the sweep must trust it when nothing reshapes the path
        let sideways = ConstantCurve::shared(90.0);
        let straight = Straight::new(50.0, 0.0, 10).unwrap();
        let (x, y, _) = straight.curves();
        let (kept, _) = BuildRamp::new(Arc::clone(&x), Arc::clone(&y), TimeMap::identity(10), &p)
            .with_rotation(Arc::clone(&sideways))
            .execute()
            .unwrap();
        let (derived, _) = BuildRamp::new(x, y, TimeMap::identity(10), &p)
            .with_rotation(sideways)
            .with_extension(Extension::both(1.0))
            .execute()
            .unwrap();
        // along +y a heading of 90 turns the lips onto the y axis
        assert!(kept.vertices.iter().all(|v| v.x.abs() < 1e-9));
        assert!(derived.vertices.iter().any(|v| v.x.abs() > 1.0));
    }

    #[test]
    fn extension_adds_straight_run_outs() {
        let p = profile(0.0);
        let straight = Straight::new(50.0, 0.0, 20).unwrap();
        let (x, y, r) = straight.curves();
        let (mesh, report) = BuildRamp::new(x, y, TimeMap::identity(20), &p)
            .with_rotation(r)
            .with_extension(Extension::both(5.0))
            .execute()
            .unwrap();
        // five extra steps of 2.5 at each end
        assert_eq!(report.num_time_steps, 30);
        assert_abs_diff_eq!(report.total_arclength, 75.0, epsilon = 1e-6);
        let (lo, hi) = mesh.bounds().unwrap();
        assert_abs_diff_eq!(lo.y, -12.5, epsilon = 1e-6);
        assert_abs_diff_eq!(hi.y, 62.5, epsilon = 1e-6);
    }

    #[test]
    fn post_circle_wraps_the_end() {
        let p = profile(2.0);
        let x = ConstantCurve::shared(26.0);
        let y = FunctionCurve::shared(|t| t - 50.0);
        let (mesh, report) = BuildRamp::new(x, y, TimeMap::identity(50), &p)
            .with_rotation(ConstantCurve::shared(0.0))
            .with_post_circles(None, Some(PostCircle::default()))
            .execute()
            .unwrap();
        assert_eq!(report.num_time_steps, 66);
        let quarter = 26.0 * std::f64::consts::FRAC_PI_2;
        assert_abs_diff_eq!(report.total_arclength, 50.0 + quarter, epsilon = 1e-2);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn post_too_narrow_for_the_tube_is_rejected() {
        let p = profile(2.0);
        let straight = Straight::new(50.0, 0.0, 10).unwrap();
        let (x, y, _) = straight.curves();
        let err = BuildRamp::new(x, y, TimeMap::identity(10), &p)
            .with_post_circles(Some(PostCircle::new(1.0)), None)
            .execute()
            .unwrap_err();
        assert!(matches!(err, MarbleError::Config(ConfigError::PostRadius { .. })));
    }
}
