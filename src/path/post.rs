//! Circles that wrap the ends of a path around a central post.
//!
//! Shapes that orbit the origin can start and finish on a post standing on
//! the z axis. Each end gets a partial helix whose centerline runs at
//! `post_radius + tube_radius - wall_thickness` from the axis, so the outer
//! wall of the tube fuses with the post.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::curve::{Append, Curve, CurveRef, FunctionCurve};
use crate::error::{ConfigError, Result};
use crate::math::normalize_degrees;
use crate::profile::TubeProfile;
use crate::shapes::Helix;

/// Radius of the standard post.
pub const DEFAULT_POST_RADIUS: f64 = 15.5;

/// One wrap around the post.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostCircle {
    pub post_radius: f64,
    /// Fraction of a full turn spent on the post.
    pub rotations: f64,
    /// Time steps a full turn would take.
    pub sides_per_rotation: f64,
}

impl Default for PostCircle {
    fn default() -> Self {
        Self {
            post_radius: DEFAULT_POST_RADIUS,
            rotations: 0.25,
            sides_per_rotation: 64.0,
        }
    }
}

impl PostCircle {
    #[must_use]
    pub fn new(post_radius: f64) -> Self {
        Self {
            post_radius,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotations(mut self, rotations: f64) -> Self {
        self.rotations = rotations;
        self
    }

    #[must_use]
    pub fn with_sides_per_rotation(mut self, sides_per_rotation: f64) -> Self {
        self.sides_per_rotation = sides_per_rotation;
        self
    }

    /// Distance from the post axis to the tube centerline.
    #[must_use]
    pub fn arc_radius(&self, profile: &TubeProfile) -> f64 {
        self.post_radius + profile.tube_radius() - profile.wall_thickness()
    }

    /// Checks that the tube can wrap the post without folding over the axis.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PostRadius`] when the centerline would run
    /// closer to the axis than the tube radius.
    pub fn validate(&self, profile: &TubeProfile) -> Result<()> {
        if self.post_radius <= 0.0 || self.arc_radius(profile) <= profile.tube_radius() {
            return Err(ConfigError::PostRadius {
                post_radius: self.post_radius,
                tube_radius: profile.tube_radius(),
                wall_thickness: profile.wall_thickness(),
            }
            .into());
        }
        Ok(())
    }

    /// The helix leaving point `(px, py)` on `heading`, turning towards the axis.
    fn helix(&self, profile: &TubeProfile, (px, py): (f64, f64), heading: f64) -> Result<Helix> {
        let (sin, cos) = heading.to_radians().sin_cos();
        // the axis lies to the left of travel when (-sin, cos) x (-px, -py) > 0
        let clockwise = sin * py + cos * px < 0.0;
        Helix::new(
            self.arc_radius(profile),
            heading,
            clockwise,
            self.sides_per_rotation,
            self.rotations,
        )
    }
}

/// A path with post circles attached.
pub struct WrappedPath {
    pub x: CurveRef,
    pub y: CurveRef,
    pub rotation: CurveRef,
    /// Steps added ahead of the old step 0.
    pub before: usize,
    /// Steps added after the old last step.
    pub after: usize,
}

/// Attaches post circles to the start and end of a path.
pub struct WrapPosts<'a> {
    x: CurveRef,
    y: CurveRef,
    rotation: CurveRef,
    num_time_steps: usize,
    profile: &'a TubeProfile,
    start: Option<PostCircle>,
    end: Option<PostCircle>,
}

impl<'a> WrapPosts<'a> {
    #[must_use]
    pub fn new(x: CurveRef, y: CurveRef, rotation: CurveRef, num_time_steps: usize, profile: &'a TubeProfile) -> Self {
        Self {
            x,
            y,
            rotation,
            num_time_steps,
            profile,
            start: None,
            end: None,
        }
    }

    /// Leads into the path from a circle around the post.
    #[must_use]
    pub fn with_start(mut self, circle: PostCircle) -> Self {
        self.start = Some(circle);
        self
    }

    /// Finishes the path on a circle around the post.
    #[must_use]
    pub fn with_end(mut self, circle: PostCircle) -> Self {
        self.end = Some(circle);
        self
    }

    /// Executes the wrap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PostRadius`] for a post the tube cannot wrap, a
    /// configuration error for a non-positive turn, or any evaluation error at
    /// the joins.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<WrappedPath> {
        let mut x = Arc::clone(&self.x);
        let mut y = Arc::clone(&self.y);
        let mut rotation = Arc::clone(&self.rotation);
        let mut before = 0;
        let mut after = 0;

        if let Some(circle) = &self.end {
            circle.validate(self.profile)?;
            let t = self.num_time_steps as f64;
            let point = (x.evaluate(t)?, y.evaluate(t)?);
            let helix = circle.helix(self.profile, point, rotation.evaluate(t)?)?;
            let (hx, hy, hr) = helix.curves();
            self.check_center(point, (hx.evaluate(0.0)?, hy.evaluate(0.0)?), "end");

            x = Arc::new(Append::new(x, hx, t)?);
            y = Arc::new(Append::new(y, hy, t)?);
            rotation = Arc::new(Append::unshifted(rotation, hr, t));
            after = helix.num_time_steps();
            info!(steps = after, clockwise = helix.clockwise(), "wrapped path end around post");
        }

        if let Some(circle) = &self.start {
            circle.validate(self.profile)?;
            let point = (x.evaluate(0.0)?, y.evaluate(0.0)?);
            // traced backwards from the start of the path
            let helix = circle.helix(self.profile, point, normalize_degrees(rotation.evaluate(0.0)? + 180.0))?;
            let (hx, hy, _) = helix.curves();
            let origin = (hx.evaluate(0.0)?, hy.evaluate(0.0)?);
            self.check_center(point, origin, "start");

            before = helix.num_time_steps();
            let span = before as f64;
            let lead_x: CurveRef = Arc::new(Reversed::new(hx, span, point.0 - origin.0));
            let lead_y: CurveRef = Arc::new(Reversed::new(hy, span, point.1 - origin.1));
            let lead_rotation = FunctionCurve::shared(move |t| normalize_degrees(helix.heading(span - t) + 180.0));

            x = Arc::new(Append::new(lead_x, x, span)?);
            y = Arc::new(Append::new(lead_y, y, span)?);
            rotation = Arc::new(Append::unshifted(lead_rotation, rotation, span));
            info!(steps = before, clockwise = helix.clockwise(), "wrapped path start around post");
        }

        Ok(WrappedPath {
            x,
            y,
            rotation,
            before,
            after,
        })
    }

    /// The helix is centered on the origin; after translating it onto the
    /// path its center should land on the post axis.
    fn check_center(&self, point: (f64, f64), helix_start: (f64, f64), end: &'static str) {
        let off_axis = (point.0 - helix_start.0).hypot(point.1 - helix_start.1);
        if off_axis > self.profile.tube_radius() {
            warn!(end, off_axis, "path is not tangent to the post; the circle misses it");
        } else {
            debug!(end, off_axis, "post circle center");
        }
    }
}

/// `base` run backwards over `[0, span]` and translated by `offset`.
struct Reversed {
    base: CurveRef,
    span: f64,
    offset: f64,
}

impl Reversed {
    fn new(base: CurveRef, span: f64, offset: f64) -> Self {
        Self { base, span, offset }
    }
}

impl Curve for Reversed {
    fn evaluate(&self, t: f64) -> Result<f64> {
        Ok(self.base.evaluate(self.span - t)? + self.offset)
    }
}
