//! Local displacement of each tube wall point from the centerline.
//!
//! A cross-section point is first computed in a 2D frame: `x` to the right of
//! the direction of travel and `y` up. Tube angle 0 is the right lip, 90 is the
//! bottom and 180 the left lip. [`orient`] then tilts the frame by the slope and
//! turns it to the heading.

use std::f64::consts::{PI, TAU};

use crate::math::{radians, Vector2, Vector3, TOLERANCE};

use super::{ProfileMethod, TubeProfile};

/// `(sign(v) sqrt|v| + v) / 2`: keeps -1, 0 and 1 fixed and pushes everything
/// else away from zero, which deepens a channel without moving its lips.
#[must_use]
pub fn deep_trig(v: f64) -> f64 {
    (v.signum() * v.abs().sqrt() + v) / 2.0
}

/// The angular extent of the cross-section at one time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSpan {
    pub start: f64,
    pub end: f64,
    /// The section closes into a full ring.
    pub full: bool,
}

impl SectionSpan {
    /// Orders the angles and detects full rings.
    #[must_use]
    pub fn resolve(start: f64, end: f64) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        if end >= start + 360.0 {
            Self {
                start: 0.0,
                end: 360.0,
                full: true,
            }
        } else {
            Self {
                start,
                end,
                full: false,
            }
        }
    }
}

/// Cross-section math for one tube profile.
#[derive(Debug, Clone, Copy)]
pub struct CrossSection {
    method: ProfileMethod,
    radius: f64,
    wall: f64,
    hollow: bool,
    eccentricity: f64,
    wall_height: f64,
    sides: usize,
}

impl CrossSection {
    #[must_use]
    pub fn new(profile: &TubeProfile) -> Self {
        Self {
            method: profile.method(),
            radius: profile.tube_radius(),
            wall: profile.effective_wall(),
            hollow: profile.has_inner_wall(),
            eccentricity: profile.eccentricity(),
            wall_height: profile.wall_height(),
            sides: profile.tube_sides(),
        }
    }

    /// Subdivisions needed to draw `span`.
    ///
    /// Elliptical sections use `360 / sides` degrees per subdivision; oval
    /// sections spread subdivisions evenly along the perimeter at the same
    /// density.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn subdivisions(&self, span: &SectionSpan) -> usize {
        let sides = self.sides as f64;
        if self.method.is_oval() {
            let perimeter = self.perimeter(span, false);
            let n = (sides * perimeter / (TAU * self.radius) - TOLERANCE).ceil();
            n.max(1.0) as usize
        } else if span.full {
            self.sides
        } else {
            let n = ((span.end - span.start) * sides / 360.0 - TOLERANCE).ceil();
            (n.max(1.0) as usize).min(self.sides)
        }
    }

    /// Local `(x, up)` offset of subdivision `s` of `n`.
    #[must_use]
    pub fn offset(&self, span: &SectionSpan, s: usize, n: usize, inside: bool) -> Vector2 {
        if inside && !self.hollow {
            return Vector2::zeros();
        }
        if self.method.is_oval() {
            self.oval_offset(span, s, n, inside)
        } else {
            self.ellipse_offset(span, s, inside)
        }
    }

    fn trig(&self, degrees: f64) -> (f64, f64) {
        let (sin, cos) = radians(degrees).sin_cos();
        if self.method.is_deep() {
            (deep_trig(cos), deep_trig(sin))
        } else {
            (cos, sin)
        }
    }

    /// Radius multiplier that stretches a circle into the ellipse.
    fn ellipse_factor(&self, cos: f64, sin: f64) -> f64 {
        if self.method == ProfileMethod::Circle {
            return 1.0;
        }
        let a = 1.0 / (1.0 - self.eccentricity * self.eccentricity).sqrt();
        a / (a * a * cos * cos + sin * sin).sqrt()
    }

    #[allow(clippy::cast_precision_loss)]
    fn ellipse_offset(&self, span: &SectionSpan, s: usize, inside: bool) -> Vector2 {
        let angle = (span.start + 360.0 / self.sides as f64 * s as f64).min(span.end);
        let (cos, sin) = self.trig(angle);
        let mut r = self.radius * self.ellipse_factor(cos, sin);
        if inside {
            r -= self.wall;
        }
        Vector2::new(r * cos, -r * sin)
    }

    fn arc_point(&self, degrees: f64, radius: f64) -> Vector2 {
        let (cos, sin) = self.trig(degrees);
        Vector2::new(radius * cos, -radius * sin)
    }

    /// Height of the side walls of a closed oval. The lid sits at least one
    /// wall thickness above the half circle so the inner ring stays simple.
    fn closed_height(&self, inside: bool) -> f64 {
        let outer = self.wall_height.max(self.wall);
        if inside {
            outer - self.wall
        } else {
            outer
        }
    }

    fn perimeter(&self, span: &SectionSpan, inside: bool) -> f64 {
        let r = if inside { self.radius - self.wall } else { self.radius };
        if span.full {
            PI * r + 2.0 * self.closed_height(inside) + 2.0 * r
        } else {
            2.0 * self.wall_height + r * radians(span.end - span.start)
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn oval_offset(&self, span: &SectionSpan, s: usize, n: usize, inside: bool) -> Vector2 {
        let outer = self.perimeter(span, false);
        let u = if span.full {
            outer * s as f64 / n.max(1) as f64
        } else {
            (TAU * self.radius / self.sides as f64 * s as f64).min(outer)
        };
        let (r, u) = if inside {
            let fraction = if outer < TOLERANCE { 0.0 } else { u / outer };
            (self.radius - self.wall, fraction * self.perimeter(span, true))
        } else {
            (self.radius, u)
        };
        if span.full {
            self.closed_oval_point(r, self.closed_height(inside), u)
        } else {
            self.open_oval_point(span, r, u)
        }
    }

    /// Open channel: down the first wall, along the arc, up the second wall.
    fn open_oval_point(&self, span: &SectionSpan, r: f64, u: f64) -> Vector2 {
        let h = self.wall_height;
        let arc = r * radians(span.end - span.start);
        if u < h {
            self.arc_point(span.start, r) + Vector2::new(0.0, h - u)
        } else if u <= h + arc {
            self.arc_point(span.start + ((u - h) / r).to_degrees(), r)
        } else {
            self.arc_point(span.end, r) + Vector2::new(0.0, (u - h - arc).min(h))
        }
    }

    /// Closed ring: bottom half circle, left wall up, lid, right wall down.
    fn closed_oval_point(&self, r: f64, h: f64, u: f64) -> Vector2 {
        let arc = PI * r;
        if u <= arc {
            return self.arc_point((u / r).to_degrees(), r);
        }
        let u = u - arc;
        if u <= h {
            return Vector2::new(-r, u);
        }
        let u = u - h;
        if u <= 2.0 * r {
            return Vector2::new(u - r, h);
        }
        let u = (u - 2.0 * r).min(h);
        Vector2::new(r, h - u)
    }
}

/// Turns a local `(x, up)` offset into world space.
///
/// `up` is tilted by the slope so the section stays perpendicular to a path
/// descending at `slope` degrees, then the whole offset is turned to the
/// heading `rotation` (degrees, 0 = +y).
#[must_use]
pub fn orient(local: Vector2, rotation: f64, slope: f64) -> Vector3 {
    let (sin_s, cos_s) = radians(slope).sin_cos();
    let x = local.x;
    let y = local.y * sin_s;
    let z = local.y * cos_s;
    let (sin_r, cos_r) = radians(rotation).sin_cos();
    Vector3::new(x * cos_r - y * sin_r, x * sin_r + y * cos_r, z)
}
