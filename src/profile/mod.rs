//! Tube cross-section configuration.

pub mod cross_section;

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, MarbleError, Result};
use crate::math::TOLERANCE;
use crate::parse::parse_pairs;

pub use cross_section::{deep_trig, orient, CrossSection, SectionSpan};

/// Shape of the tube cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileMethod {
    /// Round tube; eccentricity is ignored.
    Circle,
    /// Elliptical tube, taller than wide for `e > 0`.
    #[default]
    Ellipse,
    /// Half circle with vertical walls.
    Oval,
    /// Ellipse with a deepened channel.
    DeepEllipse,
    /// Oval with a deepened channel.
    DeepOval,
}

impl ProfileMethod {
    /// Whether the cross-section has vertical side walls.
    #[must_use]
    pub fn is_oval(self) -> bool {
        matches!(self, Self::Oval | Self::DeepOval)
    }

    /// Whether cos/sin are replaced by [`deep_trig`].
    #[must_use]
    pub fn is_deep(self) -> bool {
        matches!(self, Self::DeepEllipse | Self::DeepOval)
    }
}

impl FromStr for ProfileMethod {
    type Err = MarbleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(Self::Circle),
            "ellipse" => Ok(Self::Ellipse),
            "oval" => Ok(Self::Oval),
            "deep_ellipse" => Ok(Self::DeepEllipse),
            "deep_oval" => Ok(Self::DeepOval),
            _ => Err(ConfigError::Parse {
                what: "tube method",
                input: s.to_owned(),
            }
            .into()),
        }
    }
}

impl fmt::Display for ProfileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Oval => "oval",
            Self::DeepEllipse => "deep_ellipse",
            Self::DeepOval => "deep_oval",
        })
    }
}

/// A tube angle that is either fixed or varies along the path.
///
/// Breakpoints are `(curve time, angle)` pairs sorted by time. Between two
/// breakpoints the angle follows an S-curve; outside them it holds the nearest
/// breakpoint's angle.
#[derive(Debug, Clone, PartialEq)]
pub enum AngleSpec {
    Constant(f64),
    Breakpoints(Vec<(f64, f64)>),
}

impl AngleSpec {
    /// Checks that breakpoints are present and strictly sorted by time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Breakpoints`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if let Self::Breakpoints(points) = self {
            if points.is_empty() || points.windows(2).any(|w| w[1].0 <= w[0].0) {
                return Err(ConfigError::Breakpoints.into());
            }
        }
        Ok(())
    }

    /// The angle at curve time `t`, in degrees.
    #[must_use]
    pub fn at(&self, t: f64) -> f64 {
        match self {
            Self::Constant(angle) => *angle,
            Self::Breakpoints(points) => {
                let Some(&(first_t, first_angle)) = points.first() else {
                    return 0.0;
                };
                if t <= first_t {
                    return first_angle;
                }
                for pair in points.windows(2) {
                    let ((t0, a0), (t1, a1)) = (pair[0], pair[1]);
                    if t < t1 {
                        let ratio = (t - t0) / (t1 - t0);
                        return a0 + (a1 - a0) * s_curve(ratio);
                    }
                }
                points.last().map_or(first_angle, |&(_, angle)| angle)
            }
        }
    }

    /// Whether the angle varies along the path.
    #[must_use]
    pub fn is_varying(&self) -> bool {
        matches!(self, Self::Breakpoints(points) if points.len() > 1)
    }
}

/// Smooth step from 0 to 1 used between angle breakpoints.
fn s_curve(ratio: f64) -> f64 {
    ((8.0 * ratio - 4.0).tanh() + 1.0) / 2.0
}

impl FromStr for AngleSpec {
    type Err = MarbleError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(angle) = s.trim().parse::<f64>() {
            return Ok(Self::Constant(angle));
        }
        let angle = Self::Breakpoints(parse_pairs(s, "tube angle")?);
        angle.validate()?;
        Ok(angle)
    }
}

impl From<f64> for AngleSpec {
    fn from(angle: f64) -> Self {
        Self::Constant(angle)
    }
}

/// Validated tube cross-section settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeProfile {
    tube_radius: f64,
    wall_thickness: f64,
    eccentricity: f64,
    method: ProfileMethod,
    wall_height: f64,
    tube_sides: usize,
    start_angle: AngleSpec,
    end_angle: AngleSpec,
    slope_angle: f64,
}

impl TubeProfile {
    /// Starts a builder with the default settings.
    #[must_use]
    pub fn builder() -> TubeProfileBuilder {
        TubeProfileBuilder::default()
    }

    /// Returns a builder pre-filled with this profile, for local overrides.
    #[must_use]
    pub fn rebuild(&self) -> TubeProfileBuilder {
        TubeProfileBuilder {
            tube_radius: self.tube_radius,
            wall_thickness: self.wall_thickness,
            eccentricity: self.eccentricity,
            method: self.method,
            wall_height: self.wall_height,
            tube_sides: self.tube_sides,
            start_angle: self.start_angle.clone(),
            end_angle: self.end_angle.clone(),
            slope_angle: self.slope_angle,
        }
    }

    #[must_use]
    pub fn tube_radius(&self) -> f64 {
        self.tube_radius
    }

    /// Wall thickness as configured.
    #[must_use]
    pub fn wall_thickness(&self) -> f64 {
        self.wall_thickness
    }

    /// Wall thickness actually swept; a wall at least as thick as the radius
    /// fills the tube.
    #[must_use]
    pub fn effective_wall(&self) -> f64 {
        self.wall_thickness.min(self.tube_radius)
    }

    /// Whether the tube is hollow.
    #[must_use]
    pub fn has_inner_wall(&self) -> bool {
        self.wall_thickness < self.tube_radius
    }

    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    #[must_use]
    pub fn method(&self) -> ProfileMethod {
        self.method
    }

    /// Height of the straight side walls of an oval tube.
    #[must_use]
    pub fn wall_height(&self) -> f64 {
        self.wall_height
    }

    #[must_use]
    pub fn tube_sides(&self) -> usize {
        self.tube_sides
    }

    #[must_use]
    pub fn start_angle(&self) -> &AngleSpec {
        &self.start_angle
    }

    #[must_use]
    pub fn end_angle(&self) -> &AngleSpec {
        &self.end_angle
    }

    /// Base slope angle in degrees.
    #[must_use]
    pub fn slope_angle(&self) -> f64 {
        self.slope_angle
    }
}

/// Builder for [`TubeProfile`].
#[derive(Debug, Clone)]
pub struct TubeProfileBuilder {
    tube_radius: f64,
    wall_thickness: f64,
    eccentricity: f64,
    method: ProfileMethod,
    wall_height: f64,
    tube_sides: usize,
    start_angle: AngleSpec,
    end_angle: AngleSpec,
    slope_angle: f64,
}

impl Default for TubeProfileBuilder {
    fn default() -> Self {
        Self {
            tube_radius: 12.5,
            wall_thickness: 2.0,
            eccentricity: 0.0,
            method: ProfileMethod::Ellipse,
            wall_height: 0.0,
            tube_sides: 64,
            start_angle: AngleSpec::Constant(0.0),
            end_angle: AngleSpec::Constant(180.0),
            slope_angle: 0.0,
        }
    }
}

impl TubeProfileBuilder {
    #[must_use]
    pub fn tube_radius(mut self, radius: f64) -> Self {
        self.tube_radius = radius;
        self
    }

    #[must_use]
    pub fn wall_thickness(mut self, thickness: f64) -> Self {
        self.wall_thickness = thickness;
        self
    }

    #[must_use]
    pub fn eccentricity(mut self, eccentricity: f64) -> Self {
        self.eccentricity = eccentricity;
        self
    }

    #[must_use]
    pub fn method(mut self, method: ProfileMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn wall_height(mut self, height: f64) -> Self {
        self.wall_height = height;
        self
    }

    #[must_use]
    pub fn tube_sides(mut self, sides: usize) -> Self {
        self.tube_sides = sides;
        self
    }

    #[must_use]
    pub fn start_angle(mut self, angle: impl Into<AngleSpec>) -> Self {
        self.start_angle = angle.into();
        self
    }

    #[must_use]
    pub fn end_angle(mut self, angle: impl Into<AngleSpec>) -> Self {
        self.end_angle = angle.into();
        self
    }

    #[must_use]
    pub fn slope_angle(mut self, angle: f64) -> Self {
        self.slope_angle = angle;
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-positive radius, zero sides, a
    /// negative wall thickness or wall height, an eccentricity outside `[0, 1)`,
    /// or malformed angle breakpoints.
    pub fn build(self) -> Result<TubeProfile> {
        if self.tube_radius < TOLERANCE {
            return Err(invalid("tube_radius", format!("must be positive, got {}", self.tube_radius)));
        }
        if self.wall_thickness < 0.0 {
            return Err(invalid(
                "wall_thickness",
                format!("must not be negative, got {}", self.wall_thickness),
            ));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ConfigError::Eccentricity(self.eccentricity).into());
        }
        if self.wall_height < 0.0 {
            return Err(invalid(
                "tube_wall_height",
                format!("must not be negative, got {}", self.wall_height),
            ));
        }
        if self.tube_sides == 0 {
            return Err(invalid("tube_sides", "must be positive".into()));
        }
        self.start_angle.validate()?;
        self.end_angle.validate()?;
        Ok(TubeProfile {
            tube_radius: self.tube_radius,
            wall_thickness: self.wall_thickness,
            eccentricity: self.eccentricity,
            method: self.method,
            wall_height: self.wall_height,
            tube_sides: self.tube_sides,
            start_angle: self.start_angle,
            end_angle: self.end_angle,
            slope_angle: self.slope_angle,
        })
    }
}

fn invalid(name: &'static str, reason: String) -> MarbleError {
    ConfigError::InvalidParameter { name, reason }.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = TubeProfile::builder().build().unwrap();
        assert!((p.tube_radius() - 12.5).abs() < f64::EPSILON);
        assert!((p.wall_thickness() - 2.0).abs() < f64::EPSILON);
        assert_eq!(p.tube_sides(), 64);
        assert_eq!(p.method(), ProfileMethod::Ellipse);
        assert_eq!(p.start_angle(), &AngleSpec::Constant(0.0));
        assert_eq!(p.end_angle(), &AngleSpec::Constant(180.0));
        assert!(p.has_inner_wall());
    }

    #[test]
    fn rebuild_overrides_without_touching_original() {
        let base = TubeProfile::builder().tube_sides(16).build().unwrap();
        let arc = base.rebuild().slope_angle(0.5).build().unwrap();
        assert!((arc.slope_angle() - 0.5).abs() < f64::EPSILON);
        assert!(base.slope_angle().abs() < f64::EPSILON);
        assert_eq!(arc.tube_sides(), 16);
    }

    #[test]
    fn invalid_settings_rejected() {
        assert!(matches!(
            TubeProfile::builder().eccentricity(1.0).build(),
            Err(MarbleError::Config(ConfigError::Eccentricity(_)))
        ));
        assert!(TubeProfile::builder().eccentricity(-0.1).build().is_err());
        assert!(TubeProfile::builder().tube_radius(0.0).build().is_err());
        assert!(TubeProfile::builder().tube_sides(0).build().is_err());
        assert!(TubeProfile::builder().wall_thickness(-1.0).build().is_err());
        assert!(TubeProfile::builder()
            .end_angle(AngleSpec::Breakpoints(vec![(1.0, 0.0), (0.5, 10.0)]))
            .build()
            .is_err());
    }

    #[test]
    fn thick_wall_fills_tube() {
        let p = TubeProfile::builder()
            .tube_radius(10.5)
            .wall_thickness(11.0)
            .build()
            .unwrap();
        assert!(!p.has_inner_wall());
        assert!((p.effective_wall() - 10.5).abs() < f64::EPSILON);
    }

    #[test]
    fn method_parsing() {
        assert_eq!("oval".parse::<ProfileMethod>().unwrap(), ProfileMethod::Oval);
        assert_eq!("Deep_Ellipse".parse::<ProfileMethod>().unwrap(), ProfileMethod::DeepEllipse);
        assert!("square".parse::<ProfileMethod>().is_err());
        assert_eq!(ProfileMethod::DeepOval.to_string(), "deep_oval");
    }

    #[test]
    fn angle_parsing() {
        assert_eq!("240".parse::<AngleSpec>().unwrap(), AngleSpec::Constant(240.0));
        assert_eq!(
            "((-0.2,240),(0.0,180))".parse::<AngleSpec>().unwrap(),
            AngleSpec::Breakpoints(vec![(-0.2, 240.0), (0.0, 180.0)])
        );
        assert!("((0.5,1),(0.1,2))".parse::<AngleSpec>().is_err());
    }

    #[test]
    fn breakpoints_hold_outside_and_blend_inside() {
        let angle = AngleSpec::Breakpoints(vec![(90.0, 180.0), (110.0, 240.0)]);
        assert!((angle.at(0.0) - 180.0).abs() < f64::EPSILON);
        assert!((angle.at(200.0) - 240.0).abs() < f64::EPSILON);
        // symmetric S-curve passes the midpoint halfway
        assert!((angle.at(100.0) - 210.0).abs() < 1e-9);
        // flatter than linear near the start
        assert!(angle.at(92.0) < 186.0);
        assert!(angle.is_varying());
        assert!(!AngleSpec::Constant(3.0).is_varying());
    }
}
