use std::collections::HashMap;

use tracing::{debug, info};

use crate::curve::{Curve, CurveBundle, CurveRef, TimeMap};
use crate::error::{ConfigError, NumericalError, Result};
use crate::math::Point3;
use crate::profile::{orient, CrossSection, SectionSpan, TubeProfile};

use super::{TubeMesh, VertexKey};

/// Everything the sweep needs to know about one time step.
struct StepFrame {
    center: Point3,
    rotation: f64,
    slope: f64,
    span: SectionSpan,
}

/// Sweeps a tube profile along a centerline into a closed triangle mesh.
///
/// For each time step `t` in `0..N` and subdivision `s` in `0..n` the sweep
/// emits, in order: the outer wall quad, the inner wall quad (hollow tubes),
/// the start and end radial caps (open sections only, at the first and last
/// subdivision) and the start and end time caps (first and last step). Each
/// quad `(a, b, c, d)` becomes triangles `(a, b, d)` and `(b, c, d)`.
pub struct Sweep<'a> {
    bundle: &'a CurveBundle,
    profile: &'a TubeProfile,
    slope: Option<CurveRef>,
    times: Option<&'a TimeMap>,
}

impl<'a> Sweep<'a> {
    /// Creates a sweep with the profile's constant slope angle.
    #[must_use]
    pub fn new(bundle: &'a CurveBundle, profile: &'a TubeProfile) -> Self {
        Self {
            bundle,
            profile,
            slope: None,
            times: None,
        }
    }

    /// Tilts the cross-section by a per-step slope angle instead.
    #[must_use]
    pub fn with_slope(mut self, slope: CurveRef) -> Self {
        self.slope = Some(slope);
        self
    }

    /// Curve times used to evaluate time-varying tube angles.
    #[must_use]
    pub fn with_times(mut self, times: &'a TimeMap) -> Self {
        self.times = Some(times);
        self
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle has no time steps, any curve fails to
    /// evaluate on `[0, N]`, or the mesh outgrows 32-bit indices.
    pub fn execute(&self) -> Result<TubeMesh> {
        let num_steps = self.bundle.num_time_steps;
        if num_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_time_steps",
                reason: "must be positive".into(),
            }
            .into());
        }

        let section = CrossSection::new(self.profile);
        let (start_angle, end_angle) = (self.profile.start_angle(), self.profile.end_angle());
        let varying = start_angle.is_varying() || end_angle.is_varying();
        // constant angles resolve to the same span at every step
        let fixed_span = (!varying).then(|| SectionSpan::resolve(start_angle.at(0.0), end_angle.at(0.0)));
        let frames = (0..=num_steps)
            .map(|step| self.frame(step, fixed_span))
            .collect::<Result<Vec<_>>>()?;
        let full = frames.iter().all(|f| f.span.full);
        let subdivisions = frames
            .iter()
            .map(|f| section.subdivisions(&f.span))
            .max()
            .unwrap_or(1);
        debug!(subdivisions, full, varying, "tube subdivisions");

        let mut builder = MeshBuilder {
            frames: &frames,
            section,
            subdivisions,
            full,
            cache: HashMap::new(),
            mesh: TubeMesh::default(),
        };
        let hollow = self.profile.has_inner_wall();
        let last = subdivisions - 1;

        for t in 0..num_steps {
            for s in 0..subdivisions {
                // outer wall
                builder.quad([(s, t, false), (s + 1, t, false), (s + 1, t + 1, false), (s, t + 1, false)])?;
                if hollow {
                    builder.quad([(s, t, true), (s, t + 1, true), (s + 1, t + 1, true), (s + 1, t, true)])?;
                }
                if s == 0 && !full {
                    builder.quad([(s, t, false), (s, t + 1, false), (s, t + 1, true), (s, t, true)])?;
                }
                if s == last && !full {
                    builder.quad([
                        (s + 1, t, true),
                        (s + 1, t + 1, true),
                        (s + 1, t + 1, false),
                        (s + 1, t, false),
                    ])?;
                }
                if t == 0 {
                    builder.quad([(s, t, false), (s, t, true), (s + 1, t, true), (s + 1, t, false)])?;
                }
                if t == num_steps - 1 {
                    builder.quad([
                        (s, t + 1, true),
                        (s, t + 1, false),
                        (s + 1, t + 1, false),
                        (s + 1, t + 1, true),
                    ])?;
                }
            }
        }

        let mesh = builder.mesh;
        info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "swept tube mesh"
        );
        Ok(mesh)
    }

    #[allow(clippy::cast_precision_loss)]
    fn frame(&self, step: usize, fixed_span: Option<SectionSpan>) -> Result<StepFrame> {
        let t = step as f64;
        let slope = match &self.slope {
            Some(curve) => curve.evaluate(t)?,
            None => self.profile.slope_angle(),
        };
        let span = fixed_span.unwrap_or_else(|| {
            let curve_time = self.times.map_or(t, |times| times.time(step));
            SectionSpan::resolve(
                self.profile.start_angle().at(curve_time),
                self.profile.end_angle().at(curve_time),
            )
        });
        Ok(StepFrame {
            center: self.bundle.center(t)?,
            rotation: self.bundle.rotation.evaluate(t)?,
            slope,
            span,
        })
    }
}

/// Build-local vertex cache and the mesh under construction.
struct MeshBuilder<'f> {
    frames: &'f [StepFrame],
    section: CrossSection,
    subdivisions: usize,
    full: bool,
    cache: HashMap<VertexKey, u32>,
    mesh: TubeMesh,
}

impl MeshBuilder<'_> {
    fn vertex(&mut self, subdivision: usize, step: usize, inside: bool) -> Result<u32> {
        let key = VertexKey {
            subdivision,
            step,
            inside,
        };
        if let Some(&index) = self.cache.get(&key) {
            return Ok(index);
        }

        // a closed ring ends on exactly the coordinates it started from
        let geometry = if self.full && subdivision == self.subdivisions {
            0
        } else {
            subdivision
        };
        let frame = &self.frames[step];
        let local = self.section.offset(&frame.span, geometry, self.subdivisions, inside);
        let position = frame.center + orient(local, frame.rotation, frame.slope);

        let index = u32::try_from(self.mesh.vertices.len())
            .map_err(|_| NumericalError::Degenerate("mesh exceeds 32-bit vertex indices".into()))?;
        self.mesh.vertices.push(position);
        self.cache.insert(key, index);
        Ok(index)
    }

    fn quad(&mut self, corners: [(usize, usize, bool); 4]) -> Result<()> {
        let [a, b, c, d] = corners;
        let a = self.vertex(a.0, a.1, a.2)?;
        let b = self.vertex(b.0, b.1, b.2)?;
        let c = self.vertex(c.0, c.1, c.2)?;
        let d = self.vertex(d.0, d.1, d.2)?;
        self.mesh.indices.push([a, b, d]);
        self.mesh.indices.push([b, c, d]);
        Ok(())
    }
}
