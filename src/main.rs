//! `marble-ramp` command line: sweeps a straight tube or a helix into an STL file.
//!
//! ```text
//! marble-ramp tube --length 134 --slope-angle 2.9 --output ramp.stl
//! marble-ramp helix --helix-radius 19 --rotations 2 --tube-end-angle 360
//! marble-ramp helix --rotations 0.75 --zero-circle --extra-start-t 10
//! RUST_LOG=marble_ramp=debug marble-ramp tube --overlaps "((20,60))"
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use marble_ramp::curve::{CurveRef, TimeMap};
use marble_ramp::io::{write_stl_file, StlFormat};
use marble_ramp::parse::{parse_floats, parse_pairs};
use marble_ramp::path::{
    BuildRamp, Extension, KinkInterval, KinkSlope, OverlapInterval, PostCircle, DEFAULT_POST_RADIUS,
};
use marble_ramp::profile::{AngleSpec, ProfileMethod, TubeProfile};
use marble_ramp::shapes::{Helix, Straight};
use marble_ramp::Result;

#[derive(Parser)]
#[command(version, about = "Sweep marble-run centerlines into printable tube meshes")]
struct Cli {
    #[command(subcommand)]
    shape: Shape,
}

#[derive(Subcommand)]
enum Shape {
    /// A straight ramp
    Tube(TubeCommand),
    /// A helix around a vertical axis
    Helix(HelixCommand),
}

#[derive(Args)]
struct TubeCommand {
    /// Length of the ramp
    #[arg(long, default_value_t = 134.0)]
    length: f64,

    /// Heading in degrees, 0 = +y, counterclockwise positive
    #[arg(long, default_value_t = 0.0)]
    heading: f64,

    /// Number of time steps along the ramp
    #[arg(long, default_value_t = 200)]
    num_time_steps: usize,

    /// Descent angle of the ramp in degrees
    #[arg(long, default_value_t = 2.9)]
    slope_angle: f64,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct HelixCommand {
    /// Distance from the axis to the center of the tube
    #[arg(long, default_value_t = 19.0)]
    helix_radius: f64,

    /// Time steps per full turn
    #[arg(long, default_value_t = 64.0)]
    helix_sides: f64,

    /// Number of turns, fractional turns allowed
    #[arg(long, default_value_t = 1.0)]
    rotations: f64,

    /// Height lost per full turn; sets the slope angle unless given explicitly
    #[arg(long, default_value_t = 25.0)]
    vertical_displacement: f64,

    /// Descent angle in degrees, overriding --vertical-displacement
    #[arg(long)]
    slope_angle: Option<f64>,

    /// Turn clockwise instead of counterclockwise
    #[arg(long)]
    clockwise: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Distance from the centerline to the outer wall
    #[arg(long, default_value_t = 12.5)]
    tube_radius: f64,

    /// Wall thickness; at least the tube radius gives a solid tube
    #[arg(long, default_value_t = 2.0)]
    wall_thickness: f64,

    /// Tube eccentricity, 0 <= e < 1
    #[arg(long = "tube-eccentricity", default_value_t = 0.0)]
    eccentricity: f64,

    /// Cross-section: circle, ellipse, oval, deep_ellipse or deep_oval
    #[arg(long, default_value = "ellipse")]
    tube_method: ProfileMethod,

    /// Height of the straight walls of an oval tube
    #[arg(long, default_value_t = 0.0)]
    tube_wall_height: f64,

    /// Sides of a complete tube
    #[arg(long, default_value_t = 64)]
    tube_sides: usize,

    /// Start of the tube wall in degrees, or "((t,angle),...)" breakpoints
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    tube_start_angle: AngleSpec,

    /// End of the tube wall in degrees, or "((t,angle),...)" breakpoints
    #[arg(long, default_value = "180", allow_hyphen_values = true)]
    tube_end_angle: AngleSpec,

    /// Stretches that must clear the path below, as "((t0,t1),...)"
    #[arg(long)]
    overlaps: Option<String>,

    /// Vertical drop required over each overlap
    #[arg(long, default_value_t = 25.0)]
    overlap_separation: f64,

    /// Times around which the slope is softened, as "(t0,t1,...)"
    #[arg(long)]
    kinks: Option<String>,

    /// Half-width of each softened window in curve time
    #[arg(long, default_value_t = 0.1)]
    kink_width: f64,

    /// Slope in degrees at the middle of a softened window
    #[arg(long, default_value_t = 0.5)]
    kink_slope: f64,

    /// Fraction of a softened window spent ramping, 0..0.5
    #[arg(long, default_value_t = 0.2)]
    kink_sharpness: f64,

    /// Corners replaced by circular arcs, as "((t0,t1),...)"
    #[arg(long)]
    kink_arcs: Option<String>,

    /// Fixed radius for the replacement arcs
    #[arg(long)]
    kink_arc_radius: Option<f64>,

    /// Curve time built as a straight line before and after the path
    #[arg(long)]
    extra_t: Option<f64>,

    /// Curve time built as a straight line before the path
    #[arg(long)]
    extra_start_t: Option<f64>,

    /// Curve time built as a straight line after the path
    #[arg(long)]
    extra_end_t: Option<f64>,

    /// Wrap both ends of the path around a post on the z axis
    #[arg(long)]
    zero_circle: bool,

    /// Time steps a full turn around the post would take
    #[arg(long, default_value_t = 64.0)]
    zero_circle_sides: f64,

    /// Fraction of a turn spent on the post at each end
    #[arg(long, default_value_t = 0.25)]
    zero_circle_rotations: f64,

    /// Radius of the post
    #[arg(long, default_value_t = DEFAULT_POST_RADIUS)]
    post_radius: f64,

    /// Where to write the mesh
    #[arg(short, long, default_value = "ramp.stl")]
    output: PathBuf,

    /// Write binary STL instead of ASCII
    #[arg(long)]
    binary: bool,
}

impl CommonArgs {
    /// The tube every subcommand starts from; each one overrides the slope.
    fn profile(&self) -> Result<TubeProfile> {
        TubeProfile::builder()
            .tube_radius(self.tube_radius)
            .wall_thickness(self.wall_thickness)
            .eccentricity(self.eccentricity)
            .method(self.tube_method)
            .wall_height(self.tube_wall_height)
            .tube_sides(self.tube_sides)
            .start_angle(self.tube_start_angle.clone())
            .end_angle(self.tube_end_angle.clone())
            .build()
    }

    fn post_circle(&self) -> Option<PostCircle> {
        self.zero_circle.then(|| {
            PostCircle::new(self.post_radius)
                .with_rotations(self.zero_circle_rotations)
                .with_sides_per_rotation(self.zero_circle_sides)
        })
    }

    fn overlaps(&self) -> Result<Vec<OverlapInterval>> {
        let Some(text) = &self.overlaps else {
            return Ok(Vec::new());
        };
        Ok(parse_pairs(text, "overlaps")?
            .into_iter()
            .map(|(start, end)| OverlapInterval::new(start, end, self.overlap_separation))
            .collect())
    }

    fn kinks(&self) -> Result<Vec<f64>> {
        self.kinks
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), |text| parse_floats(text, "kinks"))
    }

    fn kink_slope(&self) -> KinkSlope {
        KinkSlope {
            width: self.kink_width,
            slope: self.kink_slope,
            sharpness: self.kink_sharpness,
        }
    }

    fn kink_arcs(&self) -> Result<Vec<KinkInterval>> {
        let Some(text) = &self.kink_arcs else {
            return Ok(Vec::new());
        };
        Ok(parse_pairs(text, "kink arcs")?
            .into_iter()
            .map(|(start, end)| {
                let kink = KinkInterval::new(start, end);
                match self.kink_arc_radius {
                    Some(radius) => kink.with_radius(radius),
                    None => kink,
                }
            })
            .collect())
    }

    fn build(
        &self,
        curves: (CurveRef, CurveRef, CurveRef),
        times: TimeMap,
        profile: &TubeProfile,
    ) -> Result<()> {
        let (x, y, rotation) = curves;
        let (mesh, report) = BuildRamp::new(x, y, times, profile)
            .with_rotation(rotation)
            .with_extension(Extension::from_flags(self.extra_t, self.extra_start_t, self.extra_end_t)?)
            .with_kink_arcs(self.kink_arcs()?)
            .with_post_circles(self.post_circle(), self.post_circle())
            .with_kinks(self.kinks()?, self.kink_slope())
            .with_overlaps(self.overlaps()?)
            .execute()?;

        let format = if self.binary {
            StlFormat::Binary
        } else {
            StlFormat::Ascii
        };
        write_stl_file(&mesh, &self.output, format)?;
        info!(
            output = %self.output.display(),
            triangles = mesh.triangle_count(),
            drop = report.height_range(),
            "wrote mesh"
        );
        if let Some((lo, hi)) = mesh.bounds() {
            info!(
                width = hi.x - lo.x,
                depth = hi.y - lo.y,
                height = hi.z - lo.z,
                "mesh extent"
            );
        }
        Ok(())
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.shape {
        Shape::Tube(cmd) => {
            let straight = Straight::new(cmd.length, cmd.heading, cmd.num_time_steps)?;
            let profile = cmd.common.profile()?.rebuild().slope_angle(cmd.slope_angle).build()?;
            cmd.common.build(
                straight.curves(),
                TimeMap::identity(straight.num_time_steps()),
                &profile,
            )
        }
        Shape::Helix(cmd) => {
            let helix = Helix::new(cmd.helix_radius, 0.0, cmd.clockwise, cmd.helix_sides, cmd.rotations)?;
            let slope = cmd
                .slope_angle
                .unwrap_or_else(|| Helix::slope_for_displacement(cmd.helix_radius, cmd.vertical_displacement));
            info!(slope, "helix slope angle");
            let profile = cmd.common.profile()?.rebuild().slope_angle(slope).build()?;
            cmd.common.build(
                helix.curves(),
                TimeMap::identity(helix.num_time_steps()),
                &profile,
            )
        }
    }
}

fn main() {
    // Default: WARN for everything, INFO for marble_ramp.
    // Override with RUST_LOG env var (e.g. RUST_LOG=marble_ramp=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("marble_ramp=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!(error = %e, "build failed");
        process::exit(1);
    }
}
