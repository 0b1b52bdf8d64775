//! Shaping a centerline into a rideable path.
//!
//! Headings come from the (x, y) derivative, heights from arclength and a
//! per-step slope profile. Kinks are replaced by arcs and softened; overlapping
//! stretches are steepened until they clear each other. Ends can run on as
//! straight lines or wrap around a central post.

pub mod arclength;
pub mod build;
pub mod extension;
pub mod kink;
pub mod overlap;
pub mod post;
pub mod rotation;
pub mod slope;

pub use arclength::{calculate_arclengths, height_profile, segment_arclength, HeightFromSlope};
pub use build::{BuildRamp, RampReport};
pub use extension::Extension;
pub use kink::{KinkInterval, ReplaceKinks};
pub use overlap::{OverlapInterval, ResolveOverlaps};
pub use post::{PostCircle, WrapPosts, WrappedPath, DEFAULT_POST_RADIUS};
pub use rotation::{heading_degrees, RotationCurve};
pub use slope::{BlendPolicy, KinkSlope, SlopeProfile};
