//! Closed-form centerlines used directly by the core.

mod helix;
mod straight;

pub use helix::Helix;
pub use straight::Straight;
