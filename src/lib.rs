pub mod curve;
pub mod error;
pub mod io;
pub mod math;
pub mod parse;
pub mod path;
pub mod profile;
pub mod shapes;
pub mod tessellation;

pub use error::{MarbleError, Result};
