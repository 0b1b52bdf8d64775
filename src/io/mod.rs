//! Mesh export.

pub mod stl;

pub use stl::{to_stl_ascii, write_ascii, write_binary, write_stl_file, StlFormat};
