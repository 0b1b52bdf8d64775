use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use stl_io::{Normal, Vertex};

use crate::error::Result;
use crate::tessellation::TubeMesh;

/// On-disk STL flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Plain text, zero facet normals.
    #[default]
    Ascii,
    /// Little-endian binary with computed facet normals.
    Binary,
}

/// Writes every triangle as an ASCII facet.
///
/// Facet normals are written as `0 0 0`; slicers recompute them from the
/// winding. No `solid` header is emitted.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ascii<W: Write>(mesh: &TubeMesh, writer: &mut W) -> Result<()> {
    for triangle in mesh.triangles() {
        writer.write_all(b"facet normal 0 0 0\n    outer loop\n")?;
        for p in &triangle.vertices {
            writeln!(writer, "        vertex {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
        }
        writer.write_all(b"    endloop\nendfacet\n")?;
    }
    Ok(())
}

/// Renders the mesh as ASCII STL text.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn to_stl_ascii(mesh: &TubeMesh) -> Result<String> {
    let mut out = Vec::new();
    write_ascii(mesh, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Writes the mesh as binary STL.
///
/// # Errors
///
/// Returns an error if writing fails.
#[allow(clippy::cast_possible_truncation)]
pub fn write_binary<W: Write>(mesh: &TubeMesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|tri| {
            let n = tri.normal();
            stl_io::Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.vertices.map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Writes the mesh to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_stl_file(mesh: &TubeMesh, path: &Path, format: StlFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        StlFormat::Ascii => write_ascii(mesh, &mut writer)?,
        StlFormat::Binary => write_binary(mesh, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}
