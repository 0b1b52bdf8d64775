//! Triangle meshes swept from a centerline and a cross-section.

mod sweep;

pub use sweep::Sweep;

use crate::math::{Point3, Vector3, TOLERANCE};

/// Identifies a mesh vertex by where it sits on the tube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey {
    /// Cross-section subdivision, `0..=n`.
    pub subdivision: usize,
    /// Time step along the centerline, `0..=N`.
    pub step: usize,
    /// Whether the vertex is on the inner wall.
    pub inside: bool,
}

/// A triangle with inlined coordinates, wound counterclockwise when seen from
/// outside the tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Unit normal from the winding, or zero for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        let [a, b, c] = self.vertices;
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }
}

/// An indexed triangle mesh.
///
/// Triangles are stored in emission order: time step, then cross-section
/// subdivision, then wall category.
#[derive(Debug, Clone, Default)]
pub struct TubeMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TubeMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterates over the triangles with their coordinates inlined.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.iter().map(|&[a, b, c]| Triangle {
            vertices: [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ],
        })
    }

    /// Volume enclosed by the mesh; positive when every triangle faces outward.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| {
                let [a, b, c] = t.vertices;
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    /// Smallest and largest coordinates, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tetrahedron() -> TubeMesh {
        TubeMesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            indices: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        }
    }

    #[test]
    fn outward_tetrahedron_has_positive_volume() {
        let mesh = tetrahedron();
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn normal_follows_winding() {
        let mesh = tetrahedron();
        let bottom = mesh.triangles().next().map(|t| t.normal());
        assert_eq!(bottom, Some(Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let (lo, hi) = tetrahedron().bounds().unwrap();
        assert_eq!(lo, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(hi, Point3::new(1.0, 1.0, 1.0));
        assert!(TubeMesh::default().bounds().is_none());
    }
}
