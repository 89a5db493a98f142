//! # Procedural Geometry Generation
//!
//! Primitive shapes and the [`GeometryData`] container the archetype
//! builders composite them from. Everything here is pure CPU work: shapes
//! are generated with normals, positioned with the transform helpers, and
//! only later uploaded by the renderer.

pub mod primitives;

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Moves every vertex by the given offset. Normals are unaffected.
    pub fn translated(mut self, dx: f32, dy: f32, dz: f32) -> Self {
        for v in &mut self.vertices {
            v[0] += dx;
            v[1] += dy;
            v[2] += dz;
        }
        self
    }

    /// Uniformly scales every vertex about the origin.
    pub fn scaled(mut self, factor: f32) -> Self {
        for v in &mut self.vertices {
            v[0] *= factor;
            v[1] *= factor;
            v[2] *= factor;
        }
        self
    }

    /// Axis-aligned bounding box, `None` for empty geometry.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        Some((min, max))
    }

    /// Convert to the vertex format used by the renderer.
    pub fn to_vertices(&self) -> Vec<super::vertex::Vertex3D> {
        use super::vertex::Vertex3D;

        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}
