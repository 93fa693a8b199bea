//! Triangle mesh data
//!
//! [`Mesh`] stores parallel per-vertex arrays plus a flat triangle index list.
//! The same type is used for the mesh handed to the slicer and for the two
//! halves it produces.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// A triangle mesh with optional per-vertex attributes
///
/// `normals`, `tangents` and `uvs` are each either empty or exactly one entry
/// per vertex. `triangles` holds vertex indices, three per triangle, in
/// counter-clockwise (front-facing) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Per-vertex normals (optional)
    pub normals: Vec<Vector3<f64>>,
    /// Per-vertex tangents, xyz direction and w handedness (optional)
    pub tangents: Vec<Vector4<f64>>,
    /// Per-vertex texture coordinates (optional)
    pub uvs: Vec<Vector2<f64>>,
    /// Flat list of vertex index triples
    pub triangles: Vec<usize>,
}

/// Optional attributes carried by one vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VertexAttributes {
    /// Vertex normal
    pub normal: Option<Vector3<f64>>,
    /// Vertex tangent
    pub tangent: Option<Vector4<f64>>,
    /// Texture coordinate
    pub uv: Option<Vector2<f64>>,
}

impl VertexAttributes {
    /// Interpolate between two attribute sets at parameter `t`
    ///
    /// Normals are renormalized. Tangents are renormalized in xyz and keep the
    /// sign of the interpolated handedness. An attribute missing on either
    /// side is missing in the result.
    pub fn lerp(&self, other: &VertexAttributes, t: f64) -> VertexAttributes {
        let normal = match (self.normal, other.normal) {
            (Some(a), Some(b)) => {
                let n = a.lerp(&b, t);
                Some(n.try_normalize(0.0).unwrap_or(n))
            }
            _ => None,
        };

        let tangent = match (self.tangent, other.tangent) {
            (Some(a), Some(b)) => {
                let blended = a.lerp(&b, t);
                let xyz = blended.xyz();
                let xyz = xyz.try_normalize(0.0).unwrap_or(xyz);
                let w = if blended.w < 0.0 { -1.0 } else { 1.0 };
                Some(Vector4::new(xyz.x, xyz.y, xyz.z, w))
            }
            _ => None,
        };

        let uv = match (self.uv, other.uv) {
            (Some(a), Some(b)) => Some(a.lerp(&b, t)),
            _ => None,
        };

        VertexAttributes {
            normal,
            tangent,
            uv,
        }
    }
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from positions and a flat triangle index list
    pub fn from_triangles(vertices: Vec<Point3<f64>>, triangles: Vec<usize>) -> Self {
        Self {
            vertices,
            triangles,
            ..Self::default()
        }
    }

    /// Attach per-vertex normals
    pub fn with_normals(mut self, normals: Vec<Vector3<f64>>) -> Self {
        self.normals = normals;
        self
    }

    /// Attach per-vertex tangents
    pub fn with_tangents(mut self, tangents: Vec<Vector4<f64>>) -> Self {
        self.tangents = tangents;
        self
    }

    /// Attach per-vertex texture coordinates
    pub fn with_uvs(mut self, uvs: Vec<Vector2<f64>>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// True if the mesh has neither vertices nor triangles
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Whether normals are present
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether tangents are present
    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }

    /// Whether texture coordinates are present
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// The vertex indices of triangle `index`
    ///
    /// # Panics
    /// Panics if `index >= self.triangle_count()`.
    pub fn triangle(&self, index: usize) -> [usize; 3] {
        let base = index * 3;
        [
            self.triangles[base],
            self.triangles[base + 1],
            self.triangles[base + 2],
        ]
    }

    /// Iterate over all triangles as index triples
    pub fn triangle_iter(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
    }

    /// The optional attributes of vertex `index`
    pub fn attributes(&self, index: usize) -> VertexAttributes {
        VertexAttributes {
            normal: self.normals.get(index).copied(),
            tangent: self.tangents.get(index).copied(),
            uv: self.uvs.get(index).copied(),
        }
    }

    /// Check the structural invariants of the mesh
    ///
    /// # Errors
    /// Returns [`Error::InvalidMesh`] if:
    /// - the index list length is not a multiple of 3
    /// - any triangle index is out of range
    /// - an attribute array is neither empty nor one entry per vertex
    /// - a vertex position is NaN or infinite
    pub fn validate(&self) -> Result<()> {
        if self.triangles.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "triangle index list has {} entries, which is not a multiple of 3",
                self.triangles.len()
            )));
        }

        let vertex_count = self.vertices.len();
        if self.has_normals() && self.normals.len() != vertex_count {
            return Err(Error::attribute_length(
                "normals",
                self.normals.len(),
                vertex_count,
            ));
        }
        if self.has_tangents() && self.tangents.len() != vertex_count {
            return Err(Error::attribute_length(
                "tangents",
                self.tangents.len(),
                vertex_count,
            ));
        }
        if self.has_uvs() && self.uvs.len() != vertex_count {
            return Err(Error::attribute_length("uvs", self.uvs.len(), vertex_count));
        }

        if let Some((i, v)) = self
            .vertices
            .iter()
            .enumerate()
            .find(|(_, v)| !v.coords.iter().all(|c| c.is_finite()))
        {
            return Err(Error::InvalidMesh(format!(
                "vertex {} has non-finite position ({}, {}, {})",
                i, v.x, v.y, v.z
            )));
        }

        for (i, tri) in self.triangle_iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&index| index >= vertex_count) {
                return Err(Error::index_out_of_range(i, index, vertex_count));
            }
        }

        Ok(())
    }
}
