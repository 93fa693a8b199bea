//! Triangle mesh analysis
//!
//! This module provides geometric queries used to check slice results:
//! - Signed volume
//! - Face and vertex normals
//! - Open edge detection (watertightness)
//!
//! With the `mesh-ops` feature, volume, bounding box and conversion to a
//! collision mesh go through parry3d.

use crate::builder::QuantizedPoint;
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

#[cfg(feature = "mesh-ops")]
use crate::error::{Error, Result};
#[cfg(feature = "mesh-ops")]
use parry3d::mass_properties::MassProperties;
#[cfg(feature = "mesh-ops")]
use parry3d::shape::TriMesh as ParryTriMesh;

/// Compute the signed volume of a mesh using the divergence theorem
///
/// Returns the signed volume in cubic units. For a watertight mesh with
/// counter-clockwise winding the volume is positive. Negative volume
/// indicates inverted triangles.
///
/// Triangles with out-of-range indices are skipped (caught by
/// [`Mesh::validate`]).
pub fn compute_mesh_signed_volume(mesh: &Mesh) -> f64 {
    let vertex_count = mesh.vertices.len();
    let mut volume = 0.0_f64;

    for [a, b, c] in mesh.triangle_iter() {
        if a >= vertex_count || b >= vertex_count || c >= vertex_count {
            continue;
        }

        let v1 = mesh.vertices[a].coords;
        let v2 = mesh.vertices[b].coords;
        let v3 = mesh.vertices[c].coords;

        // Signed volume of the tetrahedron (origin, v1, v2, v3), times 6
        volume += v1.dot(&v2.cross(&v3));
    }

    volume / 6.0
}

/// Calculate the unit normal of a triangle face
///
/// Returns the zero vector for degenerate (zero-area) triangles.
///
/// # Example
/// ```
/// use meshslice::mesh_ops::calculate_face_normal;
/// use nalgebra::{Point3, Vector3};
///
/// let normal = calculate_face_normal(
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(1.0, 0.0, 0.0),
///     &Point3::new(0.0, 1.0, 0.0),
/// );
/// assert_eq!(normal, Vector3::z());
/// ```
pub fn calculate_face_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let cross = (v1 - v0).cross(&(v2 - v0));
    cross.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Calculate area-weighted vertex normals for an entire mesh
///
/// Each vertex gets the normalized sum of the (unnormalized) normals of its
/// adjacent faces. Vertices not used by any triangle get the zero vector.
/// The result can be attached with [`Mesh::with_normals`] before slicing.
pub fn calculate_vertex_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let vertex_count = mesh.vertices.len();
    let mut normals = vec![Vector3::zeros(); vertex_count];

    for tri in mesh.triangle_iter() {
        if tri.iter().any(|&i| i >= vertex_count) {
            continue;
        }

        let [a, b, c] = tri;
        // Magnitude is twice the triangle area
        let weighted = (mesh.vertices[b] - mesh.vertices[a])
            .cross(&(mesh.vertices[c] - mesh.vertices[a]));
        for i in tri {
            normals[i] += weighted;
        }
    }

    for normal in &mut normals {
        *normal = normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    }
    normals
}

/// Find directed edges that have no opposite partner
///
/// Edges are compared by position, snapped to a lattice of step `tolerance`,
/// so seams between distinct vertices at the same spot (such as the fan and
/// cap vertices along a cut) are not reported. Each returned pair is
/// `(from, to)` output vertex indices of an edge whose reverse is missing or
/// whose count does not match. Degenerate edges are ignored.
pub fn find_open_edges(mesh: &Mesh, tolerance: f64) -> Vec<(usize, usize)> {
    let vertex_count = mesh.vertices.len();
    let key = |i: usize| QuantizedPoint::new(&mesh.vertices[i], tolerance);

    let mut directed: HashMap<(QuantizedPoint, QuantizedPoint), (usize, (usize, usize))> =
        HashMap::new();
    for tri in mesh.triangle_iter() {
        if tri.iter().any(|&i| i >= vertex_count) {
            continue;
        }
        for (from, to) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let (kf, kt) = (key(from), key(to));
            if kf == kt {
                continue;
            }
            directed.entry((kf, kt)).or_insert((0, (from, to))).0 += 1;
        }
    }

    let mut open: Vec<(usize, usize)> = directed
        .iter()
        .filter(|((kf, kt), (count, _))| {
            let reverse = directed.get(&(*kt, *kf)).map_or(0, |(c, _)| *c);
            reverse != *count
        })
        .map(|(_, (_, edge))| *edge)
        .collect();
    open.sort_unstable();
    open
}

/// Whether every edge of the mesh is matched by an opposite edge
///
/// See [`find_open_edges`] for how edges are compared.
pub fn is_watertight(mesh: &Mesh, tolerance: f64) -> bool {
    find_open_edges(mesh, tolerance).is_empty()
}

#[cfg(feature = "mesh-ops")]
fn trimesh_buffers(mesh: &Mesh) -> (Vec<Point3<f32>>, Vec<[u32; 3]>) {
    let vertices = mesh
        .vertices
        .iter()
        .map(|v| Point3::new(v.x as f32, v.y as f32, v.z as f32))
        .collect();

    let indices = mesh
        .triangle_iter()
        .map(|[a, b, c]| [a as u32, b as u32, c as u32])
        .collect();

    (vertices, indices)
}

/// Compute the unsigned volume of a mesh using parry3d
///
/// Returns the absolute volume in cubic units, computed in single precision.
#[cfg(feature = "mesh-ops")]
pub fn compute_mesh_volume(mesh: &Mesh) -> Result<f64> {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return Ok(0.0);
    }
    mesh.validate()?;

    let (vertices, indices) = trimesh_buffers(mesh);

    // With density 1.0 the mass is the volume
    let mass_props = MassProperties::from_trimesh(1.0, &vertices, &indices);
    if mass_props.inv_mass == 0.0 {
        return Ok(0.0);
    }
    Ok((1.0 / mass_props.inv_mass as f64).abs())
}

/// Compute the axis-aligned bounding box of a mesh using parry3d
///
/// Returns the minimum and maximum corners.
#[cfg(feature = "mesh-ops")]
pub fn compute_mesh_aabb(mesh: &Mesh) -> Result<(Point3<f64>, Point3<f64>)> {
    let trimesh = to_trimesh(mesh)?;
    let aabb = trimesh.local_aabb();

    Ok((
        Point3::new(aabb.mins.x as f64, aabb.mins.y as f64, aabb.mins.z as f64),
        Point3::new(aabb.maxs.x as f64, aabb.maxs.y as f64, aabb.maxs.z as f64),
    ))
}

/// Convert a mesh to a parry3d [`TriMesh`](parry3d::shape::TriMesh)
///
/// Useful for collision queries on slice results.
///
/// # Errors
/// Returns [`Error::InvalidMesh`] if the mesh is invalid or has no triangles.
#[cfg(feature = "mesh-ops")]
pub fn to_trimesh(mesh: &Mesh) -> Result<ParryTriMesh> {
    mesh.validate()?;
    if mesh.triangles.is_empty() {
        return Err(Error::InvalidMesh(
            "Cannot build a collision mesh with no triangles".to_string(),
        ));
    }

    let (vertices, indices) = trimesh_buffers(mesh);
    ParryTriMesh::new(vertices, indices)
        .map_err(|e| Error::InvalidMesh(format!("parry3d rejected the mesh: {:?}", e)))
}
