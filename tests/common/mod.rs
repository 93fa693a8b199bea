//! Shared mesh fixtures for integration tests
//!
//! Every closed fixture is wound counter-clockwise seen from outside, so its
//! signed volume is positive.

#![allow(dead_code)]

use meshslice::Mesh;
use meshslice::ear_clipping::triangulate_polygon;
use meshslice::mesh_ops::find_open_edges;
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::f64::consts::{PI, TAU};

/// Axis-aligned cube centred on the origin, 8 shared vertices and 12 triangles
pub fn cube(size: f64) -> Mesh {
    let h = size / 2.0;
    Mesh::from_triangles(
        vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ],
        vec![
            0, 2, 1, 0, 3, 2, // back (-z)
            4, 5, 6, 4, 6, 7, // front (+z)
            0, 1, 5, 0, 5, 4, // bottom (-y)
            2, 3, 7, 2, 7, 6, // top (+y)
            0, 4, 7, 0, 7, 3, // left (-x)
            1, 2, 6, 1, 6, 5, // right (+x)
        ],
    )
}

/// Tetrahedron with its base on y = -1 and apex at y = 1
pub fn tetrahedron() -> Mesh {
    Mesh::from_triangles(
        vec![
            Point3::new(0.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3],
    )
}

/// Open strip of `quads` unit squares in the z = 0 plane, spanning y in [-1, 1]
pub fn quad_strip(quads: usize) -> Mesh {
    let mut vertices = Vec::with_capacity((quads + 1) * 2);
    for i in 0..=quads {
        vertices.push(Point3::new(i as f64, -1.0, 0.0));
        vertices.push(Point3::new(i as f64, 1.0, 0.0));
    }

    let mut triangles = Vec::with_capacity(quads * 6);
    for i in 0..quads {
        let (b0, t0, b1, t1) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        triangles.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
    }

    Mesh::from_triangles(vertices, triangles)
}

/// UV sphere with poles on the Y axis
///
/// Carries unit normals, tangents along the parallels and equirectangular UVs.
pub fn uv_sphere(radius: f64, stacks: usize, sectors: usize) -> Mesh {
    let mut vertices = vec![Point3::new(0.0, radius, 0.0)];
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        for j in 0..sectors {
            let theta = TAU * j as f64 / sectors as f64;
            vertices.push(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }
    vertices.push(Point3::new(0.0, -radius, 0.0));
    let south = vertices.len() - 1;

    let ring = |i: usize, j: usize| 1 + (i - 1) * sectors + j % sectors;

    let mut triangles = Vec::new();
    for j in 0..sectors {
        triangles.extend_from_slice(&[0, ring(1, j + 1), ring(1, j)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..sectors {
            let (a, b) = (ring(i, j), ring(i, j + 1));
            let (c, d) = (ring(i + 1, j), ring(i + 1, j + 1));
            triangles.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }
    for j in 0..sectors {
        triangles.extend_from_slice(&[south, ring(stacks - 1, j), ring(stacks - 1, j + 1)]);
    }

    let normals: Vec<Vector3<f64>> = vertices.iter().map(|v| v.coords / radius).collect();
    let tangents = vertices
        .iter()
        .map(|v| {
            let t = Vector3::new(-v.z, 0.0, v.x)
                .try_normalize(1e-12)
                .unwrap_or_else(Vector3::x);
            Vector4::new(t.x, t.y, t.z, 1.0)
        })
        .collect();
    let uvs = normals
        .iter()
        .map(|n| Vector2::new(0.5 + n.z.atan2(n.x) / TAU, 0.5 + n.y.asin() / PI))
        .collect();

    Mesh::from_triangles(vertices, triangles)
        .with_normals(normals)
        .with_tangents(tangents)
        .with_uvs(uvs)
}

/// Closed prism extruding a counter-clockwise polygon in the XY plane from z = 0 to `height`
pub fn prism(polygon: &[(f64, f64)], height: f64) -> Mesh {
    let n = polygon.len();
    let bottom: Vec<Point3<f64>> = polygon
        .iter()
        .map(|&(x, y)| Point3::new(x, y, 0.0))
        .collect();

    let mut vertices = bottom.clone();
    vertices.extend(bottom.iter().map(|p| Point3::new(p.x, p.y, height)));

    let mut triangles = Vec::new();

    // Ear clipping about +Z yields triangles facing -Z
    let cap = triangulate_polygon(&bottom, &Vector3::z()).expect("prism outline must be simple");
    for [a, b, c] in &cap {
        triangles.extend_from_slice(&[*a, *b, *c]);
        triangles.extend_from_slice(&[c + n, b + n, a + n]);
    }

    for i in 0..n {
        let j = (i + 1) % n;
        triangles.extend_from_slice(&[i, j, j + n, i, j + n, i + n]);
    }

    Mesh::from_triangles(vertices, triangles)
}

/// Copy of `mesh` with no vertex shared between triangles
///
/// Every triangle gets its own three vertices carrying the flat face normal,
/// the way hard-edged meshes are usually exported.
pub fn flat_shaded(mesh: &Mesh) -> Mesh {
    let mut vertices = Vec::with_capacity(mesh.triangles.len());
    let mut normals = Vec::with_capacity(mesh.triangles.len());

    for [a, b, c] in mesh.triangle_iter() {
        let (pa, pb, pc) = (mesh.vertices[a], mesh.vertices[b], mesh.vertices[c]);
        let normal = (pb - pa)
            .cross(&(pc - pa))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        vertices.extend_from_slice(&[pa, pb, pc]);
        normals.extend_from_slice(&[normal; 3]);
    }

    let triangles = (0..vertices.len()).collect();
    Mesh::from_triangles(vertices, triangles).with_normals(normals)
}

/// L-shaped outline with area 3
pub fn l_shape() -> Vec<(f64, f64)> {
    vec![
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]
}

/// Open edges of a mesh as position pairs, for order-independent comparison
pub fn open_edge_positions(mesh: &Mesh) -> Vec<(Point3<f64>, Point3<f64>)> {
    find_open_edges(mesh, 1e-9)
        .into_iter()
        .map(|(a, b)| (mesh.vertices[a], mesh.vertices[b]))
        .collect()
}

/// Assert two floats agree within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}
