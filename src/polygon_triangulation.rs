//! Cap triangulation through earcut
//!
//! This module is the alternative to [`crate::ear_clipping`] for capping
//! cross-sections. A boundary loop is projected onto two in-plane axes and
//! handed to the `earcutr` library, a Rust port of the earcut.js polygon
//! triangulation library from MapBox.
//!
//! Holes are not supported; every loop is triangulated on its own.

use crate::plane::orthonormal_basis;
use nalgebra::{Point2, Point3, Vector3};

/// Error type for polygon triangulation operations
#[derive(Debug, thiserror::Error)]
pub enum TriangulationError {
    /// Polygon has too few vertices to triangulate
    #[error("Polygon has too few vertices: {0} (minimum 3 required)")]
    TooFewVertices(usize),

    /// Triangulation failed
    #[error("Triangulation failed: {0}")]
    TriangulationFailed(String),
}

/// Triangulate a simple 2D polygon
///
/// Converts a polygon into a set of triangles represented as indices into
/// the vertex array. Each consecutive triplet of indices is one triangle.
///
/// # Errors
///
/// Returns an error if:
/// - The polygon has fewer than 3 vertices
/// - The triangulation algorithm fails or produces nothing
///
/// # Example
///
/// ```
/// use meshslice::polygon_triangulation::triangulate_simple;
/// use nalgebra::Point2;
///
/// let square = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(10.0, 0.0),
///     Point2::new(10.0, 10.0),
///     Point2::new(0.0, 10.0),
/// ];
///
/// let triangles = triangulate_simple(&square).expect("Failed to triangulate");
/// assert_eq!(triangles.len(), 6); // 2 triangles x 3 indices
/// ```
pub fn triangulate_simple(polygon: &[Point2<f64>]) -> Result<Vec<usize>, TriangulationError> {
    if polygon.len() < 3 {
        return Err(TriangulationError::TooFewVertices(polygon.len()));
    }

    // Flat coordinate array [x0, y0, x1, y1, ...]
    let mut coords = Vec::with_capacity(polygon.len() * 2);
    for vertex in polygon {
        coords.push(vertex.x);
        coords.push(vertex.y);
    }

    // No holes; the third parameter (2) is the coordinate dimension
    let hole_indices: Vec<usize> = Vec::new();
    let result = earcutr::earcut(&coords, &hole_indices, 2)
        .map_err(|e| TriangulationError::TriangulationFailed(format!("Earcut error: {}", e)))?;

    if result.is_empty() {
        return Err(TriangulationError::TriangulationFailed(
            "Earcut returned no triangles".to_string(),
        ));
    }

    Ok(result)
}

/// Triangulate a planar 3D loop that winds counter-clockwise about `axis`
///
/// The loop is projected onto the plane perpendicular to `axis`. Output
/// triangles are local indices wound so their normal points along `-axis`,
/// matching [`crate::ear_clipping::clip_ears`]. A loop with no area yields
/// no triangles and no error.
pub fn triangulate_loop(
    points: &[Point3<f64>],
    axis: &Vector3<f64>,
) -> Result<Vec<[usize; 3]>, TriangulationError> {
    if points.len() < 3 {
        return Err(TriangulationError::TooFewVertices(points.len()));
    }

    let (u, v) = orthonormal_basis(axis);
    let origin = points[0];
    let projected: Vec<Point2<f64>> = points
        .iter()
        .map(|p| {
            let offset = p - origin;
            Point2::new(offset.dot(&u), offset.dot(&v))
        })
        .collect();

    let twice_area: f64 = (0..projected.len())
        .map(|i| {
            let a = projected[i];
            let b = projected[(i + 1) % projected.len()];
            a.x * b.y - b.x * a.y
        })
        .sum();
    let scale = projected
        .iter()
        .map(|p| p.coords.norm())
        .fold(0.0, f64::max);
    if twice_area.abs() <= 1e-10 * scale * scale {
        log::debug!("skipping zero-area loop of {} vertices", points.len());
        return Ok(Vec::new());
    }

    let flat = triangulate_simple(&projected)?;
    let triangles = flat
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (projected[t[0]], projected[t[1]], projected[t[2]]);
            let ccw = (b - a).perp(&(c - a)) > 0.0;
            if ccw {
                [t[2], t[1], t[0]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect();

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_simple_square() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];

        let triangles = triangulate_simple(&vertices).expect("Failed to triangulate square");

        // A square should produce 2 triangles (6 indices)
        assert_eq!(triangles.len(), 6, "Expected 2 triangles (6 indices)");
        for &idx in &triangles {
            assert!(idx < 4, "Triangle index {} out of bounds", idx);
        }
    }

    #[test]
    fn test_triangulate_simple_pentagon() {
        let vertices = vec![
            Point2::new(0.0, 5.0),
            Point2::new(4.75, 1.54),
            Point2::new(2.94, -4.05),
            Point2::new(-2.94, -4.05),
            Point2::new(-4.75, 1.54),
        ];

        let triangles = triangulate_simple(&vertices).expect("Failed to triangulate pentagon");
        assert_eq!(triangles.len(), 9, "Expected 3 triangles (9 indices)");
    }

    #[test]
    fn test_triangulate_too_few_vertices() {
        let vertices = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];

        match triangulate_simple(&vertices) {
            Err(TriangulationError::TooFewVertices(n)) => assert_eq!(n, 2),
            other => panic!("Expected TooFewVertices error, got {:?}", other),
        }
    }

    #[test]
    fn test_triangulate_loop_faces_negative_axis() {
        // Square in the y = 0 plane, counter-clockwise seen from +Y
        let points = vec![
            Point3::new(-0.5, 0.0, -0.5),
            Point3::new(-0.5, 0.0, 0.5),
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(0.5, 0.0, -0.5),
        ];
        let axis = Vector3::y();

        let triangles = triangulate_loop(&points, &axis).expect("Failed to triangulate loop");
        assert_eq!(triangles.len(), 2);

        let mut area = 0.0;
        for t in &triangles {
            let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
            let normal = (b - a).cross(&(c - a));
            assert!(normal.dot(&axis) < 0.0, "Triangle {:?} should face -axis", t);
            area += normal.norm() * 0.5;
        }
        assert!((area - 1.0).abs() < 1e-12, "Cap area: {}", area);
    }

    #[test]
    fn test_triangulate_loop_collinear_is_empty() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let triangles = triangulate_loop(&points, &Vector3::z()).unwrap();
        assert!(triangles.is_empty());
    }
}
