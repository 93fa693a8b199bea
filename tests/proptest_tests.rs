//! Property-based tests for meshslice
//!
//! These tests use proptest to generate random planes and polygons and verify
//! that the slicing invariants hold across a wide range of inputs.

mod common;

use common::uv_sphere;
use meshslice::ear_clipping::triangulate_polygon;
use meshslice::mesh_ops::{compute_mesh_signed_volume, is_watertight};
use meshslice::{Mesh, Plane, SliceConfig, Slicer, slice};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use std::f64::consts::TAU;
use std::sync::OnceLock;

// ============================================================================
// Generators
// ============================================================================

fn sphere() -> &'static Mesh {
    static SPHERE: OnceLock<Mesh> = OnceLock::new();
    SPHERE.get_or_init(|| uv_sphere(1.0, 12, 16))
}

/// A plane through the inner part of the unit sphere with a random orientation
fn plane_strategy() -> impl Strategy<Value = Plane> {
    (
        prop::array::uniform3(-1.0f64..1.0),
        prop::array::uniform3(-0.5f64..0.5),
    )
        .prop_filter("normal must not vanish", |(n, _)| {
            Vector3::from(*n).norm() > 0.1
        })
        .prop_map(|(n, p)| Plane::new(Vector3::from(n), Point3::from(p)))
}

/// Star-shaped polygon: random radii at evenly spaced angles, counter-clockwise in XY
fn star_polygon_strategy() -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(0.3f64..1.0, 3..40).prop_map(|radii| {
        let n = radii.len();
        radii
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let angle = TAU * i as f64 / n as f64;
                Point3::new(r * angle.cos(), r * angle.sin(), 0.0)
            })
            .collect()
    })
}

/// Keep vertices clear of the plane so no two cut points weld together
fn in_general_position(mesh: &Mesh, plane: &Plane) -> bool {
    let Some(plane) = plane.normalized() else {
        return false;
    };
    mesh.vertices
        .iter()
        .all(|v| plane.distance_to_point(v).abs() > 1e-4)
}

fn polygon_area(points: &[Point3<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The two halves together enclose the source volume
    #[test]
    fn test_volume_is_conserved(plane in plane_strategy()) {
        let mesh = sphere();
        prop_assume!(in_general_position(mesh, &plane));

        let result = slice(mesh, &plane).unwrap();
        let total = compute_mesh_signed_volume(&result.positive)
            + compute_mesh_signed_volume(&result.negative);
        let expected = compute_mesh_signed_volume(mesh);

        prop_assert!(result.report.is_clean(), "{:?}", result.report.warnings);
        prop_assert!((total - expected).abs() < 1e-9, "{} vs {}", total, expected);
    }

    /// Capped halves have no open edges
    #[test]
    fn test_halves_are_watertight(plane in plane_strategy()) {
        let mesh = sphere();
        prop_assume!(in_general_position(mesh, &plane));

        let result = slice(mesh, &plane).unwrap();
        prop_assert!(is_watertight(&result.positive, 1e-9));
        prop_assert!(is_watertight(&result.negative, 1e-9));
    }

    /// Every source triangle is copied once or cut into three
    #[test]
    fn test_triangle_accounting(plane in plane_strategy()) {
        let mesh = sphere();
        prop_assume!(in_general_position(mesh, &plane));

        let result = slice(mesh, &plane).unwrap();
        let report = &result.report;
        let copied = report.positive.copied_triangles + report.negative.copied_triangles;
        let caps = report.positive.cap_triangles + report.negative.cap_triangles;

        prop_assert_eq!(copied + report.cut_triangles, mesh.triangle_count());
        prop_assert_eq!(
            result.positive.triangle_count() + result.negative.triangle_count(),
            copied + 3 * report.cut_triangles + caps
        );
        prop_assert_eq!(report.positive.boundary_edges, report.cut_triangles);
        prop_assert_eq!(report.negative.boundary_edges, report.cut_triangles);
    }

    /// Output vertices never end up on the wrong side of the plane
    #[test]
    fn test_vertices_respect_sides(plane in plane_strategy()) {
        let mesh = sphere();
        let result = Slicer::new(SliceConfig::new().with_capping(false))
            .slice(mesh, &plane)
            .unwrap();
        let unit = plane.normalized().unwrap();

        for v in &result.positive.vertices {
            prop_assert!(unit.distance_to_point(v) >= -1e-9);
        }
        for v in &result.negative.vertices {
            prop_assert!(unit.distance_to_point(v) <= 1e-9);
        }
    }

    /// Ear clipping a simple polygon yields n - 2 triangles covering its area
    #[test]
    fn test_ear_clipping_star_polygons(points in star_polygon_strategy()) {
        let triangles = triangulate_polygon(&points, &Vector3::z()).unwrap();
        prop_assert_eq!(triangles.len(), points.len() - 2);

        // Triangles come out facing -axis, so their signed areas are negative
        let covered: f64 = triangles
            .iter()
            .map(|&[a, b, c]| -polygon_area(&[points[a], points[b], points[c]]))
            .sum();
        prop_assert!((covered - polygon_area(&points)).abs() < 1e-9);
    }
}
