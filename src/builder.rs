//! Incremental construction of one output mesh
//!
//! A slice runs two [`MeshBuilder`]s side by side, one per half-space. Each
//! builder owns its output arrays and the [`BoundaryGraph`] of its future cap.

use crate::boundary::{BoundaryGraph, LoopError};
use crate::config::{CapMethod, SliceConfig};
use crate::ear_clipping::{EarClipError, clip_ears};
use crate::error::SliceWarning;
use crate::mesh::{Mesh, VertexAttributes};
use crate::plane::{Plane, Side};
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::collections::HashMap;

/// Unordered pair of source vertex indices identifying one mesh edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VertexPair(usize, usize);

impl VertexPair {
    pub(crate) fn new(a: usize, b: usize) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// The smaller index
    pub(crate) fn low(&self) -> usize {
        self.0
    }

    /// The larger index
    pub(crate) fn high(&self) -> usize {
        self.1
    }
}

/// A position snapped to an integer lattice, usable as a hash key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct QuantizedPoint([i64; 3]);

impl QuantizedPoint {
    pub(crate) fn new(point: &Point3<f64>, tolerance: f64) -> Self {
        let snap = |c: f64| (c / tolerance).round() as i64;
        Self([snap(point.x), snap(point.y), snap(point.z)])
    }
}

/// What capping did on one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CapStats {
    pub loops: usize,
    pub degenerate_loops: usize,
    pub triangles: usize,
}

pub(crate) struct MeshBuilder<'a> {
    source: &'a Mesh,
    side: Side,
    plane: Plane,
    weld_tolerance: f64,
    /// Source vertex index -> output vertex index
    copied: HashMap<usize, usize>,
    /// Welded cap boundary vertices
    boundary_lookup: HashMap<QuantizedPoint, usize>,
    /// Normal of this side's cap, pointing out of the half-space
    cap_normal: Vector3<f64>,
    cap_tangent: Vector4<f64>,
    output: Mesh,
    boundary: BoundaryGraph,
}

impl<'a> MeshBuilder<'a> {
    /// `plane` must have a unit normal
    pub(crate) fn new(
        source: &'a Mesh,
        side: Side,
        plane: Plane,
        weld_tolerance: f64,
    ) -> Self {
        let cap_normal = plane.normal * -side.sign();
        // Tangent follows increasing U of the planar projection. The positive
        // cap faces -n, where the projected UVs are mirrored.
        let (u, _) = plane.coordinate_axes();
        let handedness = -side.sign();

        Self {
            source,
            side,
            plane,
            weld_tolerance,
            copied: HashMap::new(),
            boundary_lookup: HashMap::new(),
            cap_normal,
            cap_tangent: Vector4::new(u.x, u.y, u.z, handedness),
            output: Mesh::default(),
            boundary: BoundaryGraph::new(),
        }
    }

    pub(crate) fn side(&self) -> Side {
        self.side
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.output.vertex_count()
    }

    /// Output index of a source vertex, copying it on first use
    pub(crate) fn add_point_copied_from_source(&mut self, source_index: usize) -> usize {
        if let Some(&index) = self.copied.get(&source_index) {
            return index;
        }
        let index = self.add_point(
            self.source.vertices[source_index],
            self.source.attributes(source_index),
        );
        self.copied.insert(source_index, index);
        index
    }

    /// Append a new vertex
    ///
    /// Only the attribute channels present on the source mesh are stored;
    /// a missing value in a present channel is written as zero.
    pub(crate) fn add_point(
        &mut self,
        position: Point3<f64>,
        attributes: VertexAttributes,
    ) -> usize {
        let index = self.output.vertices.len();
        self.output.vertices.push(position);
        if self.source.has_normals() {
            self.output
                .normals
                .push(attributes.normal.unwrap_or_else(Vector3::zeros));
        }
        if self.source.has_tangents() {
            self.output
                .tangents
                .push(attributes.tangent.unwrap_or_else(Vector4::zeros));
        }
        if self.source.has_uvs() {
            self.output
                .uvs
                .push(attributes.uv.unwrap_or_else(Vector2::zeros));
        }
        index
    }

    /// Output index of the cap vertex at `position`, welding coincident points
    ///
    /// Cap vertices carry the flat cap normal, so they are kept apart from the
    /// fan vertex at the same position.
    pub(crate) fn add_boundary_point(&mut self, position: Point3<f64>) -> usize {
        let key = QuantizedPoint::new(&position, self.weld_tolerance);
        if let Some(&index) = self.boundary_lookup.get(&key) {
            return index;
        }

        let attributes = VertexAttributes {
            normal: Some(self.cap_normal),
            tangent: Some(self.cap_tangent),
            uv: Some(self.plane.project(&position)),
        };
        let index = self.add_point(position, attributes);
        self.boundary_lookup.insert(key, index);
        index
    }

    pub(crate) fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        let count = self.vertex_count();
        debug_assert!(a < count && b < count && c < count);
        self.output.triangles.extend_from_slice(&[a, b, c]);
    }

    /// Record that the cap outline runs from `a` to `b`
    ///
    /// `a == b` happens when a cut collapses to a single point; it is kept as
    /// an isolated boundary point and never joins a loop.
    pub(crate) fn register_boundary_edge(&mut self, a: usize, b: usize) {
        if a == b {
            log::debug!("{} side: cut collapsed to boundary point {}", self.side, a);
            self.boundary.add_point(a);
        } else {
            self.boundary.add_edge(a, b);
        }
    }

    pub(crate) fn boundary_edge_count(&self) -> usize {
        self.boundary.edge_count()
    }

    pub(crate) fn isolated_point_count(&self) -> usize {
        self.boundary.isolated_count()
    }

    /// Close every boundary loop with cap triangles
    ///
    /// Failures are pushed onto `warnings`; they never stop the other loops.
    pub(crate) fn cap(
        &mut self,
        config: &SliceConfig,
        warnings: &mut Vec<SliceWarning>,
    ) -> CapStats {
        let side = self.side;
        let set = self.boundary.loops();
        let mut stats = CapStats {
            degenerate_loops: set.degenerate,
            ..CapStats::default()
        };

        for err in set.errors {
            let warning = match err {
                LoopError::SelfConnected { vertex } => {
                    SliceWarning::SelfConnectedVertex { side, vertex }
                }
                LoopError::Open { start, end } => SliceWarning::OpenBoundary { side, start, end },
                LoopError::Tangled { start, at } => {
                    SliceWarning::TangledBoundary { side, start, at }
                }
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        // Loops wind counter-clockwise about the opposite of the cap normal
        let axis = -self.cap_normal;

        for (loop_index, boundary_loop) in set.loops.iter().enumerate() {
            let indices = boundary_loop.vertices();
            let points: Vec<Point3<f64>> =
                indices.iter().map(|&i| self.output.vertices[i]).collect();

            let (triangles, warning) = match config.cap_method() {
                CapMethod::EarClipping => {
                    let output = clip_ears(&points, &axis, config.max_cap_iterations());
                    let warning = output.error.map(|err| match err {
                        EarClipError::IterationLimit { limit, remaining } => {
                            SliceWarning::CapIterationLimit {
                                side,
                                loop_index,
                                limit,
                                remaining,
                            }
                        }
                        EarClipError::NoEar { remaining } => SliceWarning::NoEarFound {
                            side,
                            loop_index,
                            remaining,
                        },
                        other => SliceWarning::CapTriangulationFailed {
                            side,
                            loop_index,
                            reason: other.to_string(),
                        },
                    });
                    (output.triangles, warning)
                }
                #[cfg(feature = "polygon-ops")]
                CapMethod::Earcut => {
                    match crate::polygon_triangulation::triangulate_loop(&points, &axis) {
                        Ok(triangles) => (triangles, None),
                        Err(err) => (
                            Vec::new(),
                            Some(SliceWarning::CapTriangulationFailed {
                                side,
                                loop_index,
                                reason: err.to_string(),
                            }),
                        ),
                    }
                }
            };

            for [a, b, c] in &triangles {
                self.add_triangle(indices[*a], indices[*b], indices[*c]);
            }
            stats.loops += 1;
            stats.triangles += triangles.len();

            if let Some(warning) = warning {
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }

        stats
    }

    /// Hand over the finished mesh
    pub(crate) fn finish(self) -> Mesh {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Mesh {
        Mesh::from_triangles(
            vec![
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
        .with_normals(vec![Vector3::z(); 3])
    }

    #[test]
    fn test_vertex_pair_is_unordered() {
        assert_eq!(VertexPair::new(3, 7), VertexPair::new(7, 3));
        let pair = VertexPair::new(9, 2);
        assert_eq!((pair.low(), pair.high()), (2, 9));
    }

    #[test]
    fn test_quantized_point_welds_within_tolerance() {
        let a = QuantizedPoint::new(&Point3::new(1.0, 2.0, 3.0), 1e-3);
        let b = QuantizedPoint::new(&Point3::new(1.0001, 2.0, 2.9999), 1e-3);
        let c = QuantizedPoint::new(&Point3::new(1.01, 2.0, 3.0), 1e-3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_copied_vertices_are_deduplicated() {
        let mesh = source();
        let mut builder = MeshBuilder::new(&mesh, Side::Positive, Plane::default(), 1e-6);

        let first = builder.add_point_copied_from_source(2);
        let again = builder.add_point_copied_from_source(2);
        let other = builder.add_point_copied_from_source(0);
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(builder.vertex_count(), 2);

        let out = builder.finish();
        assert_eq!(out.vertices[first], mesh.vertices[2]);
        assert_eq!(out.normals.len(), 2);
        assert!(out.tangents.is_empty());
        assert!(out.uvs.is_empty());
    }

    #[test]
    fn test_add_point_always_allocates() {
        let mesh = source();
        let mut builder = MeshBuilder::new(&mesh, Side::Negative, Plane::default(), 1e-6);
        let attrs = VertexAttributes {
            normal: Some(Vector3::x()),
            ..VertexAttributes::default()
        };
        let a = builder.add_point(Point3::origin(), attrs);
        let b = builder.add_point(Point3::origin(), attrs);
        assert_ne!(a, b);
    }

    #[test]
    fn test_boundary_points_weld_and_carry_cap_normal() {
        let mesh = source();
        let mut positive = MeshBuilder::new(&mesh, Side::Positive, Plane::default(), 1e-6);
        let mut negative = MeshBuilder::new(&mesh, Side::Negative, Plane::default(), 1e-6);

        let p = Point3::new(0.25, 0.0, 0.0);
        let a = positive.add_boundary_point(p);
        let b = positive.add_boundary_point(Point3::new(0.25 + 1e-9, 0.0, 0.0));
        assert_eq!(a, b);

        // A fan vertex at the same spot stays separate
        let fan = positive.add_point(p, mesh.attributes(0));
        assert_ne!(a, fan);

        let n = negative.add_boundary_point(p);
        let positive = positive.finish();
        let negative = negative.finish();
        assert_eq!(positive.normals[a], -Vector3::y());
        assert_eq!(negative.normals[n], Vector3::y());
    }

    #[test]
    fn test_cap_tangent_follows_uv_direction() {
        let mesh = source()
            .with_tangents(vec![Vector4::new(1.0, 0.0, 0.0, 1.0); 3])
            .with_uvs(vec![Vector2::zeros(); 3]);
        let plane = Plane::new(Vector3::new(0.3, 1.0, -0.4).normalize(), Point3::origin());
        let (u, v) = plane.coordinate_axes();

        for side in [Side::Positive, Side::Negative] {
            let mut builder = MeshBuilder::new(&mesh, side, plane, 1e-6);
            let origin = builder.add_boundary_point(Point3::origin());
            let along_u = builder.add_boundary_point(Point3::origin() + u);
            let out = builder.finish();

            let tangent = out.tangents[origin];
            let t = tangent.xyz();
            let du = out.uvs[along_u] - out.uvs[origin];
            assert!((du.x - 1.0).abs() < 1e-12 && du.y.abs() < 1e-12);
            assert!((t - u).norm() < 1e-12, "{} side tangent {:?}", side, t);

            // The bitangent rebuilt from normal, tangent and handedness is +V
            let bitangent = out.normals[origin].cross(&t) * tangent.w;
            assert!((bitangent - v).norm() < 1e-12, "{} side bitangent", side);
        }
    }

    #[test]
    fn test_self_edge_becomes_isolated_point() {
        let mesh = source();
        let mut builder = MeshBuilder::new(&mesh, Side::Positive, Plane::default(), 1e-6);
        let a = builder.add_boundary_point(Point3::origin());
        builder.register_boundary_edge(a, a);
        assert_eq!(builder.isolated_point_count(), 1);
        assert_eq!(builder.boundary_edge_count(), 0);

        let mut warnings = Vec::new();
        let stats = builder.cap(&SliceConfig::default(), &mut warnings);
        assert_eq!(stats, CapStats::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cap_square_loop() {
        let mesh = source();
        let mut builder = MeshBuilder::new(&mesh, Side::Positive, Plane::default(), 1e-6);

        // Counter-clockwise seen from +Y
        let corners = [
            Point3::new(-0.5, 0.0, -0.5),
            Point3::new(-0.5, 0.0, 0.5),
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(0.5, 0.0, -0.5),
        ];
        let ids: Vec<usize> = corners
            .iter()
            .map(|&p| builder.add_boundary_point(p))
            .collect();
        for i in 0..4 {
            builder.register_boundary_edge(ids[i], ids[(i + 1) % 4]);
        }

        let mut warnings = Vec::new();
        let stats = builder.cap(&SliceConfig::default(), &mut warnings);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(stats.loops, 1);
        assert_eq!(stats.triangles, 2);

        let out = builder.finish();
        for tri in out.triangle_iter() {
            let (a, b, c) = (
                out.vertices[tri[0]],
                out.vertices[tri[1]],
                out.vertices[tri[2]],
            );
            let normal = (b - a).cross(&(c - a));
            assert!(normal.y < 0.0, "Positive cap should face -Y, got {:?}", normal);
        }
    }

    #[test]
    fn test_cap_reports_open_boundary() {
        let mesh = source();
        let mut builder = MeshBuilder::new(&mesh, Side::Negative, Plane::default(), 1e-6);
        let a = builder.add_boundary_point(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_boundary_point(Point3::new(1.0, 0.0, 0.0));
        let c = builder.add_boundary_point(Point3::new(1.0, 0.0, 1.0));
        builder.register_boundary_edge(a, b);
        builder.register_boundary_edge(b, c);

        let mut warnings = Vec::new();
        let stats = builder.cap(&SliceConfig::default(), &mut warnings);
        assert_eq!(stats.loops, 0);
        assert_eq!(
            warnings,
            vec![SliceWarning::OpenBoundary {
                side: Side::Negative,
                start: a,
                end: c
            }]
        );
    }
}
