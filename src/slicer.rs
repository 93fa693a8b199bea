//! Plane slicing of triangle meshes
//!
//! [`Slicer::slice`] partitions every source triangle by the plane and feeds
//! two [`MeshBuilder`]s, one per half-space:
//!
//! - triangles entirely on one side are copied to that side
//! - cut triangles are split into one triangle on the minority side and two
//!   on the majority side, reusing one intersection vertex per cut edge
//! - each cut contributes a directed edge to both caps, in opposite directions
//!
//! Once every triangle has been processed the boundary loops of both sides are
//! capped and the two meshes are returned together with a [`SliceReport`].

use crate::builder::{MeshBuilder, VertexPair};
use crate::config::SliceConfig;
use crate::error::{Error, Result, SliceWarning};
use crate::mesh::{Mesh, VertexAttributes};
use crate::plane::{Plane, Side};
use nalgebra::{Matrix4, Point3};
use std::collections::HashMap;

/// Per-side counters of a slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideReport {
    /// Source triangles copied unchanged to this side
    pub copied_triangles: usize,
    /// Directed cap boundary edges registered
    pub boundary_edges: usize,
    /// Cuts that collapsed to a single boundary point
    pub isolated_points: usize,
    /// Boundary loops handed to the cap triangulator
    pub capped_loops: usize,
    /// Closed boundary walks discarded for having fewer than 3 vertices
    pub degenerate_loops: usize,
    /// Triangles added by capping
    pub cap_triangles: usize,
}

/// Statistics and diagnostics of one slice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceReport {
    /// Counters of the positive output
    pub positive: SideReport,
    /// Counters of the negative output
    pub negative: SideReport,
    /// Source triangles with vertices on both sides
    pub cut_triangles: usize,
    /// Cut triangles dropped because an intersection could not be computed
    pub skipped_triangles: usize,
    /// Distinct source edges crossed by the plane
    pub cut_edges: usize,
    /// Non-fatal failures, in the order they happened
    pub warnings: Vec<SliceWarning>,
}

impl SliceReport {
    /// Counters of one side
    pub fn side(&self, side: Side) -> &SideReport {
        match side {
            Side::Positive => &self.positive,
            Side::Negative => &self.negative,
        }
    }

    /// True if the slice produced no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The two halves of a sliced mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceResult {
    /// Part of the mesh on the side the plane normal points to
    pub positive: Mesh,
    /// Part of the mesh behind the plane
    pub negative: Mesh,
    /// What happened while slicing
    pub report: SliceReport,
}

impl SliceResult {
    /// The output mesh of one side
    pub fn mesh(&self, side: Side) -> &Mesh {
        match side {
            Side::Positive => &self.positive,
            Side::Negative => &self.negative,
        }
    }

    /// Split into `(positive, negative)`, dropping the report
    pub fn into_meshes(self) -> (Mesh, Mesh) {
        (self.positive, self.negative)
    }
}

/// Slices meshes with a fixed configuration
///
/// # Example
///
/// ```
/// use meshslice::{Mesh, Plane, Slicer};
/// use nalgebra::{Point3, Vector3};
///
/// // A single triangle straddling the plane y = 0
/// let mesh = Mesh::from_triangles(
///     vec![
///         Point3::new(0.0, -1.0, 0.0),
///         Point3::new(1.0, -1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![0, 1, 2],
/// );
/// let plane = Plane::new(Vector3::y(), Point3::origin());
///
/// let result = Slicer::default().slice(&mesh, &plane)?;
/// assert_eq!(result.positive.triangle_count(), 1);
/// assert_eq!(result.negative.triangle_count(), 2);
/// # Ok::<(), meshslice::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Slicer {
    config: SliceConfig,
}

impl Slicer {
    /// Create a slicer with the given configuration
    pub fn new(config: SliceConfig) -> Self {
        Self { config }
    }

    /// The configuration this slicer uses
    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// Slice `mesh` by `plane`
    ///
    /// # Errors
    /// Fails without producing output if the configuration, the plane or the
    /// mesh is invalid. Everything else is reported through
    /// [`SliceReport::warnings`].
    pub fn slice(&self, mesh: &Mesh, plane: &Plane) -> Result<SliceResult> {
        self.config.validate()?;
        plane.validate()?;
        mesh.validate()?;

        let plane = plane
            .normalized()
            .ok_or_else(|| Error::InvalidPlane("normal is the zero vector".to_string()))?;

        let run = SliceRun::new(mesh, plane, &self.config);
        Ok(run.execute())
    }

    /// Slice a mesh placed in the world by `object_to_world` with a world-space plane
    ///
    /// The plane is first brought into the mesh's local frame, so the output
    /// stays in local coordinates.
    pub fn slice_in_world(
        &self,
        mesh: &Mesh,
        world_plane: &Plane,
        object_to_world: &Matrix4<f64>,
    ) -> Result<SliceResult> {
        world_plane.validate()?;
        let local = world_plane.to_object_space(object_to_world)?;
        self.slice(mesh, &local)
    }
}

/// Output vertices created for one crossed source edge
#[derive(Debug, Clone, Copy)]
struct CutVertex {
    positive: usize,
    negative: usize,
    point: Point3<f64>,
}

impl CutVertex {
    fn index(&self, side: Side) -> usize {
        match side {
            Side::Positive => self.positive,
            Side::Negative => self.negative,
        }
    }
}

/// An edge crossing resolved but not yet allocated in the builders
enum EdgeCut {
    Cached(CutVertex),
    New {
        key: VertexPair,
        point: Point3<f64>,
        attributes: VertexAttributes,
    },
}

/// State of one `slice` call
struct SliceRun<'a> {
    source: &'a Mesh,
    plane: Plane,
    config: &'a SliceConfig,
    sides: Vec<Side>,
    positive: MeshBuilder<'a>,
    negative: MeshBuilder<'a>,
    cut_edges: HashMap<VertexPair, CutVertex>,
    report: SliceReport,
}

impl<'a> SliceRun<'a> {
    fn new(source: &'a Mesh, plane: Plane, config: &'a SliceConfig) -> Self {
        let sides = source.vertices.iter().map(|v| plane.side_of(v)).collect();
        let tolerance = config.weld_tolerance();

        Self {
            source,
            plane,
            config,
            sides,
            positive: MeshBuilder::new(source, Side::Positive, plane, tolerance),
            negative: MeshBuilder::new(source, Side::Negative, plane, tolerance),
            cut_edges: HashMap::new(),
            report: SliceReport::default(),
        }
    }

    fn execute(mut self) -> SliceResult {
        for (index, triangle) in self.source.triangle_iter().enumerate() {
            let [a, b, c] = triangle;
            let (sa, sb, sc) = (self.sides[a], self.sides[b], self.sides[c]);

            if sa == sb && sb == sc {
                let builder = self.builder(sa);
                let (ia, ib, ic) = (
                    builder.add_point_copied_from_source(a),
                    builder.add_point_copied_from_source(b),
                    builder.add_point_copied_from_source(c),
                );
                builder.add_triangle(ia, ib, ic);
                match sa {
                    Side::Positive => self.report.positive.copied_triangles += 1,
                    Side::Negative => self.report.negative.copied_triangles += 1,
                }
            } else {
                self.report.cut_triangles += 1;
                self.cut_triangle(index, triangle);
            }
        }

        self.report.cut_edges = self.cut_edges.len();
        self.report.positive.boundary_edges = self.positive.boundary_edge_count();
        self.report.negative.boundary_edges = self.negative.boundary_edge_count();
        self.report.positive.isolated_points = self.positive.isolated_point_count();
        self.report.negative.isolated_points = self.negative.isolated_point_count();

        if self.config.cap_sections() {
            for builder in [&mut self.positive, &mut self.negative] {
                let stats = builder.cap(self.config, &mut self.report.warnings);
                let side_report = match builder.side() {
                    Side::Positive => &mut self.report.positive,
                    Side::Negative => &mut self.report.negative,
                };
                side_report.capped_loops = stats.loops;
                side_report.degenerate_loops = stats.degenerate_loops;
                side_report.cap_triangles = stats.triangles;
            }
        }

        log::trace!(
            "sliced {} triangles: {} cut, {} skipped, {} cut edges, {} warnings",
            self.source.triangle_count(),
            self.report.cut_triangles,
            self.report.skipped_triangles,
            self.report.cut_edges,
            self.report.warnings.len()
        );

        SliceResult {
            positive: self.positive.finish(),
            negative: self.negative.finish(),
            report: self.report,
        }
    }

    fn builder(&mut self, side: Side) -> &mut MeshBuilder<'a> {
        match side {
            Side::Positive => &mut self.positive,
            Side::Negative => &mut self.negative,
        }
    }

    /// `(builder for side, builder for the other side)`
    fn builder_pair(&mut self, side: Side) -> (&mut MeshBuilder<'a>, &mut MeshBuilder<'a>) {
        match side {
            Side::Positive => (&mut self.positive, &mut self.negative),
            Side::Negative => (&mut self.negative, &mut self.positive),
        }
    }

    fn cut_triangle(&mut self, index: usize, [v1, v2, v3]: [usize; 3]) {
        // base1 precedes the outlier and base2 follows it, so the winding is kept
        let (outlier, base1, base2) = if self.sides[v1] == self.sides[v3] {
            (v2, v1, v3)
        } else if self.sides[v1] == self.sides[v2] {
            (v3, v2, v1)
        } else {
            (v1, v3, v2)
        };
        let outlier_side = self.sides[outlier];

        // Resolve both crossings before touching either builder
        let first = self.resolve_cut(base1, outlier);
        let second = self.resolve_cut(base2, outlier);
        let (first, second) = match (first, second) {
            (Some(first), Some(second)) => (first, second),
            (first, _) => {
                let from = if first.is_none() { base1 } else { base2 };
                self.skip_triangle(SliceWarning::DegenerateCut {
                    triangle: index,
                    from,
                    to: outlier,
                    outlier_side,
                });
                return;
            }
        };
        let cut1 = self.commit_cut(first);
        let cut2 = self.commit_cut(second);

        let (outer, inner) = self.builder_pair(outlier_side);
        let base_side = inner.side();

        let apex = outer.add_point_copied_from_source(outlier);
        outer.add_triangle(apex, cut2.index(outlier_side), cut1.index(outlier_side));

        let b1 = inner.add_point_copied_from_source(base1);
        let b2 = inner.add_point_copied_from_source(base2);
        let (i1, i2) = (cut1.index(base_side), cut2.index(base_side));
        inner.add_triangle(i1, i2, b2);
        inner.add_triangle(b2, b1, i1);

        let o1 = outer.add_boundary_point(cut1.point);
        let o2 = outer.add_boundary_point(cut2.point);
        outer.register_boundary_edge(o2, o1);

        let n1 = inner.add_boundary_point(cut1.point);
        let n2 = inner.add_boundary_point(cut2.point);
        inner.register_boundary_edge(n1, n2);
    }

    fn skip_triangle(&mut self, warning: SliceWarning) {
        log::debug!("skipping cut triangle: {}", warning);
        log::warn!("{}", warning);
        self.report.skipped_triangles += 1;
        self.report.warnings.push(warning);
    }

    /// Where the source edge `a`-`b` crosses the plane
    ///
    /// The intersection is always computed from the lower to the higher source
    /// index, so both triangles sharing the edge agree on it exactly.
    fn resolve_cut(&self, a: usize, b: usize) -> Option<EdgeCut> {
        let key = VertexPair::new(a, b);
        if let Some(&cut) = self.cut_edges.get(&key) {
            return Some(EdgeCut::Cached(cut));
        }

        let (low, high) = (key.low(), key.high());
        let start = self.source.vertices[low];
        let direction = self.source.vertices[high] - start;
        let hit = self.plane.line_intersection(&start, &direction)?;
        if !hit.point.coords.iter().all(|c| c.is_finite()) {
            return None;
        }

        let t = hit.t.clamp(0.0, 1.0);
        let attributes = self
            .source
            .attributes(low)
            .lerp(&self.source.attributes(high), t);

        Some(EdgeCut::New {
            key,
            point: hit.point,
            attributes,
        })
    }

    fn commit_cut(&mut self, cut: EdgeCut) -> CutVertex {
        match cut {
            EdgeCut::Cached(cut) => cut,
            EdgeCut::New {
                key,
                point,
                attributes,
            } => {
                let vertex = CutVertex {
                    positive: self.positive.add_point(point, attributes),
                    negative: self.negative.add_point(point, attributes),
                    point,
                };
                self.cut_edges.insert(key, vertex);
                vertex
            }
        }
    }
}
