//! Ear clipping for planar loops in 3D
//!
//! Cap outlines lie in the slicing plane but are stored as 3D points, so the
//! orientation tests here are taken about an explicit `axis` (the direction
//! the loop winds counter-clockwise around) instead of projecting to 2D first.
//!
//! Vertices are kept in an index-linked ring (`prev`/`next` are indices into
//! the input slice). Candidate ears sit in a FIFO queue; clipping a vertex only
//! changes the eligibility of its two neighbours, which are re-tested and
//! re-queued.
//!
//! An ear is rejected if another loop vertex lies inside it or on its edges,
//! within a scale-relative epsilon. Vertices sitting exactly on one of the
//! ear's corners (welded touch points) do not block it.

use nalgebra::{Point3, Vector3};
use std::collections::VecDeque;
use thiserror::Error;

/// Relative tolerance for orientation and containment tests
const RELATIVE_EPSILON: f64 = 1e-10;

/// Reasons an ear-clipping pass stopped early
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EarClipError {
    /// Not enough vertices to form a triangle
    #[error("Polygon must have at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// The winding axis is zero or not finite
    #[error("Winding axis must be a finite non-zero vector")]
    DegenerateAxis,

    /// The iteration cap was reached before the loop was consumed
    #[error("Exceeded {limit} iterations with {remaining} vertices left")]
    IterationLimit {
        /// Configured iteration cap
        limit: usize,
        /// Vertices still in the loop
        remaining: usize,
    },

    /// No vertex qualifies as an ear although the remainder has area
    #[error("No ear found with {remaining} vertices left")]
    NoEar {
        /// Vertices still in the loop
        remaining: usize,
    },
}

/// Triangles produced by [`clip_ears`], plus the reason it stopped early, if any
///
/// Triangles already emitted before a failure are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarClipOutput {
    /// Local vertex indices, each triangle wound clockwise about the axis
    pub triangles: Vec<[usize; 3]>,
    /// Set when the loop was not fully consumed
    pub error: Option<EarClipError>,
}

#[derive(Debug, Clone, Copy)]
struct RingVertex {
    prev: usize,
    next: usize,
    active: bool,
    is_ear: bool,
}

struct Ring<'a> {
    points: &'a [Point3<f64>],
    axis: Vector3<f64>,
    vertices: Vec<RingVertex>,
    /// Areas (squared lengths) below this count as zero
    area_epsilon: f64,
}

impl<'a> Ring<'a> {
    fn new(points: &'a [Point3<f64>], axis: Vector3<f64>) -> Self {
        let n = points.len();
        let vertices = (0..n)
            .map(|i| RingVertex {
                prev: (i + n - 1) % n,
                next: (i + 1) % n,
                active: true,
                is_ear: false,
            })
            .collect();

        let origin = points[0];
        let scale = points
            .iter()
            .map(|p| (p - origin).norm())
            .fold(0.0, f64::max);

        Self {
            points,
            axis,
            vertices,
            area_epsilon: RELATIVE_EPSILON * scale * scale,
        }
    }

    /// Twice the signed area of `(a, b, c)` about the axis
    fn orientation(&self, a: usize, b: usize, c: usize) -> f64 {
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        (pb - pa).cross(&(pc - pb)).dot(&self.axis)
    }

    /// Whether `p` lies inside or on the triangle `(a, b, c)` without being one of its corners
    fn blocks(&self, p: &Point3<f64>, a: usize, b: usize, c: usize) -> bool {
        let corners = [self.points[a], self.points[b], self.points[c]];
        if corners
            .iter()
            .any(|corner| (p - corner).norm_squared() <= self.area_epsilon)
        {
            return false;
        }

        let [pa, pb, pc] = corners;
        let edge = |from: &Point3<f64>, to: &Point3<f64>| {
            (to - from).cross(&(p - from)).dot(&self.axis)
        };
        edge(&pa, &pb) >= -self.area_epsilon
            && edge(&pb, &pc) >= -self.area_epsilon
            && edge(&pc, &pa) >= -self.area_epsilon
    }

    fn is_ear(&self, v: usize) -> bool {
        let RingVertex { prev, next, .. } = self.vertices[v];
        if self.orientation(prev, v, next) <= self.area_epsilon {
            return false;
        }

        let mut other = self.vertices[next].next;
        while other != prev {
            if self.blocks(&self.points[other], prev, v, next) {
                return false;
            }
            other = self.vertices[other].next;
        }
        true
    }

    /// Twice the signed area of the active loop about the axis
    fn remaining_area(&self, start: usize) -> f64 {
        let origin = self.points[start];
        let mut total = 0.0;
        let mut current = start;
        loop {
            let next = self.vertices[current].next;
            total += (self.points[current] - origin)
                .cross(&(self.points[next] - origin))
                .dot(&self.axis);
            current = next;
            if current == start {
                return total;
            }
        }
    }

    fn clip(&mut self, v: usize) -> [usize; 3] {
        let RingVertex { prev, next, .. } = self.vertices[v];
        self.vertices[v].active = false;
        self.vertices[prev].next = next;
        self.vertices[next].prev = prev;
        [next, v, prev]
    }
}

/// Triangulate a planar loop that winds counter-clockwise about `axis`
///
/// Returns local indices into `points`. Every triangle is emitted as
/// `[next, tip, prev]`, so its normal points along `-axis`. A simple polygon
/// of `N` vertices yields `N - 2` triangles. Zero-area remainders (collinear
/// leftovers) are dropped without error.
///
/// `max_iterations` bounds the number of queue pops; hitting it stops the
/// pass with [`EarClipError::IterationLimit`].
pub fn clip_ears(
    points: &[Point3<f64>],
    axis: &Vector3<f64>,
    max_iterations: usize,
) -> EarClipOutput {
    let mut output = EarClipOutput::default();

    let n = points.len();
    if n < 3 {
        output.error = Some(EarClipError::TooFewVertices(n));
        return output;
    }

    let axis = match axis.try_normalize(0.0) {
        Some(axis) if axis.iter().all(|c| c.is_finite()) => axis,
        _ => {
            output.error = Some(EarClipError::DegenerateAxis);
            return output;
        }
    };

    let mut ring = Ring::new(points, axis);
    let mut queue = VecDeque::with_capacity(n);
    for v in 0..n {
        if ring.is_ear(v) {
            ring.vertices[v].is_ear = true;
            queue.push_back(v);
        }
    }

    let mut remaining = n;
    let mut last_active = 0;
    let mut iterations = 0;

    while remaining > 3 {
        if iterations >= max_iterations {
            output.error = Some(EarClipError::IterationLimit {
                limit: max_iterations,
                remaining,
            });
            return output;
        }
        iterations += 1;

        let Some(v) = queue.pop_front() else {
            if ring.remaining_area(last_active).abs() <= ring.area_epsilon {
                log::debug!("dropping zero-area remainder of {} loop vertices", remaining);
            } else {
                output.error = Some(EarClipError::NoEar { remaining });
            }
            return output;
        };

        // Stale entries: already clipped, or no longer an ear
        if !ring.vertices[v].active || !ring.vertices[v].is_ear {
            continue;
        }

        let triangle = ring.clip(v);
        output.triangles.push(triangle);
        remaining -= 1;

        let [next, _, prev] = triangle;
        last_active = next;
        for neighbour in [prev, next] {
            let ear = ring.is_ear(neighbour);
            if ear && !ring.vertices[neighbour].is_ear {
                queue.push_back(neighbour);
            }
            ring.vertices[neighbour].is_ear = ear;
        }
    }

    let tip = ring.vertices[last_active].next;
    let RingVertex { prev, next, .. } = ring.vertices[tip];
    let orientation = ring.orientation(prev, tip, next);
    if orientation > ring.area_epsilon {
        output.triangles.push([next, tip, prev]);
    } else if orientation.abs() <= ring.area_epsilon {
        log::debug!("dropping zero-area final triangle");
    } else {
        output.error = Some(EarClipError::NoEar { remaining: 3 });
    }

    output
}

/// Triangulate a planar loop, failing on any early stop
///
/// Convenience wrapper over [`clip_ears`] without an iteration cap.
pub fn triangulate_polygon(
    points: &[Point3<f64>],
    axis: &Vector3<f64>,
) -> Result<Vec<[usize; 3]>, EarClipError> {
    let output = clip_ears(points, axis, usize::MAX);
    match output.error {
        Some(err) => Err(err),
        None => Ok(output.triangles),
    }
}
