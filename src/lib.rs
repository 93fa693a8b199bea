//! # meshslice
//!
//! A pure Rust library for cutting closed triangle meshes with a plane.
//!
//! Slicing partitions every triangle by the plane, rebuilds one mesh per
//! half-space and caps each newly exposed cross-section, so both halves stay
//! closed solids.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Exact edge sharing: a mesh edge crossed by the plane is cut once
//! - Normals, tangents and texture coordinates interpolated along cuts
//! - Cap triangulation by ear clipping, or earcut with the `polygon-ops` feature
//! - Per-loop diagnostics instead of all-or-nothing failure
//! - Volume, bounding box and collision mesh helpers with the `mesh-ops` feature
//!
//! ## Example
//!
//! ```
//! use meshslice::{Mesh, Plane, slice};
//! use nalgebra::{Point3, Vector3};
//!
//! # fn main() -> meshslice::Result<()> {
//! // A tetrahedron standing on the plane y = -1
//! let mesh = Mesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, -1.0, 1.0),
//!         Point3::new(1.0, -1.0, -1.0),
//!         Point3::new(-1.0, -1.0, -1.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3],
//! );
//!
//! let result = slice(&mesh, &Plane::new(Vector3::y(), Point3::origin()))?;
//!
//! assert!(result.report.is_clean());
//! assert_eq!(result.report.positive.capped_loops, 1);
//! assert_eq!(result.report.negative.capped_loops, 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod boundary;
mod builder;
pub mod config;
pub mod ear_clipping;
pub mod error;
pub mod mesh;
pub mod mesh_ops;
pub mod plane;
#[cfg(feature = "polygon-ops")]
pub mod polygon_triangulation;
pub mod slicer;

pub use config::{CapMethod, SliceConfig};
pub use error::{Error, Result, SliceWarning};
pub use mesh::{Mesh, VertexAttributes};
pub use plane::{LineIntersection, Plane, Side};
pub use slicer::{SideReport, SliceReport, SliceResult, Slicer};

/// Slice `mesh` by `plane` with the default configuration
///
/// Shorthand for `Slicer::default().slice(mesh, plane)`.
pub fn slice(mesh: &Mesh, plane: &Plane) -> Result<SliceResult> {
    Slicer::default().slice(mesh, plane)
}
