//! Error types for mesh slicing
//!
//! This module provides the error handling for slicing operations. Fatal errors
//! (broken preconditions) are returned as [`Error`] before any output is built.
//! Local failures that only affect one triangle or one boundary loop are collected
//! as [`SliceWarning`] values so that the rest of the slice still completes.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>` for fatal errors and
//! `W<category><number>` for warnings.
//!
//! Categories:
//! - **E1xxx**: Input precondition errors
//! - **E2xxx**: Triangulation errors
//! - **W1xxx**: Per-triangle slicing failures
//! - **W2xxx**: Per-loop capping failures
//!
//! ## Common Error Codes
//!
//! - `E1001`: Invalid slicing plane
//! - `E1002`: Invalid source mesh
//! - `E1003`: Invalid slice configuration
//! - `E1004`: Transform cannot be inverted
//! - `E2001`: Polygon triangulation failed
//! - `W1001`: Cut edge parallel to the plane, triangle skipped
//! - `W2001`..`W2005`: Boundary loop left uncapped (fully or partially)

use crate::plane::Side;
use thiserror::Error;

/// Result type for slicing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a slicing operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The slicing plane cannot be used
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Zero-length normal
    /// - Non-finite point or normal components
    #[error("[E1001] Invalid plane: {0}")]
    InvalidPlane(String),

    /// The source mesh breaks one of the input invariants
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Triangle index list length is not a multiple of 3
    /// - Triangle index out of range
    /// - Normal, tangent or UV array present but not one entry per vertex
    /// - NaN or infinite vertex coordinates
    #[error("[E1002] Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A configuration value is out of range
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An object transform has no inverse
    ///
    /// **Error Code**: E1004
    ///
    /// **Common Causes**:
    /// - Zero scale on one axis
    /// - Projective (non-affine) matrix
    #[error("[E1004] Transform is not invertible: {0}")]
    NonInvertibleTransform(String),

    /// Polygon triangulation failed
    ///
    /// **Error Code**: E2001
    ///
    /// Slicing never returns this; cap failures become [`SliceWarning`]s.
    /// It exists so callers of [`crate::ear_clipping::triangulate_polygon`]
    /// and `polygon_triangulation::triangulate_simple` can use `?` inside
    /// functions returning [`Result`].
    #[error("[E2001] Triangulation failed: {0}")]
    Triangulation(String),
}

impl Error {
    /// Create an InvalidMesh error for an out-of-range triangle index
    ///
    /// # Arguments
    /// * `triangle` - Index of the offending triangle
    /// * `index` - The vertex index found in the triangle
    /// * `vertex_count` - Number of vertices in the mesh
    pub fn index_out_of_range(triangle: usize, index: usize, vertex_count: usize) -> Self {
        Error::InvalidMesh(format!(
            "Triangle {} references vertex {} but the mesh has {} vertices",
            triangle, index, vertex_count
        ))
    }

    /// Create an InvalidMesh error for an attribute array of the wrong length
    ///
    /// # Arguments
    /// * `attribute` - Attribute name (e.g., "normals")
    /// * `len` - Length of the attribute array
    /// * `vertex_count` - Number of vertices in the mesh
    pub fn attribute_length(attribute: &str, len: usize, vertex_count: usize) -> Self {
        Error::InvalidMesh(format!(
            "{} has {} entries but the mesh has {} vertices; \
             attribute arrays must be empty or one entry per vertex",
            attribute, len, vertex_count
        ))
    }
}

#[cfg(feature = "polygon-ops")]
impl From<crate::polygon_triangulation::TriangulationError> for Error {
    fn from(err: crate::polygon_triangulation::TriangulationError) -> Self {
        Error::Triangulation(err.to_string())
    }
}

impl From<crate::ear_clipping::EarClipError> for Error {
    fn from(err: crate::ear_clipping::EarClipError) -> Self {
        Error::Triangulation(err.to_string())
    }
}

/// Non-fatal failures reported by a slice
///
/// Each warning identifies the half-space it happened on and the triangle or
/// loop involved. The slice result is still usable; the affected triangle is
/// missing or the affected loop is (partially) left open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliceWarning {
    /// A triangle classified as cut had an edge parallel to the plane
    ///
    /// **Warning Code**: W1001
    #[error(
        "[W1001] Triangle {triangle}: edge ({from}, {to}) does not cross the plane; \
         triangle skipped on both sides (outlier on {outlier_side} side)"
    )]
    DegenerateCut {
        /// Index of the source triangle
        triangle: usize,
        /// Source vertex index the edge starts at
        from: usize,
        /// Source vertex index the edge ends at
        to: usize,
        /// Side of the triangle's minority vertex
        outlier_side: Side,
    },

    /// A boundary vertex links to itself
    ///
    /// **Warning Code**: W2001
    #[error("[W2001] {side} cap: boundary vertex {vertex} is connected to itself; loop skipped")]
    SelfConnectedVertex {
        /// Half-space of the affected output mesh
        side: Side,
        /// Output mesh vertex index
        vertex: usize,
    },

    /// A boundary walk hit a vertex with no successor
    ///
    /// **Warning Code**: W2002
    #[error(
        "[W2002] {side} cap: boundary walk from vertex {start} ends at vertex {end} \
         without closing; loop skipped"
    )]
    OpenBoundary {
        /// Half-space of the affected output mesh
        side: Side,
        /// Output mesh vertex the walk started from
        start: usize,
        /// Output mesh vertex with no successor
        end: usize,
    },

    /// A boundary walk ran into a vertex that belongs to another walk
    ///
    /// **Warning Code**: W2003
    #[error(
        "[W2003] {side} cap: boundary walk from vertex {start} merges into an \
         already visited vertex {at}; loop skipped"
    )]
    TangledBoundary {
        /// Half-space of the affected output mesh
        side: Side,
        /// Output mesh vertex the walk started from
        start: usize,
        /// Output mesh vertex that was already claimed
        at: usize,
    },

    /// Ear clipping hit the iteration cap
    ///
    /// **Warning Code**: W2004
    #[error(
        "[W2004] {side} cap: loop {loop_index} exceeded {limit} ear-clipping iterations; \
         {remaining} vertices left uncapped"
    )]
    CapIterationLimit {
        /// Half-space of the affected output mesh
        side: Side,
        /// Index of the loop within this side
        loop_index: usize,
        /// Configured iteration cap
        limit: usize,
        /// Loop vertices still unclipped
        remaining: usize,
    },

    /// No ear could be found although the remaining polygon has area
    ///
    /// **Warning Code**: W2005
    #[error(
        "[W2005] {side} cap: loop {loop_index} has no clippable ear; \
         {remaining} vertices left uncapped"
    )]
    NoEarFound {
        /// Half-space of the affected output mesh
        side: Side,
        /// Index of the loop within this side
        loop_index: usize,
        /// Loop vertices still unclipped
        remaining: usize,
    },

    /// The earcut backend rejected a loop
    ///
    /// **Warning Code**: W2006
    #[error("[W2006] {side} cap: loop {loop_index} could not be triangulated: {reason}")]
    CapTriangulationFailed {
        /// Half-space of the affected output mesh
        side: Side,
        /// Index of the loop within this side
        loop_index: usize,
        /// Backend error message
        reason: String,
    },
}

impl SliceWarning {
    /// The half-space this warning applies to
    ///
    /// Degenerate cuts affect both outputs; they report the outlier's side.
    pub fn side(&self) -> Side {
        match self {
            SliceWarning::DegenerateCut { outlier_side, .. } => *outlier_side,
            SliceWarning::SelfConnectedVertex { side, .. }
            | SliceWarning::OpenBoundary { side, .. }
            | SliceWarning::TangledBoundary { side, .. }
            | SliceWarning::CapIterationLimit { side, .. }
            | SliceWarning::NoEarFound { side, .. }
            | SliceWarning::CapTriangulationFailed { side, .. } => *side,
        }
    }
}
