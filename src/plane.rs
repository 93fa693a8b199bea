//! Implicit plane math
//!
//! A [`Plane`] is stored as a normal and any point lying on it. The sign of
//! [`Plane::distance_to_point`] decides which [`Side`] (half-space) a point
//! belongs to; a distance of exactly zero counts as positive.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use std::fmt;

/// One of the two half-spaces bounded by a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Points with a non-negative signed distance
    Positive,
    /// Points with a negative signed distance
    Negative,
}

impl Side {
    /// Classify a signed distance. Zero belongs to the positive side.
    #[inline]
    pub fn of_distance(distance: f64) -> Self {
        if distance >= 0.0 {
            Side::Positive
        } else {
            Side::Negative
        }
    }

    /// The other half-space
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }

    /// `1.0` for the positive side, `-1.0` for the negative side
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Positive => 1.0,
            Side::Negative => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Positive => write!(f, "positive"),
            Side::Negative => write!(f, "negative"),
        }
    }
}

/// Solution of a line/plane intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIntersection {
    /// The intersection point
    pub point: Point3<f64>,
    /// Scalar such that `point = line_point + t * line_direction`
    pub t: f64,
}

/// A slicing plane in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Plane normal; points on the positive side lie in its direction
    pub normal: Vector3<f64>,
    /// Any point on the plane
    pub point: Point3<f64>,
}

impl Default for Plane {
    /// The horizontal plane through the origin, facing +Y
    fn default() -> Self {
        Self {
            normal: Vector3::y(),
            point: Point3::origin(),
        }
    }
}

impl Plane {
    /// Create a plane from a normal and a point on it
    pub fn new(normal: Vector3<f64>, point: Point3<f64>) -> Self {
        Self { normal, point }
    }

    /// Signed distance from `target` to the plane
    ///
    /// The value is scaled by the normal's length; it is a true distance only
    /// for unit normals.
    #[inline]
    pub fn distance_to_point(&self, target: &Point3<f64>) -> f64 {
        self.normal.dot(&(target - self.point))
    }

    /// The half-space `target` lies in
    #[inline]
    pub fn side_of(&self, target: &Point3<f64>) -> Side {
        Side::of_distance(self.distance_to_point(target))
    }

    /// Whether the plane equation is usable
    ///
    /// The point and normal must be finite and the normal must not be zero.
    pub fn is_valid(&self) -> bool {
        let point_valid = self.point.coords.iter().all(|c| c.is_finite());
        let normal_valid =
            self.normal.iter().all(|c| c.is_finite()) && self.normal.norm_squared() > 0.0;
        point_valid && normal_valid
    }

    /// Like [`Plane::is_valid`], but explains what is wrong
    pub fn validate(&self) -> Result<()> {
        if !self.point.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidPlane(format!(
                "point ({}, {}, {}) is not finite",
                self.point.x, self.point.y, self.point.z
            )));
        }
        if !self.normal.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidPlane(format!(
                "normal ({}, {}, {}) is not finite",
                self.normal.x, self.normal.y, self.normal.z
            )));
        }
        if self.normal.norm_squared() == 0.0 {
            return Err(Error::InvalidPlane("normal is the zero vector".to_string()));
        }
        Ok(())
    }

    /// The same plane with a unit-length normal, or `None` if the normal is zero
    pub fn normalized(&self) -> Option<Plane> {
        let normal = self.normal.try_normalize(0.0)?;
        Some(Plane::new(normal, self.point))
    }

    /// The same plane facing the other way
    pub fn flipped(&self) -> Plane {
        Plane::new(-self.normal, self.point)
    }

    /// Intersect the line `line_point + t * line_direction` with the plane
    ///
    /// Returns `None` when the line is parallel to the plane (no unique
    /// solution). Callers slicing a triangle only ask for edges whose
    /// endpoints lie on different sides.
    pub fn line_intersection(
        &self,
        line_point: &Point3<f64>,
        line_direction: &Vector3<f64>,
    ) -> Option<LineIntersection> {
        let denom = self.normal.dot(line_direction);
        if denom == 0.0 {
            return None;
        }

        let t = -self.normal.dot(&(line_point - self.point)) / denom;
        if !t.is_finite() {
            return None;
        }

        Some(LineIntersection {
            point: line_point + line_direction * t,
            t,
        })
    }

    /// Two orthonormal axes `(u, v)` spanning the plane, with `u × v = n̂`
    pub fn coordinate_axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        orthonormal_basis(&self.normal)
    }

    /// Coordinates of `target` projected onto the plane's axes, relative to `point`
    pub fn project(&self, target: &Point3<f64>) -> Vector2<f64> {
        let (u, v) = self.coordinate_axes();
        let offset = target - self.point;
        Vector2::new(offset.dot(&u), offset.dot(&v))
    }

    /// Express a world-space plane in the local frame of an object
    ///
    /// `object_to_world` is the object's affine model matrix. The point is
    /// mapped by its inverse; the normal by the transpose of its linear part,
    /// which keeps it perpendicular under non-uniform scale.
    pub fn to_object_space(&self, object_to_world: &Matrix4<f64>) -> Result<Plane> {
        let world_to_object = object_to_world.try_inverse().ok_or_else(|| {
            Error::NonInvertibleTransform("object-to-world matrix is singular".to_string())
        })?;

        let linear = object_to_world.fixed_view::<3, 3>(0, 0);
        let normal = (linear.transpose() * self.normal)
            .try_normalize(0.0)
            .ok_or_else(|| {
                Error::NonInvertibleTransform("plane normal collapses to zero".to_string())
            })?;
        let point = world_to_object.transform_point(&self.point);

        Ok(Plane::new(normal, point))
    }
}

/// Two orthonormal vectors perpendicular to `axis`, ordered so that `u × v`
/// points along `axis`
pub(crate) fn orthonormal_basis(axis: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = axis.try_normalize(0.0).unwrap_or_else(Vector3::y);

    // Crossing with a near-parallel helper would lose precision.
    let helper = if n.y.abs() > 0.99 {
        -Vector3::x()
    } else {
        Vector3::y()
    };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u).normalize();
    (u, v)
}
