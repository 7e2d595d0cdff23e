use crate::{Point, Vec3};

/// A ray in 3D space: `origin + t * direction`.
///
/// The direction is not required to be normalized, but it must not be the
/// zero vector. Intersection code divides by its squared length and does not
/// guard against the resulting NaNs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Point {
        self.origin + self.direction * t
    }
}
