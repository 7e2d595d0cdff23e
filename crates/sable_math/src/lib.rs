//! Sable math types.
//!
//! Vectors come straight from glam; this crate adds the handful of
//! ray-tracing helpers glam does not ship with.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use vector::{near_zero, reflect, refract};

/// A position in world space.
pub type Point = Vec3;

/// Linear RGB radiance. Channels are not clamped while accumulating.
pub type Color = Vec3;
