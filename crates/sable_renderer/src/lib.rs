//! Sable renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for scenes of spheres with diffuse, metallic,
//! and glass materials. Scenes and materials are built up front and only read
//! while rendering; all randomness flows through per-worker RNG handles.

pub mod camera;
pub mod error;
pub mod hittable;
pub mod integrator;
pub mod material;
pub mod renderer;
pub mod sampling;
pub mod settings;
pub mod sphere;

pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{ray_color, Sky};
pub use material::{Material, ScatterResult};
pub use renderer::{linear_to_gamma, to_rgb8, Framebuffer, Renderer};
pub use settings::RenderSettings;
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from sable_math
pub use sable_math::{Color, Interval, Point, Ray, Vec3};
