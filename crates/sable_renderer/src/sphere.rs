//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Point, Ray,
};
use sable_math::Interval;
use std::sync::Arc;

/// A sphere primitive.
///
/// The sign of the radius selects the normal orientation. A negative radius
/// keeps the same surface but turns its normals inward, which is how a hollow
/// glass shell is modelled: an outer dielectric sphere with a slightly smaller
/// negative-radius sphere inside it.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere sharing `material` with any other primitive.
    pub fn new(center: Point, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.accepts(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.accepts(root) {
                return None;
            }
        }

        // Dividing by the signed radius flips the normal for hollow spheres
        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, &self.material))
    }
}
