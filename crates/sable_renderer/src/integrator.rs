//! Radiance along a ray.
//!
//! Recursive Monte Carlo estimator: follow scattered rays through the scene,
//! multiplying attenuation at every bounce, until the ray escapes to the sky,
//! is absorbed, or runs out of depth.

use crate::{Color, Hittable, Ray};
use rand::RngCore;
use sable_math::Interval;
use serde::{Deserialize, Serialize};

/// Nearest accepted hit distance. Keeps a scattered ray from re-hitting the
/// surface it starts on (shadow acne).
pub const T_MIN: f32 = 0.001;

/// Vertical background gradient seen by rays that escape the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sky {
    /// Color looking straight down
    pub horizon: Color,
    /// Color looking straight up
    pub zenith: Color,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            horizon: Color::ONE,
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

impl Sky {
    pub fn new(horizon: Color, zenith: Color) -> Self {
        Self { horizon, zenith }
    }

    /// Background color for an escaping ray.
    pub fn color(&self, ray: &Ray) -> Color {
        let unit_direction = ray.direction().normalize();
        let t = 0.5 * (unit_direction.y + 1.0);
        self.horizon * (1.0 - t) + self.zenith * t
    }
}

/// Compute the color seen by a ray.
///
/// `depth` is the number of bounces still allowed; at zero the path carries
/// no more light.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    sky: &Sky,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
        return sky.color(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth - 1, sky, rng)
        }
        None => Color::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Material, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn single_sphere(material: Material) -> HittableList {
        HittableList::with_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(material),
        )))
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        let sky = Sky::default();
        let up = sky.color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        let down = sky.color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));
        let level = sky.color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)));

        assert!((up - sky.zenith).length() < 1e-6);
        assert!((down - sky.horizon).length() < 1e-6);
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = single_sphere(Material::lambertian(Color::ONE));
        let mut rng = StdRng::seed_from_u64(0);

        // Hit and miss alike
        for direction in [Vec3::new(0.0, 0.0, -1.0), Vec3::Y] {
            let ray = Ray::new(Vec3::ZERO, direction);
            assert_eq!(ray_color(&ray, &world, 0, &Sky::default(), &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_miss_returns_sky() {
        let world = HittableList::new();
        let sky = Sky::new(Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(ray_color(&ray, &world, 10, &sky, &mut rng), sky.zenith);
    }

    #[test]
    fn test_black_lambertian_absorbs_everything() {
        let world = single_sphere(Material::lambertian(Color::ZERO));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(17);

        for depth in 1..8 {
            let color = ray_color(&ray, &world, depth, &Sky::default(), &mut rng);
            assert_eq!(color, Color::ZERO);
        }
    }

    #[test]
    fn test_single_bounce_attenuates_sky() {
        // A scattered ray leaving a convex sphere can only reach the sky
        let world = single_sphere(Material::lambertian(Color::splat(0.5)));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..50 {
            let color = ray_color(&ray, &world, 2, &Sky::default(), &mut rng);
            assert!(color.max_element() <= 0.5 + 1e-6);
            assert!(color.min_element() >= 0.25 - 1e-6);
        }
    }

    #[test]
    fn test_absorbed_metal_paths_are_black() {
        // Grazing hit with maximum fuzz: roughly half the samples are absorbed
        let world = single_sphere(Material::metal(Color::ONE, 1.0));
        let ray = Ray::new(Vec3::new(0.499, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(31);

        let mut absorbed = 0;
        let mut escaped = 0;
        for _ in 0..200 {
            let color = ray_color(&ray, &world, 5, &Sky::default(), &mut rng);
            if color == Color::ZERO {
                absorbed += 1;
            } else {
                escaped += 1;
            }
        }
        assert!(absorbed > 0);
        assert!(escaped > 0);
    }
}
