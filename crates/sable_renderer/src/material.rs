//! Surface scattering.
//!
//! Materials form a closed set, so they are an enum rather than a trait
//! object. They hold only their parameters and are shared read-only across
//! render threads.

use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
use crate::{hittable::HitRecord, Color, Ray};
use log::warn;
use rand::RngCore;
use sable_math::{near_zero, reflect, refract};
use serde::{Deserialize, Serialize};

/// How a surface responds to an incoming ray.
///
/// Deserializing goes through the constructors, so a scene file gets the same
/// fuzz clamping as code does and cannot load a degenerate refraction index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "MaterialDef")]
pub enum Material {
    /// Ideal diffuse surface.
    Lambertian { albedo: Color },
    /// Specular reflector. `fuzz` in [0, 1] roughens the reflection.
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive medium such as glass (1.5) or water (1.33).
    Dielectric { refraction_index: f32 },
}

/// Material parameters as written in a scene file, before validation.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MaterialDef {
    Lambertian { albedo: Color },
    Metal { albedo: Color, fuzz: f32 },
    Dielectric { refraction_index: f32 },
}

impl TryFrom<MaterialDef> for Material {
    type Error = String;

    fn try_from(def: MaterialDef) -> Result<Self, Self::Error> {
        match def {
            MaterialDef::Lambertian { albedo } => Ok(Material::lambertian(albedo)),
            MaterialDef::Metal { albedo, fuzz } => {
                if !fuzz.is_finite() {
                    return Err(format!("metal fuzz must be finite, got {}", fuzz));
                }
                Ok(Material::metal(albedo, fuzz))
            }
            MaterialDef::Dielectric { refraction_index } => {
                if !refraction_index.is_finite() || refraction_index <= 0.0 {
                    return Err(format!(
                        "refraction_index must be positive, got {}",
                        refraction_index
                    ));
                }
                Ok(Material::dielectric(refraction_index))
            }
        }
    }
}

/// A ray that continues after hitting a surface.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel multiplier applied to the light arriving along `scattered`
    pub attenuation: Color,
    pub scattered: Ray,
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    /// Metal with `fuzz` clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        let clamped = fuzz.clamp(0.0, 1.0);
        if clamped != fuzz {
            warn!("Metal fuzz {} out of range, clamped to {}", fuzz, clamped);
        }
        Material::Metal {
            albedo,
            fuzz: clamped,
        }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` when the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Material::Lambertian { albedo } => Some(scatter_lambertian(albedo, rec, rng)),
            Material::Metal { albedo, fuzz } => scatter_metal(albedo, fuzz, ray_in, rec, rng),
            Material::Dielectric { refraction_index } => {
                Some(scatter_dielectric(refraction_index, ray_in, rec, rng))
            }
        }
    }
}

fn scatter_lambertian(albedo: Color, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
    let mut scatter_direction = rec.normal + random_unit_vector(rng);

    // The random vector nearly cancelled the normal
    if near_zero(scatter_direction) {
        scatter_direction = rec.normal;
    }

    ScatterResult {
        attenuation: albedo,
        scattered: Ray::new(rec.p, scatter_direction),
    }
}

fn scatter_metal(
    albedo: Color,
    fuzz: f32,
    ray_in: &Ray,
    rec: &HitRecord,
    rng: &mut dyn RngCore,
) -> Option<ScatterResult> {
    let reflected = reflect(ray_in.direction().normalize(), rec.normal);
    let scattered = Ray::new(rec.p, reflected + fuzz * random_in_unit_sphere(rng));

    // Fuzz pushed the reflection below the surface
    if scattered.direction().dot(rec.normal) > 0.0 {
        Some(ScatterResult {
            attenuation: albedo,
            scattered,
        })
    } else {
        None
    }
}

fn scatter_dielectric(
    refraction_index: f32,
    ray_in: &Ray,
    rec: &HitRecord,
    rng: &mut dyn RngCore,
) -> ScatterResult {
    let refraction_ratio = if rec.front_face {
        1.0 / refraction_index
    } else {
        refraction_index
    };

    let unit_direction = ray_in.direction().normalize();
    let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let cannot_refract = refraction_ratio * sin_theta > 1.0;
    let direction = if cannot_refract || gen_f32(rng) < reflectance(cos_theta, refraction_ratio) {
        reflect(unit_direction, rec.normal)
    } else {
        refract(unit_direction, rec.normal, refraction_ratio)
    };

    ScatterResult {
        attenuation: Color::ONE,
        scattered: Ray::new(rec.p, direction),
    }
}

/// Schlick's approximation for Fresnel reflectance.
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
