//! Scene construction: built-in presets and JSON scene files.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sable_renderer::sampling::{gen_f32, gen_range_f32, random_color};
use sable_renderer::{CameraSettings, Color, HittableList, Material, Point, Sphere, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::cli::SceneKind;

/// A world together with the camera that frames it.
pub struct Scene {
    pub world: HittableList,
    pub camera: CameraSettings,
}

impl Scene {
    pub fn preset(kind: SceneKind, seed: u64) -> Self {
        match kind {
            SceneKind::Simple => simple(),
            SceneKind::Materials => materials(),
            SceneKind::Cover => cover(seed),
        }
    }
}

fn sphere(center: Point, radius: f32, material: &Arc<Material>) -> Box<Sphere> {
    Box::new(Sphere::new(center, radius, Arc::clone(material)))
}

/// One diffuse sphere on a large ground sphere, seen from the origin.
pub fn simple() -> Scene {
    let ground = Arc::new(Material::lambertian(Color::new(0.8, 0.8, 0.0)));
    let center = Arc::new(Material::lambertian(Color::new(0.7, 0.3, 0.3)));

    let mut world = HittableList::new();
    world.add(sphere(Point::new(0.0, -100.5, -1.0), 100.0, &ground));
    world.add(sphere(Point::new(0.0, 0.0, -1.0), 0.5, &center));

    Scene {
        world,
        camera: CameraSettings::default(),
    }
}

/// Diffuse center, hollow glass on the left, fuzzy metal on the right.
pub fn materials() -> Scene {
    let ground = Arc::new(Material::lambertian(Color::new(0.8, 0.8, 0.0)));
    let center = Arc::new(Material::lambertian(Color::new(0.1, 0.2, 0.5)));
    let glass = Arc::new(Material::dielectric(1.5));
    let metal = Arc::new(Material::metal(Color::new(0.8, 0.6, 0.2), 0.0));

    let mut world = HittableList::new();
    world.add(sphere(Point::new(0.0, -100.5, -1.0), 100.0, &ground));
    world.add(sphere(Point::new(0.0, 0.0, -1.0), 0.5, &center));
    world.add(sphere(Point::new(-1.0, 0.0, -1.0), 0.5, &glass));
    // Negative radius flips the normals inward, making the glass a shell
    world.add(sphere(Point::new(-1.0, 0.0, -1.0), -0.4, &glass));
    world.add(sphere(Point::new(1.0, 0.0, -1.0), 0.5, &metal));

    let camera = CameraSettings::default()
        .with_position(Point::new(-2.0, 2.0, 1.0), Point::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 0.0, 1.0);

    Scene { world, camera }
}

/// Hundreds of small random spheres around three large ones.
///
/// The layout is drawn from `seed`, so the same seed always builds the same
/// scene.
pub fn cover(seed: u64) -> Scene {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = HittableList::new();

    let ground = Arc::new(Material::lambertian(Color::splat(0.5)));
    world.add(sphere(Point::new(0.0, -1000.0, 0.0), 1000.0, &ground));

    let glass = Arc::new(Material::dielectric(1.5));
    let clearing = Point::new(4.0, 0.2, 0.0);

    for a in -11..11 {
        for b in -11..11 {
            let center = Point::new(
                a as f32 + 0.9 * gen_f32(&mut rng),
                0.2,
                b as f32 + 0.9 * gen_f32(&mut rng),
            );
            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let choice = gen_f32(&mut rng);
            let material = if choice < 0.8 {
                let albedo = random_color(&mut rng, 0.0, 1.0) * random_color(&mut rng, 0.0, 1.0);
                Arc::new(Material::lambertian(albedo))
            } else if choice < 0.95 {
                let albedo = random_color(&mut rng, 0.5, 1.0);
                let fuzz = gen_range_f32(&mut rng, 0.0, 0.5);
                Arc::new(Material::metal(albedo, fuzz))
            } else {
                Arc::clone(&glass)
            };
            world.add(sphere(center, 0.2, &material));
        }
    }

    let diffuse = Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let metal = Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    world.add(sphere(Point::new(0.0, 1.0, 0.0), 1.0, &glass));
    world.add(sphere(Point::new(-4.0, 1.0, 0.0), 1.0, &diffuse));
    world.add(sphere(Point::new(4.0, 1.0, 0.0), 1.0, &metal));

    let camera = CameraSettings::default()
        .with_position(Point::new(13.0, 2.0, 3.0), Point::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);

    Scene { world, camera }
}

/// On-disk scene layout. Materials are named once and shared by reference.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    camera: Option<CameraSettings>,
    materials: HashMap<String, Material>,
    spheres: Vec<SphereEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SphereEntry {
    center: Point,
    radius: f32,
    material: String,
}

/// Parse a JSON scene description.
pub fn parse_scene(json: &str) -> Result<Scene> {
    let file: SceneFile = serde_json::from_str(json).context("Invalid scene description")?;

    let materials: HashMap<String, Arc<Material>> = file
        .materials
        .into_iter()
        .map(|(name, material)| (name, Arc::new(material)))
        .collect();

    let mut world = HittableList::new();
    for (index, entry) in file.spheres.iter().enumerate() {
        let Some(material) = materials.get(&entry.material) else {
            bail!(
                "Sphere {} uses unknown material '{}'",
                index,
                entry.material
            );
        };
        if entry.radius == 0.0 || !entry.radius.is_finite() {
            bail!("Sphere {} has invalid radius {}", index, entry.radius);
        }
        world.add(sphere(entry.center, entry.radius, material));
    }

    Ok(Scene {
        world,
        camera: file.camera.unwrap_or_default(),
    })
}

/// Load a JSON scene description from disk.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    parse_scene(&json).with_context(|| format!("Failed to load scene {}", path.display()))
}
