//! Pixel sampling and the parallel render loop.
//!
//! Rows are independent: each one gets its own RNG and is rendered on
//! whichever rayon worker picks it up. Finished rows are handed back to the
//! calling thread, which is the only one that touches the framebuffer.

use crate::error::{RenderError, RenderResult};
use crate::integrator::ray_color;
use crate::sampling::{gen_f32, row_seed};
use crate::{Camera, Color, Hittable, RenderSettings};
use image::{Rgb, RgbImage};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use sable_math::Interval;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Destination for finished pixels.
///
/// Row 0 is the top of the image.
pub trait Framebuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set(&mut self, x: u32, y: u32, color: Rgb<u8>);
}

impl Framebuffer for RgbImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }

    fn set(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        self.put_pixel(x, y, color);
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize an averaged linear color to 8 bits per channel.
pub fn to_rgb8(color: Color) -> Rgb<u8> {
    const INTENSITY: Interval = Interval {
        min: 0.0,
        max: 0.999,
    };
    let quantize = |c: f32| (256.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8;
    Rgb([quantize(color.x), quantize(color.y), quantize(color.z)])
}

/// Renders a scene with fixed settings.
#[derive(Debug, Clone)]
pub struct Renderer {
    settings: RenderSettings,
    camera: Camera,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Validate `settings` and set up the camera.
    pub fn new(settings: RenderSettings) -> RenderResult<Self> {
        settings.validate()?;
        let camera = Camera::new(&settings.camera, settings.aspect_ratio);
        let width = settings.image_width;
        let height = settings.image_height();
        debug!("Renderer settings: {:?}", settings);

        Ok(Self {
            settings,
            camera,
            width,
            height,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Average `samples_per_pixel` jittered samples for image pixel `(x, y)`.
    ///
    /// Returns the linear color, before gamma. `(x, y)` must lie inside the
    /// image, with `y = 0` the top row.
    pub fn render_pixel(&self, x: u32, y: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Color {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} image",
            x,
            y,
            self.width,
            self.height
        );
        // Camera space has t = 0 at the bottom
        let j = self.height - y - 1;
        let s_scale = (self.width - 1).max(1) as f32;
        let t_scale = (self.height - 1).max(1) as f32;

        let mut pixel_color = Color::ZERO;
        for _ in 0..self.settings.samples_per_pixel {
            let s = (x as f32 + gen_f32(rng)) / s_scale;
            let t = (j as f32 + gen_f32(rng)) / t_scale;
            let ray = self.camera.get_ray(s, t, rng);
            pixel_color += ray_color(
                &ray,
                world,
                self.settings.max_depth,
                &self.settings.sky,
                rng,
            );
        }

        pixel_color / self.settings.samples_per_pixel as f32
    }

    /// Render one image row, left to right.
    pub fn render_row(&self, y: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Vec<Rgb<u8>> {
        (0..self.width)
            .map(|x| to_rgb8(self.render_pixel(x, y, world, rng)))
            .collect()
    }

    /// Render the whole image in parallel.
    ///
    /// With a seed configured the output is identical across runs and thread
    /// counts, since every row draws from its own seeded generator.
    pub fn render<F: Framebuffer + ?Sized>(
        &self,
        world: &dyn Hittable,
        framebuffer: &mut F,
    ) -> RenderResult<()> {
        self.check_framebuffer(framebuffer)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .build()?;
        info!(
            "Rendering {}x{} @ {} spp on {} threads",
            self.width,
            self.height,
            self.settings.samples_per_pixel,
            pool.current_num_threads()
        );

        let start = Instant::now();
        let rows_done = AtomicU32::new(0);
        let progress_step = (self.height / 10).max(1);

        let rows: Vec<Vec<Rgb<u8>>> = pool.install(|| {
            (0..self.height)
                .into_par_iter()
                .map(|y| {
                    let mut rng = self.row_rng(y);
                    let row = self.render_row(y, world, &mut rng);

                    let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % progress_step == 0 {
                        debug!("{}/{} rows done", done, self.height);
                    }
                    row
                })
                .collect()
        });

        for (y, row) in (0..self.height).zip(rows) {
            for (x, color) in (0..self.width).zip(row) {
                framebuffer.set(x, y, color);
            }
        }

        info!("Rendered in {:.2?}", start.elapsed());
        Ok(())
    }

    /// Render the whole image on the calling thread from a single RNG.
    pub fn render_serial<F: Framebuffer + ?Sized>(
        &self,
        world: &dyn Hittable,
        framebuffer: &mut F,
        rng: &mut dyn RngCore,
    ) -> RenderResult<()> {
        self.check_framebuffer(framebuffer)?;

        let start = Instant::now();
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.render_pixel(x, y, world, rng);
                framebuffer.set(x, y, to_rgb8(color));
            }
        }

        info!("Rendered {}x{} serially in {:.2?}", self.width, self.height, start.elapsed());
        Ok(())
    }

    /// Render into a freshly allocated image.
    pub fn render_image(&self, world: &dyn Hittable) -> RenderResult<RgbImage> {
        let mut image = RgbImage::new(self.width, self.height);
        self.render(world, &mut image)?;
        Ok(image)
    }

    fn row_rng(&self, y: u32) -> StdRng {
        match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(row_seed(seed, y)),
            None => StdRng::from_entropy(),
        }
    }

    fn check_framebuffer<F: Framebuffer + ?Sized>(&self, framebuffer: &F) -> RenderResult<()> {
        if framebuffer.width() != self.width || framebuffer.height() != self.height {
            return Err(RenderError::FramebufferSize {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: framebuffer.width(),
                actual_height: framebuffer.height(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Material, Sphere, Vec3};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Framebuffer that records every write.
    #[derive(Default)]
    struct RecordingFramebuffer {
        width: u32,
        height: u32,
        writes: HashMap<(u32, u32), Rgb<u8>>,
        write_count: usize,
    }

    impl Framebuffer for RecordingFramebuffer {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn set(&mut self, x: u32, y: u32, color: Rgb<u8>) {
            self.writes.insert((x, y), color);
            self.write_count += 1;
        }
    }

    fn small_settings() -> RenderSettings {
        RenderSettings {
            image_width: 16,
            aspect_ratio: 2.0,
            samples_per_pixel: 4,
            max_depth: 5,
            seed: Some(99),
            ..Default::default()
        }
    }

    fn one_sphere() -> HittableList {
        HittableList::with_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Material::lambertian(Color::splat(0.5))),
        )))
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(linear_to_gamma(f32::NAN), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_to_rgb8_clamps_and_gamma_corrects() {
        assert_eq!(to_rgb8(Color::ZERO), Rgb([0, 0, 0]));
        assert_eq!(to_rgb8(Color::ONE), Rgb([255, 255, 255]));
        assert_eq!(to_rgb8(Color::splat(7.5)), Rgb([255, 255, 255]));
        assert_eq!(to_rgb8(Color::new(0.25, -0.3, 1.0)), Rgb([128, 0, 255]));
    }

    #[test]
    fn test_writes_every_pixel_once() {
        let renderer = Renderer::new(small_settings()).expect("valid settings");
        let mut framebuffer = RecordingFramebuffer {
            width: 16,
            height: 8,
            ..Default::default()
        };

        renderer.render(&one_sphere(), &mut framebuffer).expect("render");
        assert_eq!(framebuffer.write_count, 16 * 8);
        assert_eq!(framebuffer.writes.len(), 16 * 8);
    }

    #[test]
    fn test_rejects_mismatched_framebuffer() {
        let renderer = Renderer::new(small_settings()).expect("valid settings");
        let mut image = RgbImage::new(10, 10);

        let err = renderer.render(&one_sphere(), &mut image).unwrap_err();
        assert!(matches!(err, RenderError::FramebufferSize { .. }));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = RenderSettings {
            image_width: 0,
            ..small_settings()
        };
        assert!(matches!(
            Renderer::new(settings),
            Err(RenderError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_seeded_render_ignores_thread_count() {
        let world = one_sphere();
        let single = Renderer::new(RenderSettings {
            threads: 1,
            ..small_settings()
        })
        .expect("valid settings");
        let many = Renderer::new(RenderSettings {
            threads: 4,
            ..small_settings()
        })
        .expect("valid settings");

        let a = single.render_image(&world).expect("render");
        let b = many.render_image(&world).expect("render");
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_empty_scene_pixel_is_sky() {
        let settings = RenderSettings {
            samples_per_pixel: 1,
            ..small_settings()
        };
        let renderer = Renderer::new(settings).expect("valid settings");
        let mut rng = StdRng::seed_from_u64(1);

        // Top row looks up, bottom row looks down
        let top = renderer.render_pixel(8, 0, &HittableList::new(), &mut rng);
        let bottom = renderer.render_pixel(8, 7, &HittableList::new(), &mut rng);
        assert!(top.x < bottom.x);
        assert!(top.z >= bottom.z);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 16x8 image")]
    fn test_pixel_below_last_row_panics() {
        let renderer = Renderer::new(small_settings()).expect("valid settings");
        let mut rng = StdRng::seed_from_u64(1);
        renderer.render_pixel(0, renderer.height(), &HittableList::new(), &mut rng);
    }
}
