//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use crate::{Point, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// User-facing camera placement and lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Camera position
    pub look_from: Point,
    /// Point the camera aims at
    pub look_at: Point,
    /// World "up", used to roll the camera upright
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vertical_fov: f32,
    /// Lens diameter. Zero gives a pinhole camera with no defocus blur.
    pub aperture: f32,
    /// Distance from `look_from` to the plane of perfect focus
    pub focus_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Point::ZERO,
            look_at: Point::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vertical_fov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Point, look_at: Point, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vertical_fov: f32, aperture: f32, focus_distance: f32) -> Self {
        self.vertical_fov = vertical_fov;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }
}

/// Maps image-plane coordinates to world-space rays.
///
/// Everything is derived once in [`Camera::new`]; generating a ray only
/// reads the camera, so one camera serves every render thread.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Point,
    lower_left_corner: Point,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Build a camera for an image with the given width / height ratio.
    pub fn new(settings: &CameraSettings, aspect_ratio: f32) -> Self {
        let theta = settings.vertical_fov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Orthonormal basis, camera looks down -w
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.up.cross(w).normalize();
        let v = w.cross(u);

        // Viewport lives on the focus plane
        let origin = settings.look_from;
        let horizontal = settings.focus_distance * viewport_width * u;
        let vertical = settings.focus_distance * viewport_height * v;
        let lower_left_corner =
            origin - horizontal / 2.0 - vertical / 2.0 - settings.focus_distance * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
        }
    }

    /// Generate a ray through viewport coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner and `(1, 1)` the upper-right.
    /// Values outside that range are fine and extend the viewport plane.
    /// The RNG is only consulted when the lens has a non-zero radius.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(self.origin + offset, target - self.origin - offset)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Direction the camera faces.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraSettings::default(), 16.0 / 9.0)
    }
}
