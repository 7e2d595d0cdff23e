//! Render configuration.

use crate::error::{RenderError, RenderResult};
use crate::{CameraSettings, Sky};
use serde::{Deserialize, Serialize};

/// Everything the render loop needs besides the scene.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// settings file only has to mention what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub image_width: u32,
    /// Width / height. The image height is derived from it.
    pub aspect_ratio: f32,
    /// Jittered camera rays averaged per pixel
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    pub camera: CameraSettings,
    pub sky: Sky,
    /// Base seed for reproducible renders. `None` seeds every row from entropy.
    pub seed: Option<u64>,
    /// Worker threads. 0 lets rayon pick.
    pub threads: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            camera: CameraSettings::default(),
            sky: Sky::default(),
            seed: None,
            threads: 0,
        }
    }
}

impl RenderSettings {
    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Check the settings before rendering.
    pub fn validate(&self) -> RenderResult<()> {
        if self.image_width == 0 {
            return Err(invalid("image_width must be at least 1"));
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(invalid(format!(
                "aspect_ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(invalid("samples_per_pixel must be at least 1"));
        }

        let camera = &self.camera;
        let fov = camera.vertical_fov;
        if fov.is_nan() || fov <= 0.0 || fov >= 180.0 {
            return Err(invalid(format!(
                "vertical_fov must be in (0, 180) degrees, got {}",
                fov
            )));
        }
        if !camera.aperture.is_finite() || camera.aperture < 0.0 {
            return Err(invalid(format!(
                "aperture must be finite and not negative, got {}",
                camera.aperture
            )));
        }
        if !camera.focus_distance.is_finite() || camera.focus_distance <= 0.0 {
            return Err(invalid(format!(
                "focus_distance must be finite and positive, got {}",
                camera.focus_distance
            )));
        }

        let view = camera.look_from - camera.look_at;
        if view.length_squared() == 0.0 {
            return Err(invalid("look_from and look_at must differ"));
        }
        if camera.up.cross(view).length_squared() <= f32::EPSILON * view.length_squared() {
            return Err(invalid("up must not be parallel to the view direction"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RenderError {
    RenderError::InvalidSettings(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.image_height(), 225);
    }

    #[test]
    fn test_image_height_never_zero() {
        let settings = RenderSettings {
            image_width: 1,
            aspect_ratio: 16.0,
            ..Default::default()
        };
        assert_eq!(settings.image_height(), 1);
    }

    #[test]
    fn test_rejects_zero_samples() {
        let settings = RenderSettings {
            samples_per_pixel: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RenderError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_rejects_bad_aspect_ratio() {
        for aspect_ratio in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let settings = RenderSettings {
                aspect_ratio,
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "accepted {}", aspect_ratio);
        }
    }

    #[test]
    fn test_rejects_degenerate_view() {
        let mut settings = RenderSettings::default();
        settings.camera.look_at = settings.camera.look_from;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.camera = settings
            .camera
            .with_position(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_lens() {
        let mut settings = RenderSettings::default();
        settings.camera.aperture = -0.1;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.camera.focus_distance = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.camera.vertical_fov = 180.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_lens() {
        for value in [f32::INFINITY, f32::NAN] {
            let mut settings = RenderSettings::default();
            settings.camera.aperture = value;
            assert!(settings.validate().is_err(), "accepted aperture {}", value);

            let mut settings = RenderSettings::default();
            settings.camera.focus_distance = value;
            assert!(settings.validate().is_err(), "accepted focus {}", value);
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "image_width": 200,
            "samples_per_pixel": 8,
            "seed": 7,
            "camera": { "look_from": [13.0, 2.0, 3.0], "look_at": [0.0, 0.0, 0.0], "vertical_fov": 20.0 }
        }"#;
        let settings: RenderSettings = serde_json::from_str(json).expect("valid settings");

        assert_eq!(settings.image_width, 200);
        assert_eq!(settings.samples_per_pixel, 8);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.max_depth, 50);
        assert_eq!(settings.camera.look_from, Vec3::new(13.0, 2.0, 3.0));
        assert_eq!(settings.camera.up, Vec3::Y);
        assert_eq!(settings.sky, Sky::default());
        assert!(settings.validate().is_ok());
    }
}
