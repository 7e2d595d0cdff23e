//! Sable command line renderer.
//!
//! Renders a built-in or JSON-described scene of spheres and writes a PNG.

mod cli;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use sable_renderer::{RenderSettings, Renderer};
use std::path::Path;
use std::time::Instant;

use cli::Args;
use scenes::Scene;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let start = Instant::now();

    let (mut settings, config_has_camera) = match &args.config {
        Some(path) => load_settings(path)?,
        None => (RenderSettings::default(), false),
    };
    args.apply_overrides(&mut settings);

    let scene = match &args.scene_file {
        Some(path) => scenes::load_scene(path)?,
        None => {
            let scene_seed = settings.seed.unwrap_or_else(rand::random);
            info!("Building {:?} scene (seed {})", args.scene, scene_seed);
            Scene::preset(args.scene, scene_seed)
        }
    };
    // A camera in the settings file wins over the scene's own framing
    if !config_has_camera {
        settings.camera = scene.camera;
    }
    info!("Scene has {} objects", scene.world.len());

    let renderer = Renderer::new(settings).context("Invalid render settings")?;
    info!(
        "Creating a {}x{} image, {} samples per pixel, max depth {}",
        renderer.width(),
        renderer.height(),
        renderer.settings().samples_per_pixel,
        renderer.settings().max_depth
    );

    let render_start = Instant::now();
    let image = renderer.render_image(&scene.world)?;
    info!("Time taken to render image: {:.2?}", render_start.elapsed());

    info!("Saving image to {}", args.output.display());
    let save_start = Instant::now();
    image
        .save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output.display()))?;
    info!("Time taken to save image: {:.2?}", save_start.elapsed());
    info!("Total time: {:.2?}", start.elapsed());

    if args.open {
        if let Err(e) = open_in_viewer(&args.output) {
            warn!("Could not open {}: {:#}", args.output.display(), e);
        }
    }

    Ok(())
}

/// Read render settings from JSON. Also reports whether the file sets a camera.
fn load_settings(path: &Path) -> Result<(RenderSettings, bool)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    let has_camera = value.get("camera").is_some();
    let settings = serde_json::from_value(value)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    info!("Loaded settings from {}", path.display());
    Ok((settings, has_camera))
}

/// Hand the written file to the platform's default viewer.
fn open_in_viewer(path: &Path) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = std::process::Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };
    #[cfg(target_os = "macos")]
    let mut command = std::process::Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = std::process::Command::new("xdg-open");

    command
        .arg(path)
        .spawn()
        .context("Failed to launch image viewer")?;
    Ok(())
}
