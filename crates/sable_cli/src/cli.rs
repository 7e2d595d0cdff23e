use clap::{Parser, ValueEnum};
use log::LevelFilter;
use sable_renderer::RenderSettings;
use std::path::PathBuf;

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// One diffuse sphere resting on a large ground sphere
    Simple,
    /// Diffuse, hollow glass, and metal spheres side by side
    Materials,
    /// Field of small random spheres around three large ones
    Cover,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render a scene of spheres to a PNG.
#[derive(Debug, Parser)]
#[command(name = "sable", author, version, about, long_about = None)]
pub struct Args {
    /// JSON render settings. Flags below override values from the file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Built-in scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::Simple)]
    pub scene: SceneKind,

    /// JSON scene description, used instead of a built-in scene
    #[arg(long, value_name = "FILE", conflicts_with = "scene")]
    pub scene_file: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, value_name = "FILE", default_value = "image.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for a reproducible render
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 = one per core)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Open the image in the default viewer when done
    #[arg(long)]
    pub open: bool,

    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of `settings`.
    pub fn apply_overrides(&self, settings: &mut RenderSettings) {
        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
    }
}
