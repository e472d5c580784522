//! Command-line argument parsing.

use anyhow::{Context, Result};
use clap::Parser;

use smokestage::params::{RecordingConfig, SceneConfig};
use smokestage::DeviceTier;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "smokestage")]
#[command(about = "Headless renderer for the smoke, camera and wireframe pulse engine", long_about = None)]
pub struct Args {
    /// JSON scene file; missing fields use defaults
    #[arg(long, value_name = "PATH")]
    pub scene: Option<String>,

    /// Output width (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "960")]
    pub width: u32,

    /// Output height (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "540")]
    pub height: u32,

    /// Scroll progress for a single still frame (0..1)
    #[arg(long, value_name = "PROGRESS", default_value = "0.0")]
    pub scroll: f32,

    /// Time of the still frame (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "4.0")]
    pub time: f32,

    /// Device tier: low, medium, high
    #[arg(long, value_name = "TIER", default_value = "high")]
    pub tier: DeviceTier,

    /// Pointer position in normalized device coordinates
    #[arg(long, value_name = "NDC", num_args = 2, allow_negative_numbers = true)]
    pub pointer: Option<Vec<f32>>,

    /// Time the host signals readiness (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0.5")]
    pub ready_at: f32,

    /// Never send the ready signal (intro starts on its timeout)
    #[arg(long)]
    pub no_ready: bool,

    /// Record a scroll sweep from 0 to 1 (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Output directory
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub output: String,

    /// Noise seed override
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u32>,
}

impl Args {
    /// Load the scene file (or defaults) and apply command-line overrides
    pub fn load_scene(&self) -> Result<SceneConfig> {
        let mut scene = match &self.scene {
            Some(path) => {
                log::info!("loading scene {}", path);
                SceneConfig::from_json_file(path)
                    .with_context(|| format!("failed to load scene {}", path))?
            }
            None => SceneConfig::default(),
        };
        if let Some(seed) = self.seed {
            scene.noise_seed = seed;
        }
        scene.render.width = self.width;
        scene.render.height = self.height;
        Ok(scene)
    }

    /// When the ready signal fires, if at all
    pub fn ready_time(&self) -> Option<f32> {
        (!self.no_ready).then_some(self.ready_at)
    }

    /// Pointer NDC, centered when not given
    pub fn pointer_ndc(&self) -> glam::Vec2 {
        match self.pointer.as_deref() {
            Some([x, y]) => glam::Vec2::new(*x, *y),
            _ => glam::Vec2::ZERO,
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        let config = RecordingConfig::new(duration, self.output.clone());

        // Create output directories
        std::fs::create_dir_all(config.frames_dir())
            .with_context(|| format!("failed to create {}", config.frames_dir()))?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let args = Args::parse_from(["smokestage"]);
        assert_eq!(args.tier, DeviceTier::High);
        assert_eq!(args.ready_time(), Some(0.5));
        assert_eq!(Args::parse_from(["smokestage", "--no-ready"]).ready_time(), None);
        assert_eq!(args.pointer_ndc(), glam::Vec2::ZERO);
        assert!(args.record.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from([
            "smokestage",
            "--width",
            "320",
            "--height",
            "180",
            "--seed",
            "9",
            "--tier",
            "low",
            "--pointer",
            "-0.5",
            "0.25",
        ]);
        let scene = args.load_scene().expect("default scene loads");
        assert_eq!(scene.render.width, 320);
        assert_eq!(scene.noise_seed, 9);
        assert_eq!(args.tier, DeviceTier::Low);
        assert_eq!(args.pointer_ndc(), glam::Vec2::new(-0.5, 0.25));
    }
}
