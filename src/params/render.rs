//! Projection and recording configuration.

use serde::{Deserialize, Serialize};

/// Projection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame width (pixels)
    pub width: u32,

    /// Frame height (pixels)
    pub height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            fov_degrees: 45.0,
            near_plane_m: 0.1,
            far_plane_m: 100.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, output_dir: impl Into<String>) -> Self {
        Self {
            duration_secs,
            output_dir: output_dir.into(),
            fps: 30,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Path of frame `index`
    pub fn frame_path(&self, index: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), index)
    }
}
