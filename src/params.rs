//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning constants live here with:
//! - Physical units (meters, seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - `validate()` to reject configurations at load time

mod camera;
mod mesh;
mod render;
mod volume;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// Re-export all types
pub use camera::{CameraPose, CameraScript, CameraStop, Flourish, IntroShot, PHI_EPSILON};
pub use mesh::{MeshParams, MeshShape, PulseParams, PulseWave, SpringParams};
pub use render::{RecordingConfig, RenderConfig};
pub use volume::{PointerGlow, VolumeParams, WaveBand};

/// Everything the engine needs, set once per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub volume: VolumeParams,
    pub camera: CameraScript,
    pub mesh: MeshParams,
    pub springs: SpringParams,
    pub pulse: PulseParams,
    pub render: RenderConfig,

    /// Noise seed shared by volume and mesh
    pub noise_seed: u32,
}

impl SceneConfig {
    /// Load a JSON scene file; missing fields fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Scene(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let scene: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Scene(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.volume.validate()?;
        self.camera.validate()?;
        self.mesh.validate()?;
        self.springs.validate()?;
        self.pulse.validate()?;
        Ok(())
    }
}
