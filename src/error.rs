//! Configuration errors.
//!
//! Everything here is a caller contract violation detected when a
//! configuration is built. Per-frame math never returns errors; it clamps.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("volume box is degenerate: min {min:?} must be below max {max:?} on every axis")]
    DegenerateBox { min: [f32; 3], max: [f32; 3] },

    #[error("density multiplier must be >= 0, got {0}")]
    NegativeDensity(f32),

    #[error("absorption must be >= 0, got {0}")]
    NegativeAbsorption(f32),

    #[error("{name} must be a unit vector, got length {length}")]
    NonUnitVector { name: &'static str, length: f32 },

    #[error("phase anisotropy g must lie in (-1, 1), got {0}")]
    PhaseOutOfRange(f32),

    #[error("{name} must be at least 1")]
    ZeroSteps { name: &'static str },

    #[error("noise scale must be > 0, got {0}")]
    InvalidNoiseScale(f32),

    #[error("camera script has no stops")]
    EmptyStops,

    #[error("camera stop {index} is invalid: {reason}")]
    InvalidStop { index: usize, reason: String },

    #[error("camera {name} is invalid: {reason}")]
    InvalidPose { name: &'static str, reason: String },

    #[error("spring constants k={k}, damping={damping} do not converge")]
    UnstableSpring { k: f32, damping: f32 },

    #[error("invalid mesh configuration: {0}")]
    InvalidMesh(String),

    #[error("failed to load scene file: {0}")]
    Scene(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
