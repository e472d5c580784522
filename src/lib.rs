//! Smokestage library - raymarched smoke, scroll-choreographed camera and
//! spring-driven wireframe pulses

pub mod camera;
pub mod engine;
pub mod error;
pub mod math;
pub mod mesh;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod volume;

pub use engine::{DeviceTier, Engine, FrameInput, FrameOutput};
pub use error::{ConfigError, ConfigResult};
