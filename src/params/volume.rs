//! Smoke volume parameters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Tolerance for "unit length" checks on configured directions
const UNIT_TOLERANCE: f32 = 1e-3;

/// One traveling sine band multiplied into the density
///
/// Value is `mix(floor, 1, 0.5 + 0.5 * sin(dot(p, axis) * frequency - time * speed))`,
/// so the band never removes more than `1 - floor` of the smoke.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveBand {
    /// Direction the band travels along (need not be unit length)
    pub axis: [f32; 3],

    /// Spatial frequency (radians per meter along `axis`)
    pub frequency: f32,

    /// Travel speed (radians per second)
    pub speed: f32,

    /// Minimum multiplier in the band's trough (0..1)
    pub floor: f32,
}

/// Pointer-driven brightening of the smoke around the cursor's world position
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerGlow {
    /// Gaussian radius of the glow (meters)
    pub radius_m: f32,

    /// Luminance gain at the pointer (0 disables the glow)
    pub strength: f32,
}

impl Default for PointerGlow {
    fn default() -> Self {
        Self {
            radius_m: 1.6,
            strength: 0.8,
        }
    }
}

/// Participating-medium parameters for the raymarched smoke box
///
/// Immutable once the engine is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeParams {
    // === Bounds ===
    /// Box minimum corner (meters, world space)
    pub box_min: [f32; 3],

    /// Box maximum corner (meters, world space)
    pub box_max: [f32; 3],

    // === Motion ===
    /// Wind direction (unit vector)
    pub wind_direction: [f32; 3],

    /// Wind speed (noise-space units per second)
    pub wind_speed: f32,

    /// Per-octave advection rates (fraction of wind offset applied to octave i)
    pub octave_advection: Vec<f32>,

    // === Medium ===
    /// Density multiplier; also the clamp ceiling for density
    pub density_multiplier: f32,

    /// Absorption coefficient (extinction per unit density per meter)
    pub absorption: f32,

    /// Noise frequency (cycles per meter)
    pub noise_scale: f32,

    /// Remapped-noise level where smoke starts (0..1)
    pub density_threshold: f32,

    /// Width of the smoothstep above the threshold
    pub threshold_softness: f32,

    /// Densities below this are skipped by the marcher
    pub min_density: f32,

    /// Traveling flow bands
    pub waves: Vec<WaveBand>,

    /// Global pulsation frequency (Hz)
    pub pulsation_hz: f32,

    /// Global pulsation depth (0 = none, 1 = breathes to zero)
    pub pulsation_depth: f32,

    // === Falloffs (normalized box coordinates) ===
    /// Distance from the box faces over which density fades in
    pub edge_falloff: f32,

    /// Fraction of the box height fading in at the bottom
    pub height_fade_bottom: f32,

    /// Fraction of the box height fading out at the top
    pub height_fade_top: f32,

    /// Normalized radius from the vertical axis where radial fade starts
    pub radial_fade_start: f32,

    /// Normalized radius where density reaches zero
    pub radial_fade_end: f32,

    // === Lighting ===
    /// Direction toward the light (unit vector)
    pub light_direction: [f32; 3],

    /// Light color (linear RGB)
    pub light_color: [f32; 3],

    /// Light intensity multiplier
    pub light_intensity: f32,

    /// Henyey-Greenstein anisotropy, -1 (back) .. 1 (forward)
    pub phase_g: f32,

    /// Ambient color at the bottom of the box
    pub ambient_low: [f32; 3],

    /// Ambient color at the top of the box
    pub ambient_high: [f32; 3],

    /// Ambient contribution weight
    pub ambient_strength: f32,

    // === March quality ===
    /// Primary ray samples
    pub step_count: u32,

    /// Samples toward the light per primary sample
    pub shadow_steps: u32,

    /// Length of each shadow step (meters)
    pub shadow_step_m: f32,

    /// Extra darkening applied to the shadow extinction
    pub shadow_boost: f32,

    /// Stop marching once transmittance drops below this
    pub early_exit_transmittance: f32,

    /// Cursor glow
    pub pointer_glow: PointerGlow,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            box_min: [-4.0, -0.75, -4.0],
            box_max: [4.0, 2.75, 4.0],

            wind_direction: [0.8, 0.0, 0.6],
            wind_speed: 0.12,
            octave_advection: vec![1.0, 0.75, 0.55, 0.4],

            density_multiplier: 1.4,
            absorption: 0.38,
            noise_scale: 0.45,
            density_threshold: 0.3,
            threshold_softness: 0.35,
            min_density: 1e-3,

            waves: vec![
                WaveBand {
                    axis: [1.0, 0.0, 0.0],
                    frequency: 0.9,
                    speed: 0.6,
                    floor: 0.55,
                },
                WaveBand {
                    axis: [0.0, 0.4, 1.0],
                    frequency: 1.7,
                    speed: 1.1,
                    floor: 0.65,
                },
                WaveBand {
                    axis: [0.7, 0.0, -0.7],
                    frequency: 3.1,
                    speed: 1.9,
                    floor: 0.8,
                },
            ],
            pulsation_hz: 0.07,
            pulsation_depth: 0.2,

            edge_falloff: 0.25,
            height_fade_bottom: 0.15,
            height_fade_top: 0.35,
            radial_fade_start: 0.55,
            radial_fade_end: 1.0,

            light_direction: [0.0, 1.0, 0.0],
            light_color: [1.0, 0.86, 0.72],
            light_intensity: 9.0,
            phase_g: 0.35,
            ambient_low: [0.05, 0.06, 0.11],
            ambient_high: [0.16, 0.15, 0.22],
            ambient_strength: 0.6,

            step_count: 40,
            shadow_steps: 3,
            shadow_step_m: 0.35,
            shadow_boost: 1.5,
            early_exit_transmittance: 0.01,

            pointer_glow: PointerGlow::default(),
        }
    }
}

impl VolumeParams {
    pub fn box_min(&self) -> Vec3 {
        Vec3::from_array(self.box_min)
    }

    pub fn box_max(&self) -> Vec3 {
        Vec3::from_array(self.box_max)
    }

    pub fn box_center(&self) -> Vec3 {
        (self.box_min() + self.box_max()) * 0.5
    }

    pub fn box_half_extent(&self) -> Vec3 {
        (self.box_max() - self.box_min()) * 0.5
    }

    pub fn wind_direction(&self) -> Vec3 {
        Vec3::from_array(self.wind_direction)
    }

    pub fn light_direction(&self) -> Vec3 {
        Vec3::from_array(self.light_direction)
    }

    pub fn light_radiance(&self) -> Vec3 {
        Vec3::from_array(self.light_color) * self.light_intensity
    }

    /// Reject configurations the marcher cannot handle
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = (self.box_min(), self.box_max());
        if !min.cmplt(max).all() {
            return Err(ConfigError::DegenerateBox {
                min: self.box_min,
                max: self.box_max,
            });
        }
        if self.density_multiplier < 0.0 || !self.density_multiplier.is_finite() {
            return Err(ConfigError::NegativeDensity(self.density_multiplier));
        }
        if self.absorption < 0.0 || !self.absorption.is_finite() {
            return Err(ConfigError::NegativeAbsorption(self.absorption));
        }
        check_unit("wind_direction", self.wind_direction())?;
        check_unit("light_direction", self.light_direction())?;
        if !(self.phase_g > -1.0 && self.phase_g < 1.0) {
            return Err(ConfigError::PhaseOutOfRange(self.phase_g));
        }
        if !(self.noise_scale > 0.0 && self.noise_scale.is_finite()) {
            return Err(ConfigError::InvalidNoiseScale(self.noise_scale));
        }
        if self.step_count == 0 {
            return Err(ConfigError::ZeroSteps { name: "step_count" });
        }
        Ok(())
    }
}

fn check_unit(name: &'static str, v: Vec3) -> ConfigResult<()> {
    let length = v.length();
    if (length - 1.0).abs() > UNIT_TOLERANCE {
        return Err(ConfigError::NonUnitVector { name, length });
    }
    Ok(())
}
