//! Wireframe mesh, spring and edge-pulse parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Base solid the mesh is subdivided from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshShape {
    #[default]
    Icosahedron,
    Octahedron,
}

/// Source polyhedron and edge sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    pub shape: MeshShape,

    /// Circumscribed radius of the polyhedron (meters)
    pub radius_m: f32,

    /// Subdivision level; each level splits every face into four
    pub detail: u32,

    /// Points sampled along each unique edge (>= 2)
    pub edge_subdivisions: u32,

    /// Vertical offset of the mesh center (meters)
    pub center_y_m: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            shape: MeshShape::Icosahedron,
            radius_m: 1.6,
            detail: 1,
            edge_subdivisions: 24,
            center_y_m: 1.0,
        }
    }
}

impl MeshParams {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.radius_m > 0.0) {
            return Err(ConfigError::InvalidMesh(format!(
                "radius must be > 0, got {}",
                self.radius_m
            )));
        }
        if self.edge_subdivisions < 2 {
            return Err(ConfigError::InvalidMesh(format!(
                "edge_subdivisions must be >= 2, got {}",
                self.edge_subdivisions
            )));
        }
        // Face count grows 4x per level
        if self.detail > 5 {
            return Err(ConfigError::InvalidMesh(format!(
                "detail {} is too fine for per-frame springs",
                self.detail
            )));
        }
        Ok(())
    }
}

/// Damped spring constants and pointer attraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    /// Spring stiffness per frame (dimensionless)
    /// Reference value: 0.12
    pub stiffness: f32,

    /// Velocity retention per frame (0..1)
    /// Reference value: 0.82
    pub damping: f32,

    /// Pointer influence radius (meters)
    pub attract_radius_m: f32,

    /// Maximum displacement toward the pointer (meters)
    pub attract_strength_m: f32,

    /// Noise velocity injected per frame so idle vertices keep drifting (meters)
    pub drift_strength_m: f32,

    /// Spatial frequency of the drift field (cycles per meter)
    pub drift_frequency: f32,

    /// Drift field evolution rate (noise units per second)
    pub drift_speed: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 0.12,
            damping: 0.82,
            attract_radius_m: 1.4,
            attract_strength_m: 0.35,
            drift_strength_m: 0.0015,
            drift_frequency: 0.9,
            drift_speed: 0.25,
        }
    }
}

impl SpringParams {
    /// Spectral radius of the per-frame update on (offset, velocity).
    ///
    /// The update is `v' = d(v - k x)`, `x' = x + v'`, i.e. the matrix
    /// `[[1 - dk, d], [-dk, d]]` with trace `1 + d - dk` and determinant `d`.
    pub fn spectral_radius(&self) -> f32 {
        let (k, d) = (self.stiffness, self.damping);
        let trace = 1.0 + d - d * k;
        let det = d;
        let disc = trace * trace - 4.0 * det;
        if disc < 0.0 {
            det.sqrt()
        } else {
            let root = disc.sqrt();
            ((trace + root) * 0.5).abs().max(((trace - root) * 0.5).abs())
        }
    }

    /// True when the spring overshoots before settling
    pub fn is_underdamped(&self) -> bool {
        let (k, d) = (self.stiffness, self.damping);
        let trace = 1.0 + d - d * k;
        trace * trace < 4.0 * d
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let unstable = ConfigError::UnstableSpring {
            k: self.stiffness,
            damping: self.damping,
        };
        if !(self.stiffness > 0.0) || !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(unstable);
        }
        if self.spectral_radius() >= 1.0 {
            return Err(unstable);
        }
        if !(self.attract_radius_m > 0.0) || self.attract_strength_m < 0.0 {
            return Err(ConfigError::InvalidMesh(format!(
                "attraction radius {} / strength {} out of range",
                self.attract_radius_m, self.attract_strength_m
            )));
        }
        if self.drift_strength_m < 0.0 || self.drift_frequency < 0.0 {
            return Err(ConfigError::InvalidMesh(format!(
                "drift strength {} / frequency {} must be >= 0",
                self.drift_strength_m, self.drift_frequency
            )));
        }
        Ok(())
    }
}

/// One traveling crest along an edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PulseWave {
    /// Cycles per edge length
    pub frequency: f32,

    /// Travel speed (radians per second)
    pub speed: f32,

    /// Peak contribution
    pub amplitude: f32,

    /// Sine level below which the wave is invisible (smoothstep lower edge)
    pub floor: f32,

    /// Multiplier on the per-edge phase offset
    pub phase_scale: f32,
}

/// Edge pulse shading parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Crest layers, slow/wide first
    pub waves: Vec<PulseWave>,

    /// Pointer proximity falloff (1/meters)
    pub proximity_falloff: f32,

    /// Pointer proximity gain
    pub proximity_gain: f32,

    /// Resting color (linear RGB)
    pub idle_color: [f32; 3],

    /// Color at medium pulse
    pub pulse_color: [f32; 3],

    /// Color at the brightest crests
    pub spark_color: [f32; 3],

    /// Pulse values where idle blends to pulse color
    pub pulse_threshold: [f32; 2],

    /// Pulse values where pulse blends to spark color
    pub spark_threshold: [f32; 2],

    /// Alpha floor so idle edges stay faintly visible
    pub base_alpha: f32,

    /// Alpha gain when not hovered
    pub idle_alpha_gain: f32,

    /// Alpha gain when hovered
    pub hover_alpha_gain: f32,

    /// Fraction of the edge faded at each endpoint
    pub endpoint_fade: f32,

    /// Hover ease-in time constant (seconds)
    pub hover_rise_tau_s: f32,

    /// Hover ease-out time constant (seconds)
    pub hover_fall_tau_s: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            waves: vec![
                PulseWave {
                    frequency: 1.0,
                    speed: 1.6,
                    amplitude: 1.0,
                    floor: 0.55,
                    phase_scale: 1.0,
                },
                PulseWave {
                    frequency: 2.3,
                    speed: 2.9,
                    amplitude: 0.6,
                    floor: 0.75,
                    phase_scale: 1.73,
                },
                PulseWave {
                    frequency: 4.1,
                    speed: 4.7,
                    amplitude: 0.35,
                    floor: 0.9,
                    phase_scale: 2.39,
                },
            ],
            proximity_falloff: 2.5,
            proximity_gain: 1.2,
            idle_color: [0.22, 0.42, 0.95],
            pulse_color: [1.0, 0.55, 0.18],
            spark_color: [1.0, 0.96, 0.88],
            pulse_threshold: [0.15, 0.75],
            spark_threshold: [0.95, 1.5],
            base_alpha: 0.08,
            idle_alpha_gain: 0.45,
            hover_alpha_gain: 1.0,
            endpoint_fade: 0.08,
            hover_rise_tau_s: 0.12,
            hover_fall_tau_s: 0.45,
        }
    }
}

impl PulseParams {
    /// GPU uniform blocks carry at most this many crest layers
    pub const MAX_WAVES: usize = 3;

    pub fn validate(&self) -> ConfigResult<()> {
        if self.waves.len() > Self::MAX_WAVES {
            return Err(ConfigError::InvalidMesh(format!(
                "at most {} pulse waves, got {}",
                Self::MAX_WAVES,
                self.waves.len()
            )));
        }
        if let Some(wave) = self.waves.iter().find(|w| !(w.floor < 1.0)) {
            return Err(ConfigError::InvalidMesh(format!(
                "pulse wave floor {} hides the whole wave",
                wave.floor
            )));
        }
        if !(0.0..=0.5).contains(&self.endpoint_fade) {
            return Err(ConfigError::InvalidMesh(format!(
                "endpoint_fade {} outside [0, 0.5]",
                self.endpoint_fade
            )));
        }
        if self.pulse_threshold[0] > self.pulse_threshold[1]
            || self.spark_threshold[0] > self.spark_threshold[1]
        {
            return Err(ConfigError::InvalidMesh(
                "pulse thresholds must be ordered low to high".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_spring_is_stable_and_underdamped() {
        let springs = SpringParams::default();
        assert!(springs.validate().is_ok());
        assert!(springs.is_underdamped());
        assert!(springs.spectral_radius() < 0.95);
    }

    #[test]
    fn test_divergent_spring_rejected() {
        // k beyond 2(1 + d)/d makes one eigenvalue leave the unit circle
        let springs = SpringParams {
            stiffness: 4.5,
            damping: 0.82,
            ..Default::default()
        };
        assert!(springs.spectral_radius() >= 1.0);
        assert!(matches!(
            springs.validate(),
            Err(ConfigError::UnstableSpring { .. })
        ));
    }

    #[test]
    fn test_undamped_spring_rejected() {
        let springs = SpringParams {
            damping: 1.0,
            ..Default::default()
        };
        assert!(springs.validate().is_err());
    }

    #[test]
    fn test_pulse_params_validated() {
        assert!(PulseParams::default().validate().is_ok());
        let mut params = PulseParams::default();
        params.waves.push(params.waves[0]);
        assert!(params.validate().is_err());
        let params = PulseParams {
            endpoint_fade: 0.8,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_mesh_subdivisions_validated() {
        let mesh = MeshParams {
            edge_subdivisions: 1,
            ..Default::default()
        };
        assert!(mesh.validate().is_err());
        assert!(MeshParams::default().validate().is_ok());
    }
}
