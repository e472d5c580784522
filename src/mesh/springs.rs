//! Spring-damped vertex displacement.

use glam::Vec3;

use crate::noise::{NoiseField, VERTEX_OCTAVES};
use crate::params::SpringParams;

/// Distances below this count as "pointer on the vertex"
const MIN_ATTRACT_DISTANCE: f32 = 1e-6;

/// Per-vertex spring state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSpring {
    /// Rest position captured at mesh creation
    pub original: Vec3,
    pub current: Vec3,
    pub velocity: Vec3,
}

impl VertexSpring {
    pub fn new(original: Vec3) -> Self {
        Self {
            original,
            current: original,
            velocity: Vec3::ZERO,
        }
    }

    /// One integrator step toward `target`
    ///
    /// `impulse` is added to the velocity before damping.
    #[inline]
    pub fn step(&mut self, target: Vec3, stiffness: f32, damping: f32, impulse: Vec3) {
        let force = -stiffness * (self.current - target);
        self.velocity = (self.velocity + force + impulse) * damping;
        self.current += self.velocity;
    }

    /// Distance from rest
    pub fn displacement(&self) -> f32 {
        self.current.distance(self.original)
    }
}

/// Rest position pulled toward the pointer with quadratic falloff
///
/// Returns `original` outside `radius`, when `strength` is 0, or when the
/// pointer sits exactly on the vertex.
pub fn attraction_target(original: Vec3, pointer: Vec3, radius: f32, strength: f32) -> Vec3 {
    let to_pointer = pointer - original;
    let dist = to_pointer.length();
    if strength <= 0.0 || !(dist < radius) || dist < MIN_ATTRACT_DISTANCE {
        return original;
    }
    let falloff = (1.0 - dist / radius).powi(2);
    original + (to_pointer / dist) * (falloff * strength)
}

/// Low-octave noise velocity that keeps idle vertices moving
pub fn drift_velocity(noise: &NoiseField, params: &SpringParams, p: Vec3, time_s: f32) -> Vec3 {
    if params.drift_strength_m <= 0.0 {
        return Vec3::ZERO;
    }
    let q = p * params.drift_frequency + Vec3::splat(time_s * params.drift_speed);
    Vec3::new(
        noise.fbm(q, VERTEX_OCTAVES),
        noise.fbm(q + Vec3::new(31.7, 0.0, 0.0), VERTEX_OCTAVES),
        noise.fbm(q + Vec3::new(0.0, 0.0, 57.3), VERTEX_OCTAVES),
    ) * params.drift_strength_m
}
