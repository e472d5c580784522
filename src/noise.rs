//! Gradient noise shared by the smoke density function and the mesh field.
//!
//! Wraps seeded Perlin noise from the `noise` crate. Sampling happens in f64 so
//! coordinates far from the origin do not lose lattice precision.

use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// Octave count the volume density function samples with.
pub const VOLUME_OCTAVES: u32 = 4;

/// Upper bound on octaves for lighter per-vertex use.
pub const VERTEX_OCTAVES: u32 = 2;

/// Largest coordinate magnitude handed to the lattice; Perlin floors to i64
const MAX_COORDINATE: f32 = 1.0e15;

/// Deterministic 3D gradient noise field
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
}

impl NoiseField {
    /// Create new noise field with seed
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample 3D gradient noise at position
    ///
    /// Returns value in range [-1, 1], and 0 for non-finite or out-of-range input
    pub fn noise3(&self, p: Vec3) -> f32 {
        if !p.is_finite() || p.abs().max_element() > MAX_COORDINATE {
            return 0.0;
        }
        let value = self.perlin.get([p.x as f64, p.y as f64, p.z as f64]);
        value.clamp(-1.0, 1.0) as f32
    }

    /// Fractal Brownian motion: `octaves` layers at doubling frequency and
    /// halving amplitude, normalized back into [-1, 1].
    pub fn fbm(&self, p: Vec3, octaves: u32) -> f32 {
        self.fbm_advected(p, octaves, Vec3::ZERO, &[])
    }

    /// FBM where octave `i` is shifted by `offset * rates[i]`.
    ///
    /// Octaves past the end of `rates` reuse its last entry; an empty slice
    /// means every octave moves with the full offset.
    pub fn fbm_advected(&self, p: Vec3, octaves: u32, offset: Vec3, rates: &[f32]) -> f32 {
        let mut sum = 0.0;
        let mut norm = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for octave in 0..octaves.max(1) as usize {
            let rate = rates
                .get(octave)
                .or_else(|| rates.last())
                .copied()
                .unwrap_or(1.0);
            sum += amplitude * self.noise3(p * frequency + offset * rate);
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        sum / norm
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(42)
    }
}
