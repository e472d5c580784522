//! Smoke density field: advected FBM shaped by flow bands and box falloffs.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::math::{mix, smoothstep};
use crate::noise::{NoiseField, VOLUME_OCTAVES};
use crate::params::VolumeParams;

/// Noise-space offset the wind has carried the field by at `time_s`
#[inline]
pub fn wind_offset(params: &VolumeParams, time_s: f32) -> Vec3 {
    params.wind_direction() * (time_s * params.wind_speed)
}

/// Product of the traveling sine bands at `p`
pub fn flow_bands(params: &VolumeParams, p: Vec3, time_s: f32) -> f32 {
    params.waves.iter().fold(1.0, |acc, band| {
        let phase = p.dot(Vec3::from_array(band.axis)) * band.frequency - time_s * band.speed;
        acc * mix(band.floor, 1.0, 0.5 + 0.5 * phase.sin())
    })
}

/// Slow breathing of the whole volume, 1 at t = 0
#[inline]
pub fn pulsation(params: &VolumeParams, time_s: f32) -> f32 {
    let wave = 0.5 - 0.5 * (TAU * params.pulsation_hz * time_s).cos();
    1.0 - params.pulsation_depth.clamp(0.0, 1.0) * wave
}

/// Edge, height and radial falloffs multiplied together
///
/// Zero on and outside the box faces, 1 well inside the core.
pub fn shape_falloff(params: &VolumeParams, p: Vec3) -> f32 {
    let min = params.box_min();
    let max = params.box_max();
    let local = (p - params.box_center()) / params.box_half_extent();

    let edge_distance = 1.0 - local.abs().max_element();
    let edge = smoothstep(0.0, params.edge_falloff, edge_distance);
    if edge <= 0.0 {
        return 0.0;
    }

    let h = (p.y - min.y) / (max.y - min.y);
    let height = smoothstep(0.0, params.height_fade_bottom, h)
        * (1.0 - smoothstep(1.0 - params.height_fade_top, 1.0, h));

    let r = Vec3::new(local.x, 0.0, local.z).length();
    let radial = 1.0 - smoothstep(params.radial_fade_start, params.radial_fade_end, r);

    edge * height * radial
}

/// Smoke density at world position `p`, in `[0, density_multiplier]`
pub fn density_at(params: &VolumeParams, noise: &NoiseField, p: Vec3, time_s: f32) -> f32 {
    let falloff = shape_falloff(params, p);
    if falloff <= 0.0 {
        return 0.0;
    }

    let n = noise.fbm_advected(
        p * params.noise_scale,
        VOLUME_OCTAVES,
        wind_offset(params, time_s),
        &params.octave_advection,
    );
    let n01 = n * 0.5 + 0.5;
    let base = smoothstep(
        params.density_threshold,
        params.density_threshold + params.threshold_softness,
        n01,
    );
    if base <= 0.0 {
        return 0.0;
    }

    let shaped = base * flow_bands(params, p, time_s) * pulsation(params, time_s) * falloff;
    (shaped * params.density_multiplier).clamp(0.0, params.density_multiplier)
}
