//! Per-pixel raymarch through the smoke box.

use std::f32::consts::PI;

use glam::Vec3;

use super::density::density_at;
use crate::math::{mix_vec3, Ray};
use crate::noise::NoiseField;
use crate::params::VolumeParams;

/// Smallest step the marcher takes (meters); covers grazing rays
pub const MIN_STEP_M: f32 = 1e-3;

/// Extinction below this scatters nothing
const MIN_EXTINCTION: f32 = 1e-6;

/// Reciprocal used for axis-parallel ray components
const PARALLEL_INV: f32 = 1e8;

/// Result of marching one ray
///
/// `color` is premultiplied: composite as `color + background * transmittance`.
#[derive(Debug, Clone, Copy)]
pub struct MarchSample {
    pub color: Vec3,
    pub alpha: f32,
    pub transmittance: f32,
    pub steps_taken: u32,
}

impl MarchSample {
    pub const EMPTY: Self = Self {
        color: Vec3::ZERO,
        alpha: 0.0,
        transmittance: 1.0,
        steps_taken: 0,
    };
}

#[inline]
fn safe_recip(d: f32) -> f32 {
    if d.abs() < 1.0 / PARALLEL_INV {
        PARALLEL_INV.copysign(d)
    } else {
        1.0 / d
    }
}

/// Slab test against an axis-aligned box
///
/// Returns `(t_enter, t_exit)` with `t_enter` clamped to 0 when the origin is
/// inside, or `None` when the ray misses or the box is behind the origin.
pub fn intersect_box(ray: &Ray, box_min: Vec3, box_max: Vec3) -> Option<(f32, f32)> {
    let inv = Vec3::new(
        safe_recip(ray.direction.x),
        safe_recip(ray.direction.y),
        safe_recip(ray.direction.z),
    );
    let t0 = (box_min - ray.origin) * inv;
    let t1 = (box_max - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();

    if t_far < t_near || t_far < 0.0 {
        return None;
    }
    Some((t_near.max(0.0), t_far))
}

/// Henyey-Greenstein phase function
///
/// `cos_theta` is the cosine between the view ray and the direction toward the light.
#[inline]
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom * denom.sqrt())
}

/// Fraction of light reaching `p` after a short march toward the light
pub fn shadow_factor(params: &VolumeParams, noise: &NoiseField, p: Vec3, time_s: f32) -> f32 {
    let to_light = params.light_direction();
    let mut accumulated = 0.0;
    for j in 1..=params.shadow_steps {
        let q = p + to_light * (params.shadow_step_m * j as f32);
        accumulated += density_at(params, noise, q, time_s) * params.shadow_step_m;
    }
    (-accumulated * params.absorption * params.shadow_boost).exp()
}

#[inline]
fn pointer_glow(params: &VolumeParams, p: Vec3, pointer: Option<Vec3>) -> f32 {
    let glow = &params.pointer_glow;
    match pointer {
        Some(m) if glow.strength > 0.0 => {
            let r2 = (glow.radius_m * glow.radius_m).max(1e-6);
            1.0 + glow.strength * (-(p - m).length_squared() / r2).exp()
        }
        _ => 1.0,
    }
}

/// March a single ray through the volume
///
/// `jitter` in [0, 1) offsets the first sample by a fraction of one step.
pub fn march_ray(
    params: &VolumeParams,
    noise: &NoiseField,
    ray: &Ray,
    jitter: f32,
    time_s: f32,
    pointer: Option<Vec3>,
) -> MarchSample {
    let (box_min, box_max) = (params.box_min(), params.box_max());
    let Some((t_enter, t_exit)) = intersect_box(ray, box_min, box_max) else {
        return MarchSample::EMPTY;
    };

    let steps = params.step_count.max(1);
    let step = ((t_exit - t_enter) / steps as f32).max(MIN_STEP_M);
    let radiance = params.light_radiance();
    let phase = henyey_greenstein(ray.direction.dot(params.light_direction()), params.phase_g);

    let mut transmittance = 1.0_f32;
    let mut scattered = Vec3::ZERO;
    let mut steps_taken = 0;

    for i in 0..steps {
        steps_taken = i + 1;
        let p = ray.at(t_enter + (i as f32 + jitter) * step);
        let density = density_at(params, noise, p, time_s);
        if density < params.min_density {
            continue;
        }

        let extinction = density * params.absorption;
        if extinction < MIN_EXTINCTION {
            continue;
        }
        let step_transmittance = (-extinction * step).exp();

        // Scattering equals extinction (albedo 1)
        let shadow = shadow_factor(params, noise, p, time_s);
        let luminance = radiance * (phase * shadow * pointer_glow(params, p, pointer) * extinction);
        let integrated = (luminance - luminance * step_transmittance) / extinction;

        scattered += integrated * transmittance;
        transmittance *= step_transmittance;

        if transmittance < params.early_exit_transmittance {
            transmittance = 0.0;
            break;
        }
    }

    let opacity = 1.0 - transmittance;
    let mid = ray.at((t_enter + t_exit) * 0.5);
    let h = ((mid.y - box_min.y) / (box_max.y - box_min.y)).clamp(0.0, 1.0);
    let ambient = mix_vec3(
        Vec3::from_array(params.ambient_low),
        Vec3::from_array(params.ambient_high),
        h,
    ) * params.ambient_strength;

    MarchSample {
        color: scattered + ambient * opacity,
        alpha: opacity,
        transmittance,
        steps_taken,
    }
}
