//! Raymarched smoke volume inside an axis-aligned box.

mod density;
mod march;

pub use density::{density_at, flow_bands, pulsation, shape_falloff, wind_offset};
pub use march::{henyey_greenstein, intersect_box, march_ray, shadow_factor, MarchSample, MIN_STEP_M};

use glam::{Mat4, Vec3, Vec4};
use rayon::prelude::*;

use crate::camera::CameraTransform;
use crate::error::ConfigResult;
use crate::math::{hash12, Ray};
use crate::noise::NoiseField;
use crate::params::{RenderConfig, VolumeParams};
use crate::rendering::{FrameBuffer, VolumeUniforms};

/// Volume pass: validated parameters plus the shared noise field
pub struct VolumeRenderer {
    params: VolumeParams,
    noise: NoiseField,
}

impl VolumeRenderer {
    pub fn new(params: VolumeParams, noise: NoiseField) -> ConfigResult<Self> {
        if let Err(e) = params.validate() {
            log::error!("rejecting volume parameters: {}", e);
            return Err(e);
        }
        log::debug!(
            "volume: box {:?}..{:?}, {} steps, absorption {}",
            params.box_min,
            params.box_max,
            params.step_count,
            params.absorption
        );
        Ok(Self { params, noise })
    }

    pub fn params(&self) -> &VolumeParams {
        &self.params
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// First-sample jitter for a pixel, decorrelated across frames
    #[inline]
    pub fn jitter(px: u32, py: u32, time_s: f32) -> f32 {
        let t = time_s.fract() * 61.0;
        hash12(px as f32 + t, py as f32 - t)
    }

    /// March the camera ray through pixel (`px`, `py`)
    pub fn shade_pixel(
        &self,
        camera: &CameraTransform,
        render: &RenderConfig,
        px: u32,
        py: u32,
        time_s: f32,
        pointer: Option<Vec3>,
    ) -> MarchSample {
        let ray = camera.pixel_ray(px, py, render);
        march_ray(
            &self.params,
            &self.noise,
            &ray,
            Self::jitter(px, py, time_s),
            time_s,
            pointer,
        )
    }

    /// CPU reference render, composited over whatever `frame` holds
    pub fn render_frame(
        &self,
        frame: &mut FrameBuffer,
        camera: &CameraTransform,
        time_s: f32,
        pointer: Option<Vec3>,
        render: &RenderConfig,
    ) {
        let render = RenderConfig {
            width: frame.width,
            height: frame.height,
            ..render.clone()
        };
        let width = frame.width.max(1) as usize;
        let inv_view_proj = camera.view_proj(&render).inverse();

        frame
            .pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, dst) in row.iter_mut().enumerate() {
                    let ray = pixel_ray_with(inv_view_proj, camera.eye, px as u32, py as u32, &render);
                    let jitter = Self::jitter(px as u32, py as u32, time_s);
                    let sample =
                        march_ray(&self.params, &self.noise, &ray, jitter, time_s, pointer);
                    if sample.alpha > 0.0 {
                        *dst = sample.color + *dst * sample.transmittance;
                    }
                }
            });
    }

    /// Uniform block for a GPU volume pass
    pub fn uniforms(
        &self,
        camera: &CameraTransform,
        render: &RenderConfig,
        time_s: f32,
        pointer: Option<Vec3>,
    ) -> VolumeUniforms {
        let p = &self.params;
        let inv_view_proj: Mat4 = camera.view_proj(render).inverse();
        let (pointer, pointer_strength) = match pointer {
            Some(m) => (m, p.pointer_glow.strength),
            None => (Vec3::ZERO, 0.0),
        };

        VolumeUniforms {
            inv_view_proj: inv_view_proj.to_cols_array_2d(),
            camera_pos: camera.eye.to_array(),
            time: time_s,
            box_min: p.box_min,
            density_multiplier: p.density_multiplier,
            box_max: p.box_max,
            absorption: p.absorption,
            wind_direction: p.wind_direction().to_array(),
            wind_speed: p.wind_speed,
            light_direction: p.light_direction().to_array(),
            phase_g: p.phase_g,
            light_radiance: p.light_radiance().to_array(),
            noise_scale: p.noise_scale,
            pointer: pointer.to_array(),
            pointer_strength,
            ambient_low: p.ambient_low,
            density_threshold: p.density_threshold,
            ambient_high: p.ambient_high,
            threshold_softness: p.threshold_softness,
            step_count: p.step_count,
            shadow_steps: p.shadow_steps,
            early_exit_transmittance: p.early_exit_transmittance,
            pointer_radius: p.pointer_glow.radius_m,
        }
    }
}

/// Same as `CameraTransform::pixel_ray` with the inverse matrix hoisted out of the loop
fn pixel_ray_with(
    inv_view_proj: Mat4,
    eye: Vec3,
    px: u32,
    py: u32,
    render: &RenderConfig,
) -> Ray {
    let ndc_x = 2.0 * (px as f32 + 0.5) / render.width.max(1) as f32 - 1.0;
    let ndc_y = 1.0 - 2.0 * (py as f32 + 0.5) / render.height.max(1) as f32;
    let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    Ray::new(eye, far.truncate() / far.w - eye)
}
