//! Host-facing buffer layouts, draw list and the CPU reference frame buffer.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex of the displaced opaque mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex of the subdivided edge geometry for the pulse pass
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EdgeVertex {
    pub position: [f32; 3],
    pub edge_progress: f32,
    pub edge_index: f32,
    pub edge_length: f32,
}

/// Uniform buffer for the volume pass
///
/// Every vec3 is packed with a trailing scalar so the block matches WGSL
/// uniform alignment without explicit padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct VolumeUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
    pub box_min: [f32; 3],
    pub density_multiplier: f32,
    pub box_max: [f32; 3],
    pub absorption: f32,
    pub wind_direction: [f32; 3],
    pub wind_speed: f32,
    pub light_direction: [f32; 3],
    pub phase_g: f32,
    pub light_radiance: [f32; 3],
    pub noise_scale: f32,
    pub pointer: [f32; 3],
    pub pointer_strength: f32,
    pub ambient_low: [f32; 3],
    pub density_threshold: f32,
    pub ambient_high: [f32; 3],
    pub threshold_softness: f32,
    pub step_count: u32,
    pub shadow_steps: u32,
    pub early_exit_transmittance: f32,
    pub pointer_radius: f32,
}

/// Uniform buffer for the edge pulse pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PulseUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub pointer: [f32; 3],
    pub hover: f32,
    pub idle_color: [f32; 3],
    pub time: f32,
    pub pulse_color: [f32; 3],
    pub proximity_falloff: f32,
    pub spark_color: [f32; 3],
    pub proximity_gain: f32,
    /// pulse low/high, spark low/high
    pub thresholds: [f32; 4],
    /// base alpha, idle gain, hover gain, endpoint fade
    pub alpha: [f32; 4],
    /// frequency, speed, amplitude, floor per wave
    pub waves: [[f32; 4]; 3],
    /// phase scale per wave, wave count in `w`
    pub phase_scales: [f32; 4],
}

/// Uniform buffer for the opaque mesh pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
}

/// How the host blends a pass into its frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// `dst = src.rgb + dst.rgb * (1 - src.a)`
    Premultiplied,
    Additive,
}

/// One pass of the frame, in submission order
#[derive(Debug, Clone, Copy)]
pub enum DrawCall {
    OpaqueMesh(MeshUniforms),
    Volume(VolumeUniforms),
    EdgePulses(PulseUniforms),
}

impl DrawCall {
    pub fn blend(&self) -> BlendMode {
        match self {
            DrawCall::OpaqueMesh(_) => BlendMode::Opaque,
            DrawCall::Volume(_) => BlendMode::Premultiplied,
            DrawCall::EdgePulses(_) => BlendMode::Additive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DrawCall::OpaqueMesh(_) => "opaque mesh",
            DrawCall::Volume(_) => "volume",
            DrawCall::EdgePulses(_) => "edge pulses",
        }
    }
}

/// Linear RGB frame used by the CPU reference renderer
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, clear: Vec3) -> Self {
        Self {
            width,
            height,
            pixels: vec![clear; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec3> {
        self.index(x as i64, y as i64).map(|i| self.pixels[i])
    }

    /// Blend one pixel with the given mode; out-of-bounds writes are dropped
    pub fn blend(&mut self, x: i64, y: i64, color: Vec3, alpha: f32, mode: BlendMode) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let dst = &mut self.pixels[i];
        *dst = match mode {
            BlendMode::Opaque => color,
            BlendMode::Premultiplied => color + *dst * (1.0 - alpha),
            BlendMode::Additive => *dst + color * alpha,
        };
    }

    /// Rasterize a 1-pixel line with colors and alphas interpolated end to end
    pub fn draw_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        colors: (Vec3, Vec3),
        alphas: (f32, f32),
        mode: BlendMode,
    ) {
        let span = (to - from).abs().max_element();
        // Near-plane projections can land far off screen
        let limit = 4.0 * (self.width + self.height) as f32;
        if !span.is_finite() || span > limit {
            return;
        }
        let steps = span.ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = from.lerp(to, t);
            let color = colors.0.lerp(colors.1, t);
            let alpha = alphas.0 + (alphas.1 - alphas.0) * t;
            self.blend(p.x.floor() as i64, p.y.floor() as i64, color, alpha, mode);
        }
    }

    /// Gamma-encode to 8-bit RGBA
    pub fn to_rgba8(&self) -> Vec<u8> {
        let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0 + 0.5) as u8;
        self.pixels
            .iter()
            .flat_map(|p| [encode(p.x), encode(p.y), encode(p.z), 255])
            .collect()
    }

    /// Save as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        image::save_buffer(
            path,
            &self.to_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
    }
}
