//! Per-frame driver tying camera, mesh and volume together.

use std::fmt;
use std::str::FromStr;

use glam::{Vec2, Vec3};

use crate::camera::{CameraChoreographer, CameraTransform, Viewport};
use crate::error::ConfigResult;
use crate::mesh::MeshPulseField;
use crate::noise::NoiseField;
use crate::params::{RenderConfig, SceneConfig};
use crate::rendering::{BlendMode, DrawCall, FrameBuffer, MeshUniforms};
use crate::volume::VolumeRenderer;

/// Wireframe color of the opaque mesh in the reference renderer
const MESH_WIRE_COLOR: Vec3 = Vec3::new(0.05, 0.07, 0.12);

/// Coarse quality switch supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceTier {
    /// Opaque mesh only
    Low,
    Medium,
    #[default]
    High,
}

impl DeviceTier {
    /// Whether the volume and pulse passes run
    pub fn has_effects(self) -> bool {
        self != DeviceTier::Low
    }
}

impl FromStr for DeviceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(DeviceTier::Low),
            "medium" => Ok(DeviceTier::Medium),
            "high" => Ok(DeviceTier::High),
            other => Err(format!("unknown device tier '{}'", other)),
        }
    }
}

impl fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceTier::Low => "low",
            DeviceTier::Medium => "medium",
            DeviceTier::High => "high",
        };
        f.write_str(name)
    }
}

/// What the host supplies every frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Monotonic seconds
    pub time_s: f32,
    /// Scroll progress, clamped to [0, 1]
    pub scroll_progress: f32,
    /// Pointer in normalized device coordinates, clamped to [-1, 1]²
    pub pointer_ndc: Vec2,
    pub viewport: Viewport,
    pub tier: DeviceTier,
}

/// What the engine publishes every frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub camera: CameraTransform,
    pub pointer_world: Vec3,
    /// Passes in submission order: opaque mesh, volume, edge pulses
    pub draws: Vec<DrawCall>,
}

/// Owns the three simulations and advances them in a fixed order
pub struct Engine {
    render: RenderConfig,
    camera: CameraChoreographer,
    mesh: MeshPulseField,
    volume: VolumeRenderer,
    tier: Option<DeviceTier>,
    last_time_s: f32,
}

impl Engine {
    /// Validate the scene and build every component
    pub fn new(scene: SceneConfig) -> ConfigResult<Self> {
        if let Err(e) = scene.validate() {
            log::error!("rejecting scene configuration: {}", e);
            return Err(e);
        }

        let noise = NoiseField::new(scene.noise_seed);
        let camera = CameraChoreographer::new(scene.camera)?;
        let mesh = MeshPulseField::new(&scene.mesh, scene.springs, scene.pulse, noise.clone())?;
        let volume = VolumeRenderer::new(scene.volume, noise)?;
        log::info!("engine ready (noise seed {})", scene.noise_seed);

        Ok(Self {
            render: scene.render,
            camera,
            mesh,
            volume,
            tier: None,
            last_time_s: 0.0,
        })
    }

    /// Host signal that the page finished loading
    pub fn intro_complete(&mut self) {
        self.camera.intro_complete();
    }

    /// Advance one frame: camera, then pointer, then mesh, then volume
    pub fn advance(&mut self, input: &FrameInput) -> FrameOutput {
        if self.tier != Some(input.tier) {
            log::info!("device tier: {}", input.tier);
            self.tier = Some(input.tier);
        }

        let time_s = if input.time_s.is_finite() {
            input.time_s
        } else {
            log::debug!("non-finite frame time, reusing {:.3}s", self.last_time_s);
            self.last_time_s
        };
        self.last_time_s = time_s;

        let render = self.render_for(input.viewport);
        let camera = self
            .camera
            .advance(time_s, input.scroll_progress, input.viewport);

        let ndc = sanitize_ndc(input.pointer_ndc);
        let pointer_world = camera.unproject_pointer(ndc, &render);
        let pointer_ray = camera.ndc_ray(ndc, &render);
        self.mesh.advance(time_s, pointer_world, &pointer_ray);

        let view_proj = camera.view_proj(&render);
        let mut draws = vec![DrawCall::OpaqueMesh(MeshUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera.eye.to_array(),
            time: time_s,
        })];
        if input.tier.has_effects() {
            draws.push(DrawCall::Volume(self.volume.uniforms(
                &camera,
                &render,
                time_s,
                Some(pointer_world),
            )));
            draws.push(DrawCall::EdgePulses(self.mesh.uniforms(view_proj)));
        }

        FrameOutput {
            camera,
            pointer_world,
            draws,
        }
    }

    /// Projection settings sized to the host viewport
    pub fn render_for(&self, viewport: Viewport) -> RenderConfig {
        RenderConfig {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            ..self.render.clone()
        }
    }

    /// CPU reference rendering of a published frame
    ///
    /// Executes the draw list in order into `frame`, whose size acts as the viewport.
    pub fn render_reference(&self, output: &FrameOutput, time_s: f32, frame: &mut FrameBuffer) {
        let render = self.render_for(Viewport::new(frame.width, frame.height));
        let camera = &output.camera;

        for draw in &output.draws {
            match draw {
                DrawCall::OpaqueMesh(_) => {
                    for &(a, b) in &self.mesh.wire_edges {
                        let pa = Vec3::from_array(self.mesh.vertices[a as usize].position);
                        let pb = Vec3::from_array(self.mesh.vertices[b as usize].position);
                        if let (Some(sa), Some(sb)) =
                            (camera.project(pa, &render), camera.project(pb, &render))
                        {
                            frame.draw_line(
                                sa,
                                sb,
                                (MESH_WIRE_COLOR, MESH_WIRE_COLOR),
                                (1.0, 1.0),
                                draw.blend(),
                            );
                        }
                    }
                }
                DrawCall::Volume(_) => {
                    self.volume
                        .render_frame(frame, camera, time_s, Some(output.pointer_world), &render);
                }
                DrawCall::EdgePulses(_) => {
                    for pair in self.mesh.edges.indices.chunks_exact(2) {
                        let a = &self.mesh.edges.samples[pair[0] as usize];
                        let b = &self.mesh.edges.samples[pair[1] as usize];
                        let (Some(sa), Some(sb)) = (
                            camera.project(a.position, &render),
                            camera.project(b.position, &render),
                        ) else {
                            continue;
                        };
                        let (ca, cb) = (self.mesh.shade(a), self.mesh.shade(b));
                        frame.draw_line(
                            sa,
                            sb,
                            (ca.color, cb.color),
                            (ca.alpha, cb.alpha),
                            BlendMode::Additive,
                        );
                    }
                }
            }
        }
    }

    pub fn camera(&self) -> &CameraChoreographer {
        &self.camera
    }

    pub fn mesh(&self) -> &MeshPulseField {
        &self.mesh
    }

    pub fn volume(&self) -> &VolumeRenderer {
        &self.volume
    }
}

fn sanitize_ndc(ndc: Vec2) -> Vec2 {
    if ndc.is_finite() {
        ndc.clamp(Vec2::NEG_ONE, Vec2::ONE)
    } else {
        Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(time_s: f32, scroll_progress: f32, tier: DeviceTier) -> FrameInput {
        FrameInput {
            time_s,
            scroll_progress,
            pointer_ndc: Vec2::ZERO,
            viewport: Viewport::new(1280, 720),
            tier,
        }
    }

    #[test]
    fn test_draw_order() {
        let mut engine = Engine::new(SceneConfig::default()).expect("default scene is valid");
        let output = engine.advance(&input(0.0, 0.2, DeviceTier::High));
        let labels: Vec<&str> = output.draws.iter().map(|d| d.label()).collect();
        assert_eq!(labels, ["opaque mesh", "volume", "edge pulses"]);
        let blends: Vec<BlendMode> = output.draws.iter().map(|d| d.blend()).collect();
        assert_eq!(
            blends,
            [BlendMode::Opaque, BlendMode::Premultiplied, BlendMode::Additive]
        );
    }

    #[test]
    fn test_low_tier_only_draws_mesh() {
        let mut engine = Engine::new(SceneConfig::default()).expect("default scene is valid");
        let output = engine.advance(&input(0.0, 0.2, DeviceTier::Low));
        assert_eq!(output.draws.len(), 1);
        assert!(matches!(output.draws[0], DrawCall::OpaqueMesh(_)));
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("LOW".parse::<DeviceTier>(), Ok(DeviceTier::Low));
        assert_eq!("medium".parse::<DeviceTier>(), Ok(DeviceTier::Medium));
        assert!("ultra".parse::<DeviceTier>().is_err());
        assert_eq!(DeviceTier::High.to_string(), "high");
    }

    #[test]
    fn test_bad_pointer_is_sanitized() {
        let mut engine = Engine::new(SceneConfig::default()).expect("default scene is valid");
        let output = engine.advance(&FrameInput {
            pointer_ndc: Vec2::new(f32::NAN, 4.0),
            ..input(0.0, 0.5, DeviceTier::High)
        });
        assert!(output.pointer_world.is_finite());
        assert!(engine
            .mesh()
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_non_finite_time_is_sanitized() {
        let mut engine = Engine::new(SceneConfig::default()).expect("default scene is valid");
        engine.advance(&input(1.5, 0.3, DeviceTier::High));
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let output = engine.advance(&input(bad, 0.3, DeviceTier::High));
            assert!(output.camera.eye.is_finite());
            assert!(output.pointer_world.is_finite());
            match output.draws[0] {
                DrawCall::OpaqueMesh(uniforms) => assert_eq!(uniforms.time, 1.5),
                _ => panic!("opaque mesh must come first"),
            }
        }
        assert!(engine
            .mesh()
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_zero_viewport_is_finite() {
        let mut engine = Engine::new(SceneConfig::default()).expect("default scene is valid");
        let output = engine.advance(&FrameInput {
            viewport: Viewport::new(0, 0),
            ..input(0.0, 0.5, DeviceTier::High)
        });
        assert!(output.camera.eye.is_finite());
    }
}
