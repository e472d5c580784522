//! Spring-animated wireframe mesh with traveling edge pulses.

mod edges;
mod polyhedron;
mod pulse;
mod springs;

pub use edges::{build_edge_buffers, extract_edges, sample_edges, EdgeBuffers, EdgeSample};
pub use polyhedron::Polyhedron;
pub use pulse::{crest_sum, edge_pulse, PulseInput, PulseShade};
pub use springs::{attraction_target, drift_velocity, VertexSpring};

use glam::{Mat4, Vec3};

use crate::error::ConfigResult;
use crate::math::{ray_sphere, Ray};
use crate::noise::NoiseField;
use crate::params::{MeshParams, MeshShape, PulseParams, SpringParams};
use crate::rendering::{MeshVertex, PulseUniforms};

/// Longest frame step the hover easing integrates (seconds)
const MAX_HOVER_DT_S: f32 = 0.1;

/// Pick sphere slack around the mesh's bounding radius
const HOVER_PICK_SCALE: f32 = 1.05;

/// Owns the vertex springs and the static pulse geometry
pub struct MeshPulseField {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Unique triangle edges for wireframe drawing
    pub wire_edges: Vec<(u32, u32)>,
    pub edges: EdgeBuffers,
    springs: Vec<VertexSpring>,
    spring_params: SpringParams,
    pulse_params: PulseParams,
    noise: NoiseField,
    center: Vec3,
    bound_radius: f32,
    hovered: bool,
    hover: f32,
    pointer: Vec3,
    last_time_s: Option<f32>,
    time_s: f32,
}

impl MeshPulseField {
    /// Build the mesh, springs at rest
    pub fn new(
        mesh: &MeshParams,
        spring_params: SpringParams,
        pulse_params: PulseParams,
        noise: NoiseField,
    ) -> ConfigResult<Self> {
        mesh.validate()?;
        spring_params.validate()?;
        pulse_params.validate()?;

        let base = match mesh.shape {
            MeshShape::Icosahedron => Polyhedron::icosahedron(mesh.radius_m),
            MeshShape::Octahedron => Polyhedron::octahedron(mesh.radius_m),
        };
        let poly = base.subdivided(mesh.detail);
        let center = Vec3::new(0.0, mesh.center_y_m, 0.0);
        let edges = build_edge_buffers(&poly, center, mesh.edge_subdivisions);
        let springs: Vec<VertexSpring> = poly
            .vertices
            .iter()
            .map(|&v| VertexSpring::new(v + center))
            .collect();

        log::debug!(
            "mesh: {:?}, {} vertices, {} faces, {} edges x {} samples",
            mesh.shape,
            springs.len(),
            poly.faces.len(),
            edges.edge_count,
            mesh.edge_subdivisions
        );

        let mut field = Self {
            vertices: Vec::with_capacity(springs.len()),
            indices: poly.triangle_indices(),
            wire_edges: extract_edges(&poly.faces),
            edges,
            springs,
            spring_params,
            pulse_params,
            noise,
            center,
            bound_radius: poly.radius(),
            hovered: false,
            hover: 0.0,
            pointer: center,
            last_time_s: None,
            time_s: 0.0,
        };
        field.write_vertices();
        Ok(field)
    }

    /// Step springs and hover easing for one frame
    ///
    /// # Arguments
    /// * `time_s` - Current time in seconds
    /// * `pointer` - Pointer position unprojected into the world
    /// * `pointer_ray` - Camera ray through the pointer, used for hover picking
    pub fn advance(&mut self, time_s: f32, pointer: Vec3, pointer_ray: &Ray) {
        let dt = self
            .last_time_s
            .map_or(0.0, |last| (time_s - last).clamp(0.0, MAX_HOVER_DT_S));
        self.last_time_s = Some(time_s);
        self.time_s = time_s;
        self.pointer = pointer;

        let hovered =
            ray_sphere(pointer_ray, self.center, self.bound_radius * HOVER_PICK_SCALE).is_some();
        if hovered != self.hovered {
            log::debug!("mesh hover {}", if hovered { "entered" } else { "left" });
            self.hovered = hovered;
        }
        self.ease_hover(dt);

        let params = &self.spring_params;
        let strength = if self.hovered {
            params.attract_strength_m
        } else {
            0.0
        };
        for spring in &mut self.springs {
            let target =
                attraction_target(spring.original, pointer, params.attract_radius_m, strength);
            let drift = drift_velocity(&self.noise, params, spring.original, time_s);
            spring.step(target, params.stiffness, params.damping, drift);
        }

        self.write_vertices();
    }

    fn ease_hover(&mut self, dt: f32) {
        let (goal, tau) = if self.hovered {
            (1.0, self.pulse_params.hover_rise_tau_s)
        } else {
            (0.0, self.pulse_params.hover_fall_tau_s)
        };
        let blend = if tau > 0.0 { 1.0 - (-dt / tau).exp() } else { 1.0 };
        self.hover += (goal - self.hover) * blend;
    }

    fn write_vertices(&mut self) {
        let center = self.center;
        self.vertices.clear();
        self.vertices.extend(self.springs.iter().map(|s| MeshVertex {
            position: s.current.to_array(),
            normal: (s.current - center).normalize_or_zero().to_array(),
        }));
    }

    /// Shade one edge sample at the current frame state
    pub fn shade(&self, sample: &EdgeSample) -> PulseShade {
        edge_pulse(
            &self.pulse_params,
            &PulseInput {
                edge_progress: sample.edge_progress,
                edge_index: sample.edge_index,
                time_s: self.time_s,
                position: sample.position,
                pointer: self.pointer,
                hover: self.hover,
            },
        )
    }

    /// Uniform block for a GPU pulse pass
    pub fn uniforms(&self, view_proj: Mat4) -> PulseUniforms {
        let p = &self.pulse_params;
        let mut waves = [[0.0; 4]; 3];
        let mut phase_scales = [0.0; 4];
        for (i, wave) in p.waves.iter().take(3).enumerate() {
            waves[i] = [wave.frequency, wave.speed, wave.amplitude, wave.floor];
            phase_scales[i] = wave.phase_scale;
        }
        phase_scales[3] = p.waves.len().min(3) as f32;

        PulseUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            pointer: self.pointer.to_array(),
            hover: self.hover,
            idle_color: p.idle_color,
            time: self.time_s,
            pulse_color: p.pulse_color,
            proximity_falloff: p.proximity_falloff,
            spark_color: p.spark_color,
            proximity_gain: p.proximity_gain,
            thresholds: [
                p.pulse_threshold[0],
                p.pulse_threshold[1],
                p.spark_threshold[0],
                p.spark_threshold[1],
            ],
            alpha: [
                p.base_alpha,
                p.idle_alpha_gain,
                p.hover_alpha_gain,
                p.endpoint_fade,
            ],
            waves,
            phase_scales,
        }
    }

    pub fn springs(&self) -> &[VertexSpring] {
        &self.springs
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Eased hover amount in [0, 1]
    pub fn hover(&self) -> f32 {
        self.hover
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn bound_radius(&self) -> f32 {
        self.bound_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_field() -> MeshPulseField {
        let springs = SpringParams {
            drift_strength_m: 0.0,
            ..Default::default()
        };
        MeshPulseField::new(
            &MeshParams::default(),
            springs,
            PulseParams::default(),
            NoiseField::default(),
        )
        .expect("default mesh is valid")
    }

    fn ray_at(field: &MeshPulseField) -> Ray {
        Ray::new(field.center() + Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z)
    }

    fn ray_away(field: &MeshPulseField) -> Ray {
        Ray::new(field.center() + Vec3::new(0.0, 0.0, 10.0), Vec3::Z)
    }

    #[test]
    fn test_buffers_match_detail() {
        let field = still_field();
        assert_eq!(field.vertices.len(), 42);
        assert_eq!(field.indices.len(), 80 * 3);
        assert_eq!(field.edges.edge_count, 120);
        assert_eq!(field.wire_edges.len(), 120);
    }

    #[test]
    fn test_octahedron_shape_builds() {
        let mesh = MeshParams {
            shape: MeshShape::Octahedron,
            ..Default::default()
        };
        let field = MeshPulseField::new(
            &mesh,
            SpringParams::default(),
            PulseParams::default(),
            NoiseField::default(),
        )
        .expect("octahedron mesh is valid");
        // 6 + 12 midpoints, 8 * 4 faces
        assert_eq!(field.vertices.len(), 18);
        assert_eq!(field.indices.len(), 32 * 3);
        assert_eq!(field.wire_edges.len(), 48);
        assert_eq!(field.edges.edge_count, 48);
    }

    #[test]
    fn test_hover_pulls_vertices_toward_pointer() {
        let mut field = still_field();
        let front = field.springs()[0].original;
        let pointer = front + (front - field.center()).normalize() * 0.3;
        for i in 0..30 {
            field.advance(i as f32 / 60.0, pointer, &ray_at(&field));
        }
        assert!(field.is_hovered());
        let spring = field.springs()[0];
        assert!(spring.current.distance(pointer) < spring.original.distance(pointer));
    }

    #[test]
    fn test_unhover_springs_back_to_rest() {
        let mut field = still_field();
        let pointer = field.springs()[3].original * 1.1;
        for i in 0..30 {
            field.advance(i as f32 / 60.0, pointer, &ray_at(&field));
        }
        assert!(field.springs()[3].displacement() > 1e-3);

        for i in 30..230 {
            field.advance(i as f32 / 60.0, pointer, &ray_away(&field));
        }
        assert!(!field.is_hovered());
        assert!(field.springs().iter().all(|s| s.displacement() < 1e-4));
    }

    #[test]
    fn test_hover_eases_in_and_out() {
        let mut field = still_field();
        let pointer = field.center();
        field.advance(0.0, pointer, &ray_at(&field));
        field.advance(1.0 / 60.0, pointer, &ray_at(&field));
        let rising = field.hover();
        assert!(rising > 0.0 && rising < 1.0);

        for i in 2..120 {
            field.advance(i as f32 / 60.0, pointer, &ray_at(&field));
        }
        assert!(field.hover() > 0.99);

        field.advance(2.0 + 1.0 / 60.0, pointer, &ray_away(&field));
        assert!(field.hover() < 0.99 && field.hover() > 0.5);
    }

    #[test]
    fn test_originals_never_move() {
        let mut field = still_field();
        let before: Vec<Vec3> = field.springs().iter().map(|s| s.original).collect();
        for i in 0..50 {
            let pointer = Vec3::new((i as f32 * 0.3).sin(), 1.0, 1.2);
            field.advance(i as f32 / 60.0, pointer, &ray_at(&field));
        }
        let after: Vec<Vec3> = field.springs().iter().map(|s| s.original).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_uniforms_carry_waves() {
        let field = still_field();
        let uniforms = field.uniforms(Mat4::IDENTITY);
        assert_eq!(uniforms.phase_scales[3], 3.0);
        assert_eq!(uniforms.waves[0][0], PulseParams::default().waves[0].frequency);
    }
}
