//! Edge pulse shading: traveling crests along each edge plus pointer proximity.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::math::{mix, mix_vec3, smoothstep};
use crate::params::PulseParams;

/// Per-fragment inputs of the pulse pass
#[derive(Debug, Clone, Copy)]
pub struct PulseInput {
    pub edge_progress: f32,
    pub edge_index: f32,
    pub time_s: f32,
    pub position: Vec3,
    pub pointer: Vec3,
    /// Eased hover amount in [0, 1]
    pub hover: f32,
}

/// Additive color and alpha for one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseShade {
    pub color: Vec3,
    pub alpha: f32,
    /// Combined crest + proximity value before color mapping
    pub pulse: f32,
}

/// Sum of the traveling crests at a point on an edge
pub fn crest_sum(params: &PulseParams, edge_progress: f32, edge_index: f32, time_s: f32) -> f32 {
    params
        .waves
        .iter()
        .map(|wave| {
            let phase = edge_progress * wave.frequency * TAU - time_s * wave.speed
                + edge_index * wave.phase_scale;
            let s = 0.5 + 0.5 * phase.sin();
            smoothstep(wave.floor, 1.0, s) * wave.amplitude
        })
        .sum()
}

/// Shade one fragment of the subdivided edge geometry
pub fn edge_pulse(params: &PulseParams, input: &PulseInput) -> PulseShade {
    let hover = input.hover.clamp(0.0, 1.0);
    let progress = input.edge_progress.clamp(0.0, 1.0);

    let crests = crest_sum(params, progress, input.edge_index, input.time_s);
    let distance = input.position.distance(input.pointer);
    let proximity = (-distance * params.proximity_falloff).exp() * params.proximity_gain * hover;
    let pulse = crests + proximity;

    let warm = smoothstep(params.pulse_threshold[0], params.pulse_threshold[1], pulse);
    let hot = smoothstep(params.spark_threshold[0], params.spark_threshold[1], pulse);
    let color = mix_vec3(
        mix_vec3(
            Vec3::from_array(params.idle_color),
            Vec3::from_array(params.pulse_color),
            warm,
        ),
        Vec3::from_array(params.spark_color),
        hot,
    );

    let gain = mix(params.idle_alpha_gain, params.hover_alpha_gain, hover);
    let fade = smoothstep(0.0, params.endpoint_fade, progress)
        * smoothstep(0.0, params.endpoint_fade, 1.0 - progress);
    let alpha = ((params.base_alpha + pulse) * gain * fade).clamp(0.0, 1.0);

    PulseShade {
        color,
        alpha,
        pulse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(edge_progress: f32, edge_index: f32, time_s: f32) -> PulseInput {
        PulseInput {
            edge_progress,
            edge_index,
            time_s,
            position: Vec3::ZERO,
            pointer: Vec3::new(10.0, 0.0, 0.0),
            hover: 0.0,
        }
    }

    #[test]
    fn test_endpoints_fade_to_zero() {
        let params = PulseParams::default();
        for t in [0.0, 0.7, 3.1] {
            assert_eq!(edge_pulse(&params, &input(0.0, 4.0, t)).alpha, 0.0);
            assert_eq!(edge_pulse(&params, &input(1.0, 4.0, t)).alpha, 0.0);
        }
    }

    #[test]
    fn test_neighbouring_edges_decorrelated() {
        let params = PulseParams::default();
        let timing = |edge_index: f32| -> Vec<f32> {
            (0..120)
                .map(|i| crest_sum(&params, 0.5, edge_index, i as f32 / 30.0))
                .collect()
        };
        let a = timing(0.0);
        let b = timing(1.0);
        assert_ne!(a, b);
        // Not just a time shift of the same value at this instant
        let differing = a
            .iter()
            .zip(&b)
            .filter(|(x, y)| (*x - *y).abs() > 1e-3)
            .count();
        assert!(differing > 10);
    }

    #[test]
    fn test_crests_are_sparse() {
        let params = PulseParams::default();
        let dark = (0..200)
            .filter(|&i| crest_sum(&params, i as f32 / 200.0, 0.0, 0.0) == 0.0)
            .count();
        assert!(dark > 20, "floors should hide the troughs");
    }

    #[test]
    fn test_hover_gates_proximity() {
        let params = PulseParams::default();
        let near = PulseInput {
            pointer: Vec3::new(0.05, 0.0, 0.0),
            ..input(0.5, 2.0, 1.0)
        };
        let idle = edge_pulse(&params, &near);
        let hovered = edge_pulse(&params, &PulseInput { hover: 1.0, ..near });
        assert!(hovered.pulse > idle.pulse);
        assert!(hovered.alpha > idle.alpha);
    }

    #[test]
    fn test_color_warms_with_pulse() {
        let params = PulseParams::default();
        let idle = Vec3::from_array(params.idle_color);
        let spark = Vec3::from_array(params.spark_color);
        let hot = PulseInput {
            pointer: Vec3::ZERO,
            hover: 1.0,
            ..input(0.5, 0.0, 0.0)
        };
        let shade = edge_pulse(
            &PulseParams {
                proximity_gain: 5.0,
                ..params.clone()
            },
            &hot,
        );
        assert!((shade.color - spark).length() < 1e-5);

        let quiet = edge_pulse(
            &PulseParams {
                waves: Vec::new(),
                ..params
            },
            &input(0.5, 0.0, 0.0),
        );
        assert!((quiet.color - idle).length() < 1e-5);
    }
}
