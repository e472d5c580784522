// End-to-end scenarios driving the engine through its public API.

use glam::{Vec2, Vec3};

use smokestage::camera::{CameraChoreographer, Viewport};
use smokestage::math::Ray;
use smokestage::mesh::crest_sum;
use smokestage::noise::NoiseField;
use smokestage::params::{
    CameraScript, CameraStop, Flourish, PulseParams, SceneConfig, SpringParams, VolumeParams,
};
use smokestage::rendering::{DrawCall, FrameBuffer};
use smokestage::volume::march_ray;
use smokestage::{ConfigError, DeviceTier, Engine, FrameInput};

fn frame(time_s: f32, scroll_progress: f32) -> FrameInput {
    FrameInput {
        time_s,
        scroll_progress,
        pointer_ndc: Vec2::ZERO,
        viewport: Viewport::new(1280, 720),
        tier: DeviceTier::High,
    }
}

fn reference_box() -> VolumeParams {
    VolumeParams {
        box_min: [-4.0, -0.75, -4.0],
        box_max: [4.0, 2.75, 4.0],
        absorption: 0.38,
        ..Default::default()
    }
}

#[test]
fn ray_through_box_center_is_visible_only_with_absorption() {
    let noise = NoiseField::default();
    let params = reference_box();
    let center = Vec3::new(0.0, 1.0, 0.0);
    let ray = Ray::new(Vec3::new(0.0, 1.0, 15.0), center - Vec3::new(0.0, 1.0, 15.0));

    let lit = march_ray(&params, &noise, &ray, 0.5, 0.0, None);
    assert!(lit.alpha > 0.0);

    let clear = VolumeParams {
        absorption: 0.0,
        ..params
    };
    let dark = march_ray(&clear, &noise, &ray, 0.5, 0.0, None);
    assert_eq!(dark.alpha, 0.0);
}

#[test]
fn alpha_never_rises_when_absorption_falls() {
    let noise = NoiseField::new(1234);
    for k in 0..8 {
        let angle = k as f32 * 0.7;
        let origin = Vec3::new(angle.sin() * 12.0, 1.5, angle.cos() * 12.0);
        let ray = Ray::new(origin, Vec3::new(0.0, 1.0, 0.0) - origin);
        let mut previous = 0.0;
        for i in 0..=12 {
            let params = VolumeParams {
                absorption: i as f32 * 0.15,
                ..reference_box()
            };
            let alpha = march_ray(&params, &noise, &ray, 0.25, 2.0, None).alpha;
            assert!(alpha + 1e-6 >= previous);
            previous = alpha;
        }
    }
}

#[test]
fn five_stop_script_rests_on_first_and_last_pose() {
    let script = CameraScript {
        stops: vec![
            CameraStop::new(0.0, 1.35, 9.0, 0.8),
            CameraStop::new(0.9, 1.2, 7.5, 1.0),
            CameraStop::new(2.1, 1.45, 8.5, 0.6),
            CameraStop::new(3.3, 1.05, 6.5, 1.2),
            CameraStop::new(4.4, 1.3, 8.0, 0.9).with_flourish(Flourish::default()),
        ],
        intro: None,
        ..Default::default()
    };
    let first = script.stops[0].pose;
    let last = script.stops[4].pose;
    let mut camera = CameraChoreographer::new(script).expect("valid script");
    let viewport = Viewport::new(1280, 720);

    camera.advance(0.0, 0.0, viewport);
    let rig = *camera.rig();
    assert!((rig.theta - first.theta).abs() < 1e-5);
    assert!((rig.phi - first.phi).abs() < 1e-5);
    assert!((rig.radius - first.radius).abs() < 1e-5);
    assert!((rig.target_y - first.target_y).abs() < 1e-5);

    camera.advance(0.0, 1.0, viewport);
    let rig = *camera.rig();
    assert!((rig.theta - last.theta).abs() < 1e-5);
    assert!((rig.phi - last.phi).abs() < 1e-5);
    assert!((rig.radius - last.radius).abs() < 1e-5);
    assert!((rig.target_y - last.target_y).abs() < 1e-5);
}

#[test]
fn scroll_sweep_through_engine_has_no_teleports() {
    let scene = SceneConfig {
        camera: CameraScript {
            intro: None,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = Engine::new(scene).expect("valid scene");
    let mut previous = engine.advance(&frame(0.0, 0.0)).camera.eye;
    for i in 1..=5000 {
        let eye = engine.advance(&frame(0.0, i as f32 / 5000.0)).camera.eye;
        assert!((eye - previous).length() < 0.2);
        previous = eye;
    }
}

#[test]
fn empty_stop_list_is_rejected() {
    let scene = SceneConfig {
        camera: CameraScript {
            stops: Vec::new(),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(Engine::new(scene), Err(ConfigError::EmptyStops)));
}

#[test]
fn degenerate_box_is_rejected() {
    let scene = SceneConfig {
        volume: VolumeParams {
            box_min: [0.0, 0.0, 0.0],
            box_max: [1.0, 0.0, 1.0],
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        Engine::new(scene),
        Err(ConfigError::DegenerateBox { .. })
    ));
}

#[test]
fn divergent_springs_are_rejected() {
    let scene = SceneConfig {
        springs: SpringParams {
            stiffness: 5.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        Engine::new(scene),
        Err(ConfigError::UnstableSpring { .. })
    ));
}

#[test]
fn intro_waits_for_ready_signal_then_hands_over() {
    let mut engine = Engine::new(SceneConfig::default()).expect("valid scene");
    let held = engine.advance(&frame(0.0, 0.0)).camera.eye;
    let still_held = engine.advance(&frame(1.0, 0.0)).camera.eye;
    assert_eq!(held, still_held);

    engine.intro_complete();
    let mut eye = still_held;
    for i in 0..=300 {
        eye = engine.advance(&frame(1.0 + i as f32 / 60.0, 0.0)).camera.eye;
    }
    assert_ne!(eye, held);

    let mut scroll_only = Engine::new(SceneConfig {
        camera: CameraScript {
            intro: None,
            ..Default::default()
        },
        ..Default::default()
    })
    .expect("valid scene");
    let target = scroll_only.advance(&frame(0.0, 0.0)).camera.eye;
    assert!((eye - target).length() < 1e-4);
}

#[test]
fn low_tier_skips_volume_and_pulses() {
    let mut engine = Engine::new(SceneConfig::default()).expect("valid scene");
    let output = engine.advance(&FrameInput {
        tier: DeviceTier::Low,
        ..frame(0.0, 0.4)
    });
    assert_eq!(output.draws.len(), 1);
    assert!(matches!(output.draws[0], DrawCall::OpaqueMesh(_)));

    let output = engine.advance(&FrameInput {
        tier: DeviceTier::Medium,
        ..frame(0.1, 0.4)
    });
    assert_eq!(output.draws.len(), 3);
}

#[test]
fn edges_pulse_out_of_step() {
    let params = PulseParams::default();
    let a: Vec<f32> = (0..90).map(|i| crest_sum(&params, 0.3, 4.0, i as f32 / 30.0)).collect();
    let b: Vec<f32> = (0..90).map(|i| crest_sum(&params, 0.3, 5.0, i as f32 / 30.0)).collect();
    assert_ne!(a, b);
}

#[test]
fn reference_render_produces_finite_pixels() {
    let scene = SceneConfig {
        camera: CameraScript {
            intro: None,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = Engine::new(scene).expect("valid scene");
    let output = engine.advance(&FrameInput {
        viewport: Viewport::new(64, 36),
        ..frame(0.5, 0.3)
    });

    let background = Vec3::splat(0.01);
    let mut image = FrameBuffer::new(64, 36, background);
    engine.render_reference(&output, 0.5, &mut image);
    assert!(image.pixels.iter().all(|p| p.is_finite()));
    assert!(image.pixels.iter().any(|&p| p != background));
    assert_eq!(image.to_rgba8().len(), 64 * 36 * 4);
}
