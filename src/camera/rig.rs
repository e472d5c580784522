//! Scroll-to-pose mapping over the keyframed stops.

use std::f32::consts::PI;

use glam::Vec3;

use crate::math::{ease_in_out_cubic, ease_out_cubic, mix};
use crate::params::{CameraPose, CameraScript, Flourish, PHI_EPSILON};

/// Component-wise linear blend of two poses
pub fn lerp_pose(a: &CameraPose, b: &CameraPose, t: f32) -> CameraPose {
    CameraPose {
        theta: mix(a.theta, b.theta, t),
        phi: mix(a.phi, b.phi, t),
        radius: mix(a.radius, b.radius, t),
        target_y: mix(a.target_y, b.target_y, t),
    }
}

/// Keep `phi` off the poles and `radius` positive
pub fn sanitize_pose(pose: CameraPose) -> CameraPose {
    CameraPose {
        phi: pose.phi.clamp(PHI_EPSILON, PI - PHI_EPSILON),
        radius: pose.radius.max(1e-3),
        ..pose
    }
}

/// Spherical to Cartesian: `x = r sinφ sinθ`, `y = r cosφ`, `z = r sinφ cosθ`
pub fn spherical_to_cartesian(pose: &CameraPose) -> Vec3 {
    let (sin_phi, cos_phi) = pose.phi.sin_cos();
    let (sin_theta, cos_theta) = pose.theta.sin_cos();
    Vec3::new(
        pose.radius * sin_phi * sin_theta,
        pose.radius * cos_phi,
        pose.radius * sin_phi * cos_theta,
    )
}

/// Push-then-pull travel from `from` to `to`
fn flourish_pose(from: &CameraPose, to: &CameraPose, flourish: &Flourish, t: f32) -> CameraPose {
    let split = flourish.push_fraction.clamp(0.01, 0.99);
    let mut pushed = lerp_pose(from, to, split);
    pushed.radius += flourish.push_radius;
    pushed.phi += flourish.push_phi;

    if t < split {
        lerp_pose(from, &pushed, ease_out_cubic(t / split))
    } else {
        lerp_pose(&pushed, to, ease_in_out_cubic((t - split) / (1.0 - split)))
    }
}

/// Which segment a progress value falls in, and how far along it
///
/// Progress is clamped to [0, 1]; progress 1 lands at the end of the last segment.
pub fn locate_segment(progress: f32, segment_count: usize) -> (usize, f32) {
    let count = segment_count.max(1);
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let scaled = progress * count as f32;
    let index = (scaled.floor() as usize).min(count - 1);
    (index, (scaled - index as f32).clamp(0.0, 1.0))
}

/// Rig pose for a scroll progress value
///
/// Segment 0 travels from the scroll intro pose to the first stop, segment `i`
/// from stop `i - 1` to stop `i`, the next segment holds the last stop, and an
/// optional footer segment travels from the last stop to the footer pose.
pub fn pose_at_progress(script: &CameraScript, progress: f32) -> CameraPose {
    let stops = &script.stops;
    let Some(last) = stops.last() else {
        log::error!("camera script has no stops; holding default pose");
        return CameraPose::default();
    };

    let (segment, t) = locate_segment(progress, script.segment_count());
    let len = stops.len();

    if segment < len {
        let from = if segment == 0 {
            script.scroll_intro.unwrap_or(stops[0].pose)
        } else {
            stops[segment - 1].pose
        };
        let stop = &stops[segment];
        return match &stop.flourish {
            Some(flourish) => flourish_pose(&from, &stop.pose, flourish, t),
            None => lerp_pose(&from, &stop.pose, t),
        };
    }

    match (segment == len, script.footer) {
        (false, Some(footer)) => lerp_pose(&last.pose, &footer, t),
        _ => last.pose,
    }
}
