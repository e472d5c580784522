//! Camera choreography configuration: orbit stops, flourishes and the intro shot.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Keep `phi` this far away from the poles (radians)
pub const PHI_EPSILON: f32 = 1e-3;

/// Spherical orbit pose around the vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Azimuth around +Y (radians, 0 = looking down -Z from +Z)
    pub theta: f32,

    /// Polar angle from +Y (radians, must stay inside (0, π))
    pub phi: f32,

    /// Distance from the look-at point (meters)
    pub radius: f32,

    /// Look-at height (meters)
    pub target_y: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2 - 0.2,
            radius: 9.0,
            target_y: 0.8,
        }
    }
}

/// Push-then-pull override for the segment that ends at a stop
///
/// The first `push_fraction` of the segment eases out toward an outward pose
/// (radius grown by `push_radius`, phi shifted by `push_phi`), the remainder
/// eases in-out onto the stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flourish {
    /// Share of the segment spent pushing out (0..1)
    pub push_fraction: f32,

    /// Extra orbit radius at the end of the push (meters)
    pub push_radius: f32,

    /// Polar angle offset at the end of the push (radians)
    pub push_phi: f32,
}

impl Default for Flourish {
    fn default() -> Self {
        Self {
            push_fraction: 0.4,
            push_radius: 4.5,
            push_phi: -0.25,
        }
    }
}

/// One keyframe of the scroll choreography
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraStop {
    pub pose: CameraPose,

    /// Optional flourish applied while travelling *into* this stop
    #[serde(default)]
    pub flourish: Option<Flourish>,
}

impl CameraStop {
    pub fn new(theta: f32, phi: f32, radius: f32, target_y: f32) -> Self {
        Self {
            pose: CameraPose {
                theta,
                phi,
                radius,
                target_y,
            },
            flourish: None,
        }
    }

    pub fn with_flourish(mut self, flourish: Flourish) -> Self {
        self.flourish = Some(flourish);
        self
    }
}

/// Time-driven establishing shot played before scroll takes over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntroShot {
    /// Pulled-back pose held until the host signals readiness
    pub pose: CameraPose,

    /// Blend duration from the establishing pose to the scroll pose (seconds)
    pub duration_s: f32,

    /// Start the blend anyway if no ready signal arrives (seconds)
    pub ready_timeout_s: f32,
}

impl Default for IntroShot {
    fn default() -> Self {
        Self {
            pose: CameraPose {
                theta: -0.45,
                phi: 0.85,
                radius: 17.0,
                target_y: 2.0,
            },
            duration_s: 2.8,
            ready_timeout_s: 5.0,
        }
    }
}

/// Complete camera choreography
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraScript {
    /// Ordered keyframes (must be non-empty)
    pub stops: Vec<CameraStop>,

    /// Pose at scroll progress 0; `None` starts on the first stop
    pub scroll_intro: Option<CameraPose>,

    /// Pose reached at scroll progress 1 after the last stop; adds one segment
    pub footer: Option<CameraPose>,

    /// Cinematic establishing shot; `None` starts directly on the scroll pose
    pub intro: Option<IntroShot>,

    /// Viewports narrower than this count as narrow (pixels)
    pub narrow_breakpoint_px: u32,

    /// Radius multiplier on narrow viewports (> 1)
    pub narrow_radius_scale: f32,
}

impl Default for CameraScript {
    fn default() -> Self {
        Self {
            stops: vec![
                CameraStop::new(0.0, 1.35, 9.0, 0.8),
                CameraStop::new(0.9, 1.2, 7.5, 1.0),
                CameraStop::new(2.1, 1.45, 8.5, 0.6),
                CameraStop::new(3.3, 1.05, 6.5, 1.2),
                CameraStop::new(4.4, 1.3, 8.0, 0.9).with_flourish(Flourish::default()),
            ],
            scroll_intro: None,
            footer: None,
            intro: Some(IntroShot::default()),
            narrow_breakpoint_px: 768,
            narrow_radius_scale: 1.35,
        }
    }
}

impl CameraScript {
    /// Number of equal-width scroll segments
    pub fn segment_count(&self) -> usize {
        self.stops.len() + 1 + usize::from(self.footer.is_some())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.stops.is_empty() {
            return Err(ConfigError::EmptyStops);
        }
        for (index, stop) in self.stops.iter().enumerate() {
            check_pose(&stop.pose).map_err(|reason| ConfigError::InvalidStop { index, reason })?;
            if let Some(flourish) = &stop.flourish {
                let from = match index {
                    0 => self.scroll_intro.unwrap_or(stop.pose),
                    _ => self.stops[index - 1].pose,
                };
                check_flourish(flourish, &from, &stop.pose)
                    .map_err(|reason| ConfigError::InvalidStop { index, reason })?;
            }
        }
        let extra = [
            ("scroll_intro", self.scroll_intro),
            ("footer", self.footer),
            ("intro", self.intro.map(|shot| shot.pose)),
        ];
        for (name, pose) in extra {
            if let Some(pose) = pose {
                check_pose(&pose).map_err(|reason| ConfigError::InvalidPose { name, reason })?;
            }
        }
        if let Some(shot) = &self.intro {
            for (label, seconds) in [
                ("duration_s", shot.duration_s),
                ("ready_timeout_s", shot.ready_timeout_s),
            ] {
                if !(seconds.is_finite() && seconds >= 0.0) {
                    return Err(ConfigError::InvalidPose {
                        name: "intro",
                        reason: format!("{} must be finite and >= 0, got {}", label, seconds),
                    });
                }
            }
        }
        if !(self.narrow_radius_scale > 1.0 && self.narrow_radius_scale.is_finite()) {
            return Err(ConfigError::InvalidPose {
                name: "narrow_radius_scale",
                reason: format!("must be > 1, got {}", self.narrow_radius_scale),
            });
        }
        Ok(())
    }
}

fn off_pole(phi: f32) -> bool {
    phi > PHI_EPSILON && phi < std::f32::consts::PI - PHI_EPSILON
}

/// The pushed pose sits `push_fraction` of the way along the segment
fn check_flourish(flourish: &Flourish, from: &CameraPose, to: &CameraPose) -> Result<(), String> {
    if !(flourish.push_fraction > 0.0 && flourish.push_fraction < 1.0) {
        return Err(format!(
            "flourish push_fraction {} outside (0, 1)",
            flourish.push_fraction
        ));
    }
    let split = flourish.push_fraction.clamp(0.01, 0.99);
    let pushed_phi = from.phi + (to.phi - from.phi) * split + flourish.push_phi;
    if !off_pole(pushed_phi) {
        return Err(format!("flourish pushes phi to pole ({})", pushed_phi));
    }
    let pushed_radius = from.radius + (to.radius - from.radius) * split + flourish.push_radius;
    if !(pushed_radius > 0.0 && pushed_radius.is_finite()) {
        return Err(format!("flourish pushes radius to {}", pushed_radius));
    }
    Ok(())
}

fn check_pose(pose: &CameraPose) -> Result<(), String> {
    if !(pose.radius > 0.0) {
        return Err(format!("radius must be > 0, got {}", pose.radius));
    }
    if !pose.theta.is_finite() || !pose.target_y.is_finite() {
        return Err(format!(
            "theta {} and target_y {} must be finite",
            pose.theta, pose.target_y
        ));
    }
    if !off_pole(pose.phi) {
        return Err(format!("phi {} too close to a pole", pose.phi));
    }
    Ok(())
}
