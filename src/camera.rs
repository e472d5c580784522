//! Scroll-choreographed orbit camera with a cinematic intro shot.

mod projection;
mod rig;

pub use projection::CameraTransform;
pub use rig::{
    lerp_pose, locate_segment, pose_at_progress, sanitize_pose, spherical_to_cartesian,
};

use glam::Vec3;

use crate::error::ConfigResult;
use crate::math::ease_in_out_cubic;
use crate::params::{CameraPose, CameraScript};

/// Host viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_narrow(&self, breakpoint_px: u32) -> bool {
        self.width < breakpoint_px
    }
}

/// Where the establishing shot currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntroPhase {
    /// Parked on the establishing pose, waiting for the ready signal
    Holding,
    /// Blending toward the scroll pose since `start_s`
    Playing { start_s: f32 },
    /// Scroll has full control
    Done,
}

/// Owns the rig state and turns (time, scroll, viewport) into a camera
pub struct CameraChoreographer {
    script: CameraScript,
    rig: CameraPose,
    intro: IntroPhase,
    session_start_s: Option<f32>,
    ready_signalled: bool,
}

impl CameraChoreographer {
    /// Create a choreographer, rejecting invalid scripts
    pub fn new(script: CameraScript) -> ConfigResult<Self> {
        if let Err(e) = script.validate() {
            log::error!("rejecting camera script: {}", e);
            return Err(e);
        }

        let (rig, intro) = match &script.intro {
            Some(shot) => (shot.pose, IntroPhase::Holding),
            None => (pose_at_progress(&script, 0.0), IntroPhase::Done),
        };
        log::debug!(
            "camera script: {} stops, {} segments, intro {:?}",
            script.stops.len(),
            script.segment_count(),
            intro
        );

        Ok(Self {
            script,
            rig,
            intro,
            session_start_s: None,
            ready_signalled: false,
        })
    }

    /// Host signal that loading finished; starts the establishing shot
    pub fn intro_complete(&mut self) {
        if !self.ready_signalled {
            log::info!("intro ready signal received");
        }
        self.ready_signalled = true;
    }

    /// Advance one frame and publish the camera transform
    pub fn advance(&mut self, time_s: f32, scroll_progress: f32, viewport: Viewport) -> CameraTransform {
        let progress = if scroll_progress.is_finite() {
            scroll_progress
        } else {
            0.0
        };
        if !(0.0..=1.0).contains(&progress) {
            log::debug!("clamping scroll progress {}", progress);
        }

        let scroll_pose = pose_at_progress(&self.script, progress.clamp(0.0, 1.0));
        let mut pose = self.apply_intro(time_s, scroll_pose);

        if viewport.is_narrow(self.script.narrow_breakpoint_px) {
            pose.radius *= self.script.narrow_radius_scale;
        }
        self.rig = sanitize_pose(pose);

        let target = Vec3::new(0.0, self.rig.target_y, 0.0);
        CameraTransform::looking_at(target + spherical_to_cartesian(&self.rig), target)
    }

    fn apply_intro(&mut self, time_s: f32, scroll_pose: CameraPose) -> CameraPose {
        let Some(shot) = self.script.intro else {
            return scroll_pose;
        };
        let session_start = *self.session_start_s.get_or_insert(time_s);

        if self.intro == IntroPhase::Holding {
            if self.ready_signalled {
                self.intro = IntroPhase::Playing { start_s: time_s };
                log::info!("intro shot started at {:.2}s", time_s);
            } else if time_s - session_start >= shot.ready_timeout_s {
                self.intro = IntroPhase::Playing { start_s: time_s };
                log::warn!(
                    "no ready signal after {:.1}s, starting intro shot anyway",
                    shot.ready_timeout_s
                );
            }
        }

        match self.intro {
            IntroPhase::Holding => shot.pose,
            IntroPhase::Playing { start_s } => {
                let t = if shot.duration_s > 0.0 {
                    ((time_s - start_s) / shot.duration_s).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                if t >= 1.0 {
                    self.intro = IntroPhase::Done;
                    log::info!("intro shot finished, scroll has control");
                    return scroll_pose;
                }
                lerp_pose(&shot.pose, &scroll_pose, ease_in_out_cubic(t))
            }
            IntroPhase::Done => scroll_pose,
        }
    }

    /// Rig state published by the last `advance`
    pub fn rig(&self) -> &CameraPose {
        &self.rig
    }

    pub fn intro_phase(&self) -> IntroPhase {
        self.intro
    }

    pub fn script(&self) -> &CameraScript {
        &self.script
    }
}
