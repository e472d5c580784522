//! Smokestage - headless renderer for the smoke volume, scroll camera and
//! wireframe pulse engine
//!
//! Drives the engine the way a page would (time, scroll, pointer) and writes
//! CPU reference frames to PNG.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;

use cli::Args;
use smokestage::camera::Viewport;
use smokestage::params::RecordingConfig;
use smokestage::rendering::FrameBuffer;
use smokestage::{Engine, FrameInput};

/// Background the passes composite over
const CLEAR_COLOR: Vec3 = Vec3::new(0.008, 0.01, 0.02);

/// Simulation rate for still frames (Hz)
const STILL_FPS: f32 = 60.0;

/// Per-frame host state
struct Host {
    engine: Engine,
    args: Args,
    viewport: Viewport,
    ready_sent: bool,
}

impl Host {
    fn new(args: Args) -> Result<Self> {
        let scene = args.load_scene()?;
        let viewport = Viewport::new(scene.render.width, scene.render.height);
        let engine = Engine::new(scene).context("invalid scene configuration")?;
        Ok(Self {
            engine,
            args,
            viewport,
            ready_sent: false,
        })
    }

    fn input(&mut self, time_s: f32, scroll_progress: f32) -> FrameInput {
        if !self.ready_sent && self.args.ready_time().is_some_and(|t| time_s >= t) {
            self.engine.intro_complete();
            self.ready_sent = true;
        }
        FrameInput {
            time_s,
            scroll_progress,
            pointer_ndc: self.args.pointer_ndc(),
            viewport: self.viewport,
            tier: self.args.tier,
        }
    }

    fn render(&self, output: &smokestage::FrameOutput, time_s: f32) -> FrameBuffer {
        let mut frame = FrameBuffer::new(self.viewport.width, self.viewport.height, CLEAR_COLOR);
        self.engine.render_reference(output, time_s, &mut frame);
        frame
    }

    /// Simulate up to `--time` at a fixed rate, then render one frame
    fn still(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.args.output)
            .with_context(|| format!("failed to create {}", self.args.output))?;

        let frames = (self.args.time.max(0.0) * STILL_FPS).round() as usize;
        let scroll = self.args.scroll;
        let input = self.input(0.0, scroll);
        let mut output = self.engine.advance(&input);
        for i in 1..=frames {
            let input = self.input(i as f32 / STILL_FPS, scroll);
            output = self.engine.advance(&input);
        }

        let time_s = frames as f32 / STILL_FPS;
        let path = format!("{}/frame.png", self.args.output);
        self.render(&output, time_s)
            .save_png(&path)
            .with_context(|| format!("failed to save {}", path))?;
        log::info!(
            "wrote {} (t = {:.2}s, scroll {:.2}, camera {:?})",
            path,
            time_s,
            scroll,
            output.camera.eye
        );
        Ok(())
    }

    /// Sweep scroll from 0 to 1 over the recording
    fn record(&mut self, config: &RecordingConfig) -> Result<()> {
        let total = config.total_frames().max(1);
        log::info!(
            "recording {} frames at {} fps to {}",
            total,
            config.fps,
            config.frames_dir()
        );

        for index in 0..total {
            let time_s = index as f32 / config.fps as f32;
            let scroll = if total > 1 {
                index as f32 / (total - 1) as f32
            } else {
                0.0
            };
            let input = self.input(time_s, scroll);
            let output = self.engine.advance(&input);

            let path = config.frame_path(index);
            if let Err(e) = self.render(&output, time_s).save_png(&path) {
                log::error!("failed to save frame {}: {}", index, e);
            }
            if index % config.fps.max(1) as usize == 0 {
                log::info!("frame {}/{} (scroll {:.2})", index + 1, total, scroll);
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let recording = args.create_recording_config()?;
    let mut host = Host::new(args)?;

    match recording {
        Some(config) => host.record(&config),
        None => host.still(),
    }
}
