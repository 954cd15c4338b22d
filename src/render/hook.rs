//! Post-render hooks.
//!
//! A hook is injected when the renderer is built and runs every frame
//! after the present blit, before the frame's commands are submitted. It
//! can record extra passes (debug overlays, inspection tools) into the
//! same encoder and edit the scene for the next frame.

use std::time::Duration;

use instant::Instant;

use crate::data_structures::scene::Scene;

pub struct FrameInfo<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// The view the frame was presented into.
    pub view: &'a wgpu::TextureView,
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
}

pub trait PostRender {
    fn post_render(&mut self, frame: FrameInfo<'_>, scene: &mut Scene);
}

impl<F> PostRender for F
where
    F: FnMut(FrameInfo<'_>, &mut Scene),
{
    fn post_render(&mut self, frame: FrameInfo<'_>, scene: &mut Scene) {
        self(frame, scene)
    }
}

/// Logs the frame rate and entity count every `interval`.
pub struct FrameStats {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FrameStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: Instant::now(),
            frames: 0,
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl PostRender for FrameStats {
    fn post_render(&mut self, frame: FrameInfo<'_>, scene: &mut Scene) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.interval {
            log::info!(
                "frame {}: {:.1} fps, {} entities, {}x{}",
                frame.frame_index,
                self.frames as f64 / elapsed.as_secs_f64(),
                scene.entities.len(),
                frame.width,
                frame.height
            );
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }
}
