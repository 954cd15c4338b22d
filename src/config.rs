//! Renderer configuration.
//!
//! [`RenderConfig`] collects every knob the renderer core reads at startup.
//! Values are plain data so applications can build them from whatever
//! source they like and hand them to [`crate::flow::run`] or
//! [`crate::render::Renderer::new`].

use crate::tables::material::DenseIndexing;

/// Number of frames the CPU may run ahead of the device.
///
/// Every [`crate::buffers::FrameRing`] is sized with this many slots. The
/// value must cover the deepest pipeline the device can keep in flight,
/// otherwise a slot could be rewritten while a previous frame still reads it.
pub const FRAMES_IN_FLIGHT: usize = 3;

/// Default length of the bindless texture array.
pub const DEFAULT_MAX_TEXTURES: u32 = 1024;

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub frames_in_flight: usize,
    pub max_textures: u32,
    pub clear_colour: wgpu::Color,
    pub material_indexing: DenseIndexing,
    pub event_queue_capacity: usize,
    pub present_mode: wgpu::PresentMode,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: FRAMES_IN_FLIGHT,
            max_textures: DEFAULT_MAX_TEXTURES,
            clear_colour: wgpu::Color::BLACK,
            material_indexing: DenseIndexing::Stable,
            event_queue_capacity: 256,
            present_mode: wgpu::PresentMode::AutoVsync,
            power_preference: wgpu::PowerPreference::default(),
        }
    }
}

impl RenderConfig {
    pub fn with_frames_in_flight(mut self, frames: usize) -> Self {
        self.frames_in_flight = frames;
        self
    }

    pub fn with_max_textures(mut self, max_textures: u32) -> Self {
        self.max_textures = max_textures;
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_material_indexing(mut self, indexing: DenseIndexing) -> Self {
        self.material_indexing = indexing;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }

    /// Surface latency derived from the ring depth.
    ///
    /// One slot is always owned by the CPU while it records the next frame,
    /// so the swap chain may hold at most `frames_in_flight - 1` frames.
    pub fn surface_latency(&self) -> u32 {
        self.frames_in_flight.saturating_sub(1).max(1) as u32
    }

    /// Abort on configurations the ring discipline cannot honour.
    pub fn validate(&self) {
        crate::require!(
            self.frames_in_flight >= 1,
            "frames_in_flight must be at least 1, got {}",
            self.frames_in_flight
        );
        crate::require!(self.max_textures >= 1, "max_textures must be at least 1");
        crate::require!(
            self.event_queue_capacity >= 1,
            "event_queue_capacity must be at least 1"
        );
        if self.frames_in_flight < 2 {
            log::warn!(
                "frames_in_flight = {} serialises CPU and GPU work",
                self.frames_in_flight
            );
        }
    }
}
