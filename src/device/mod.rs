//! Graphics device seam.
//!
//! Buffers, rings and resource tables only need a handful of device
//! operations: allocate a buffer, write into it, create a texture and drain
//! the device before a reallocation. [`GraphicsDevice`] captures exactly
//! those. [`Gpu`] implements it on top of wgpu, [`HostDevice`] keeps
//! everything in host memory so the arena and table logic can be exercised
//! without an adapter.

mod gpu;
mod host;

pub use gpu::{Gpu, GpuBuffer, GpuTexture};
pub use host::{HostBuffer, HostDevice, HostStats, HostTexture};

use crate::data_structures::texture::{TextureData, TextureFormat};

/// What a device buffer is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferRole {
    Vertex,
    Index,
    Storage,
    Indirect,
}

impl BufferRole {
    pub fn usages(self) -> wgpu::BufferUsages {
        let role = match self {
            BufferRole::Vertex => wgpu::BufferUsages::VERTEX,
            BufferRole::Index => wgpu::BufferUsages::INDEX,
            BufferRole::Storage => wgpu::BufferUsages::STORAGE,
            // Indirect buffers are also bound as storage so shaders and
            // read-back tooling can inspect the commands.
            BufferRole::Indirect => wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::STORAGE,
        };
        role | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC
    }
}

pub trait DeviceBuffer {
    /// Copy `data` into the buffer at `offset` bytes.
    ///
    /// Callers guarantee `offset + data.len() <= self.size()`.
    fn write(&mut self, data: &[u8], offset: u64);

    /// Capacity in bytes.
    fn size(&self) -> u64;
}

pub trait DeviceTexture {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> TextureFormat;
}

pub trait GraphicsDevice: Clone {
    type Buffer: DeviceBuffer;
    type Texture: DeviceTexture;

    fn create_buffer(&self, size: u64, role: BufferRole, label: &str) -> Self::Buffer;

    /// Create a texture and upload `data`'s texels if it has any.
    fn create_texture(&self, data: &TextureData, label: &str) -> Self::Texture;

    /// Block until the device has retired every submitted command.
    ///
    /// This is a full pipeline stall. Only buffer growth calls it.
    fn drain(&self);

    /// Alignment required for storage buffer binding offsets.
    fn offset_alignment(&self) -> u64;
}
