use std::{cell::RefCell, rc::Rc};

use super::{BufferRole, DeviceBuffer, DeviceTexture, GraphicsDevice};
use crate::data_structures::texture::{TextureData, TextureFormat};

/// Counters shared by a [`HostDevice`] and everything it created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    pub buffers_created: usize,
    pub textures_created: usize,
    pub drains: usize,
    pub writes: usize,
    pub bytes_written: u64,
}

/// A device that lives in host memory.
///
/// Buffers are plain byte vectors and textures only carry their metadata.
/// Every operation is recorded in [`HostStats`] so callers can observe how
/// often memory was reallocated, drained or written.
#[derive(Clone, Debug)]
pub struct HostDevice {
    stats: Rc<RefCell<HostStats>>,
    offset_alignment: u64,
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDevice {
    pub fn new() -> Self {
        Self::with_alignment(1)
    }

    /// Emulate a device with a storage offset alignment of `alignment` bytes.
    pub fn with_alignment(alignment: u64) -> Self {
        crate::require!(
            alignment.is_power_of_two(),
            "offset alignment {alignment} is not a power of two"
        );
        Self {
            stats: Rc::default(),
            offset_alignment: alignment,
        }
    }

    pub fn stats(&self) -> HostStats {
        self.stats.borrow().clone()
    }
}

impl GraphicsDevice for HostDevice {
    type Buffer = HostBuffer;
    type Texture = HostTexture;

    fn create_buffer(&self, size: u64, role: BufferRole, label: &str) -> HostBuffer {
        self.stats.borrow_mut().buffers_created += 1;
        log::trace!("host buffer {label} ({role:?}): {size} bytes");
        HostBuffer {
            contents: vec![0; size as usize],
            role,
            stats: self.stats.clone(),
        }
    }

    fn create_texture(&self, data: &TextureData, _label: &str) -> HostTexture {
        self.stats.borrow_mut().textures_created += 1;
        HostTexture {
            width: data.width,
            height: data.height,
            format: data.format,
        }
    }

    fn drain(&self) {
        self.stats.borrow_mut().drains += 1;
    }

    fn offset_alignment(&self) -> u64 {
        self.offset_alignment
    }
}

#[derive(Debug)]
pub struct HostBuffer {
    contents: Vec<u8>,
    role: BufferRole,
    stats: Rc<RefCell<HostStats>>,
}

impl HostBuffer {
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn role(&self) -> BufferRole {
        self.role
    }
}

impl DeviceBuffer for HostBuffer {
    fn write(&mut self, data: &[u8], offset: u64) {
        let start = offset as usize;
        self.contents[start..start + data.len()].copy_from_slice(data);
        let mut stats = self.stats.borrow_mut();
        stats.writes += 1;
        stats.bytes_written += data.len() as u64;
    }

    fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostTexture {
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl DeviceTexture for HostTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }
}
