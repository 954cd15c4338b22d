use std::time::Duration;

use anyhow::*;

use super::{BufferRole, DeviceBuffer, DeviceTexture, GraphicsDevice};
use crate::data_structures::texture::{TextureData, TextureFormat};

/// wgpu device and queue handles.
///
/// Both handles are reference counted inside wgpu, so cloning is cheap and
/// every buffer keeps the queue it writes through.
#[derive(Clone, Debug)]
pub struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    offset_alignment: u64,
}

impl Gpu {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let offset_alignment = device.limits().min_storage_buffer_offset_alignment as u64;
        Self {
            device,
            queue,
            offset_alignment,
        }
    }

    /// Copy a buffer back to the host.
    ///
    /// Mostly useful for tests and debugging: this waits for the device.
    pub async fn read_back(&self, buffer: &GpuBuffer) -> Result<Vec<u8>> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("read back staging buffer"),
            size: buffer.size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("read back encoder"),
            });
        encoder.copy_buffer_to_buffer(&buffer.buffer, 0, &staging, 0, buffer.size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver only goes away if the caller dropped the future.
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .context("read back channel closed")??;
        let data = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(data)
    }
}

impl GraphicsDevice for Gpu {
    type Buffer = GpuBuffer;
    type Texture = GpuTexture;

    fn create_buffer(&self, size: u64, role: BufferRole, label: &str) -> GpuBuffer {
        // wgpu copies operate on multiples of four bytes.
        let size = size.max(4).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: role.usages(),
            mapped_at_creation: false,
        });
        GpuBuffer {
            buffer,
            queue: self.queue.clone(),
            size,
        }
    }

    fn create_texture(&self, data: &TextureData, label: &str) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: data.width.max(1),
            height: data.height.max(1),
            depth_or_array_layers: 1,
        };
        let format = data.format.to_wgpu();
        let usage = if data.data.is_some() {
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        if let Some(bytes) = data.upload_bytes() {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                &bytes,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(data.upload_row_bytes()),
                    rows_per_image: Some(data.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTexture {
            texture,
            view,
            width: size.width,
            height: size.height,
            format: data.format,
        }
    }

    fn drain(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        }) {
            log::warn!("Device drain did not complete: {e}");
        }
    }

    fn offset_alignment(&self) -> u64 {
        self.offset_alignment
    }
}

#[derive(Debug)]
pub struct GpuBuffer {
    pub buffer: wgpu::Buffer,
    queue: wgpu::Queue,
    size: u64,
}

impl DeviceBuffer for GpuBuffer {
    fn write(&mut self, data: &[u8], offset: u64) {
        if data.is_empty() {
            return;
        }
        // write_buffer wants 4 byte multiples, pad the tail with zeroes.
        if data.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            let mut padded = data.to_vec();
            padded.resize(
                (data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT) as usize,
                0,
            );
            self.queue.write_buffer(&self.buffer, offset, &padded);
        } else {
            self.queue.write_buffer(&self.buffer, offset, data);
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl DeviceTexture for GpuTexture {
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
