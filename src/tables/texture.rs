use crate::{
    buffers::MirroredBuffer,
    data_structures::texture::TextureData,
    device::{BufferRole, DeviceTexture, GraphicsDevice},
};

/// Index of a texture in the bindless texture array.
///
/// Handles are dense and append-only: once handed out a handle keeps
/// naming the same slot until the table is dropped. Only render targets
/// swap the texture behind their own handles, see [`TextureTable::replace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn from_index(index: u32) -> TextureHandle {
        TextureHandle(index)
    }

    /// The handle `n` positions after this one.
    pub fn offset(self, n: u32) -> TextureHandle {
        TextureHandle(self.0 + n)
    }
}

pub const TEXTURE_SAMPLEABLE: u32 = 1;

/// Shader-visible description of a texture array element.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub flags: u32,
}

impl TextureRecord {
    fn of<T: DeviceTexture>(texture: &T) -> Self {
        let format = texture.format();
        Self {
            width: texture.width(),
            height: texture.height(),
            format: format.id(),
            flags: if format.is_sampleable() {
                TEXTURE_SAMPLEABLE
            } else {
                0
            },
        }
    }

    pub fn is_sampleable(&self) -> bool {
        self.flags & TEXTURE_SAMPLEABLE != 0
    }
}

/// Every texture the renderer can reference by handle.
///
/// Slots stay allocated until the table is dropped; there is no removal.
pub struct TextureTable<D: GraphicsDevice> {
    device: D,
    textures: Vec<D::Texture>,
    records: MirroredBuffer<TextureRecord, D>,
}

impl<D: GraphicsDevice> TextureTable<D> {
    pub fn new(device: D) -> Self {
        Self {
            records: MirroredBuffer::new(device.clone(), BufferRole::Storage, "bindless_textures"),
            device,
            textures: Vec::new(),
        }
    }

    pub fn add(&mut self, texture: D::Texture) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.records.append(&[TextureRecord::of(&texture)]);
        self.textures.push(texture);
        handle
    }

    /// Append a contiguous block of textures and return the first handle.
    pub fn add_all(&mut self, textures: Vec<D::Texture>) -> TextureHandle {
        let first = TextureHandle(self.textures.len() as u32);
        let records: Vec<_> = textures.iter().map(TextureRecord::of).collect();
        self.records.append(&records);
        self.textures.extend(textures);
        first
    }

    /// Create a device texture without adding it, for blocks passed to
    /// [`TextureTable::add_all`].
    pub fn create_texture(&self, data: &TextureData, label: &str) -> D::Texture {
        self.device.create_texture(data, label)
    }

    /// Create a device texture from decoded data and add it.
    pub fn create(&mut self, data: &TextureData, label: &str) -> TextureHandle {
        let texture = self.device.create_texture(data, label);
        log::debug!(
            "Texture {label}: {}x{} {}",
            data.width,
            data.height,
            data.format
        );
        self.add(texture)
    }

    /// Swap the texture behind `handle`, keeping the handle valid.
    ///
    /// The previous texture is returned so the caller decides when it may
    /// be released.
    pub fn replace(&mut self, handle: TextureHandle, texture: D::Texture) -> D::Texture {
        crate::require!(
            (handle.0 as usize) < self.textures.len(),
            "cannot replace texture handle {} ({} textures)",
            handle.0,
            self.textures.len()
        );
        self.records
            .set(handle.0 as usize, TextureRecord::of(&texture));
        std::mem::replace(&mut self.textures[handle.0 as usize], texture)
    }

    /// Texture behind `handle`. Handles from another table are fatal.
    pub fn get(&self, handle: TextureHandle) -> &D::Texture {
        crate::require!(
            (handle.0 as usize) < self.textures.len(),
            "texture handle {} out of range ({} textures)",
            handle.0,
            self.textures.len()
        );
        &self.textures[handle.0 as usize]
    }

    pub fn get_many(&self, handles: &[TextureHandle]) -> Vec<&D::Texture> {
        handles.iter().map(|&h| self.get(h)).collect()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn textures(&self) -> &[D::Texture] {
        &self.textures
    }

    pub fn records(&self) -> &[TextureRecord] {
        self.records.as_slice()
    }

    pub fn record_buffer(&self) -> &D::Buffer {
        self.records.buffer().raw()
    }
}
