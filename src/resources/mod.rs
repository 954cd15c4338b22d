//! Loading external files.
//!
//! The renderer core only consumes decoded data ([`TextureData`],
//! [`crate::data_structures::mesh::MeshData`], WGSL sources). Where the
//! bytes come from is up to a [`ResourceLoader`]: files under `./assets`
//! by default, or an in-memory map for embedded assets and tests.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::*;

use crate::{
    data_structures::texture::TextureData,
    device::GraphicsDevice,
    tables::{TextureHandle, TextureTable},
};

/// Source of raw bytes by logical path.
pub trait ResourceLoader {
    fn load_binary(&self, file_name: &str) -> Result<Vec<u8>>;

    fn load_string(&self, file_name: &str) -> Result<String> {
        let bytes = self.load_binary(file_name)?;
        String::from_utf8(bytes).with_context(|| format!("{file_name} is not valid UTF-8"))
    }
}

/// Loads files relative to a root directory.
#[derive(Clone, Debug)]
pub struct FileResourceLoader {
    root: PathBuf,
}

impl FileResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FileResourceLoader {
    fn default() -> Self {
        Self::new(Path::new("./").join("assets"))
    }
}

impl ResourceLoader for FileResourceLoader {
    fn load_binary(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(file_name);
        std::fs::read(&path).with_context(|| format!("Cannot read {}", path.display()))
    }

    fn load_string(&self, file_name: &str) -> Result<String> {
        let path = self.root.join(file_name);
        std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))
    }
}

/// Serves bytes registered up front.
#[derive(Clone, Debug, Default)]
pub struct MemoryResourceLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(file_name.into(), bytes.into());
    }

    pub fn with(mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(file_name, bytes);
        self
    }
}

impl ResourceLoader for MemoryResourceLoader {
    fn load_binary(&self, file_name: &str) -> Result<Vec<u8>> {
        self.files
            .get(file_name)
            .cloned()
            .with_context(|| format!("No embedded resource named {file_name}"))
    }
}

/// Load and decode an image file.
///
/// The file extension is used as the format hint when there is one.
pub fn load_texture(loader: &impl ResourceLoader, file_name: &str) -> Result<TextureData> {
    let bytes = loader.load_binary(file_name)?;
    let hint = Path::new(file_name).extension().and_then(|ext| ext.to_str());
    TextureData::from_bytes(&bytes, hint).with_context(|| format!("Cannot decode {file_name}"))
}

/// Load an image file straight into the texture table.
pub fn load_texture_into<D: GraphicsDevice>(
    loader: &impl ResourceLoader,
    textures: &mut TextureTable<D>,
    file_name: &str,
) -> Result<TextureHandle> {
    let data = load_texture(loader, file_name)?;
    Ok(textures.create(&data, file_name))
}

/// WGSL sources of the three passes.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub geometry: String,
    pub lighting: String,
    pub present: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            geometry: include_str!("../pipelines/geometry.wgsl").to_string(),
            lighting: include_str!("../pipelines/lighting.wgsl").to_string(),
            present: include_str!("../pipelines/present.wgsl").to_string(),
        }
    }
}

impl ShaderSources {
    /// Load `geometry.wgsl`, `lighting.wgsl` and `present.wgsl` through
    /// `loader`.
    pub fn load(loader: &impl ResourceLoader) -> Result<Self> {
        Ok(Self {
            geometry: loader.load_string("geometry.wgsl")?,
            lighting: loader.load_string("lighting.wgsl")?,
            present: loader.load_string("present.wgsl")?,
        })
    }
}
