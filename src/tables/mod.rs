//! Resource tables.
//!
//! Each table owns the CPU-side records of one resource kind and mirrors
//! them into device memory. Consumers hold small handles ([`MeshView`],
//! [`MaterialKey`], [`TextureHandle`]); shaders index the mirrors with
//! dense integers.

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::{DenseIndexing, MaterialData, MaterialKey, MaterialTable};
pub use mesh::{MeshTable, MeshView};
pub use texture::{TextureHandle, TextureRecord, TextureTable};

use crate::device::GraphicsDevice;

/// The three tables an application populates and the renderer reads.
pub struct ResourceTables<D: GraphicsDevice> {
    pub meshes: MeshTable<D>,
    pub materials: MaterialTable<MaterialData, D>,
    pub textures: TextureTable<D>,
}

impl<D: GraphicsDevice> ResourceTables<D> {
    pub fn new(device: D, indexing: DenseIndexing) -> Self {
        Self {
            meshes: MeshTable::new(device.clone()),
            materials: MaterialTable::new(device.clone(), indexing),
            textures: TextureTable::new(device),
        }
    }
}
