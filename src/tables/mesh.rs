use crate::{
    buffers::MirroredBuffer,
    data_structures::mesh::{MeshData, Vertex},
    device::{BufferRole, GraphicsDevice},
};

/// A mesh's slice of the shared vertex and index arenas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MeshView {
    pub index_offset: u32,
    pub index_count: u32,
    pub vertex_offset: u32,
    pub vertex_count: u32,
}

/// Append-only vertex and index arenas shared by every mesh.
///
/// Meshes are never removed; the arenas live as long as the table.
pub struct MeshTable<D: GraphicsDevice> {
    vertices: MirroredBuffer<Vertex, D>,
    indices: MirroredBuffer<u32, D>,
}

impl<D: GraphicsDevice> MeshTable<D> {
    pub fn new(device: D) -> Self {
        Self {
            vertices: MirroredBuffer::new(device.clone(), BufferRole::Vertex, "vertex_mesh_data"),
            indices: MirroredBuffer::new(device, BufferRole::Index, "index_mesh_data"),
        }
    }

    /// Append a mesh's streams. The returned offsets are the arena sizes
    /// right before the call.
    pub fn load(&mut self, mesh: &MeshData) -> MeshView {
        let vertices = self.vertices.append(&mesh.vertices);
        let indices = self.indices.append(&mesh.indices);
        let view = MeshView {
            index_offset: indices.start as u32,
            index_count: indices.len() as u32,
            vertex_offset: vertices.start as u32,
            vertex_count: vertices.len() as u32,
        };
        log::debug!("Loaded {mesh} as {view:?}");
        view
    }

    pub fn vertices(&self, view: MeshView) -> &[Vertex] {
        let start = view.vertex_offset as usize;
        &self.vertices.as_slice()[start..start + view.vertex_count as usize]
    }

    pub fn indices(&self, view: MeshView) -> &[u32] {
        let start = view.index_offset as usize;
        &self.indices.as_slice()[start..start + view.index_count as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_buffer(&self) -> &D::Buffer {
        self.vertices.buffer().raw()
    }

    pub fn index_buffer(&self) -> &D::Buffer {
        self.indices.buffer().raw()
    }

    pub fn vertex_arena(&self) -> &MirroredBuffer<Vertex, D> {
        &self.vertices
    }

    pub fn index_arena(&self) -> &MirroredBuffer<u32, D> {
        &self.indices
    }
}

impl<D: GraphicsDevice> std::fmt::Display for MeshTable<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh table: vertex count {}, index count {}",
            self.vertex_count(),
            self.index_count()
        )
    }
}
