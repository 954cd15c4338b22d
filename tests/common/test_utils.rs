use defer_ngin::{
    data_structures::{mesh::MeshData, scene::Entity},
    device::{HostBuffer, HostDevice},
    tables::{DenseIndexing, MaterialData, MeshView, ResourceTables},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn host_tables(indexing: DenseIndexing) -> (HostDevice, ResourceTables<HostDevice>) {
    init_logger();
    let device = HostDevice::new();
    let tables = ResourceTables::new(device.clone(), indexing);
    (device, tables)
}

/// Load `count` triangles and give each its own material.
pub fn triangle_entities(tables: &mut ResourceTables<HostDevice>, count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let view = tables.meshes.load(&MeshData::triangle());
            let material = tables.materials.add(MaterialData::new(i as u32, 0, 0));
            Entity::new(format!("triangle{i}"), view, material)
        })
        .collect()
}

/// Decode `count` little endian u32 values starting at byte `offset`.
pub fn read_u32s(buffer: &HostBuffer, offset: u64, count: usize) -> Vec<u32> {
    let start = offset as usize;
    buffer.contents()[start..start + count * 4]
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

pub fn view(index_offset: u32, index_count: u32, vertex_offset: u32, vertex_count: u32) -> MeshView {
    MeshView {
        index_offset,
        index_count,
        vertex_offset,
        vertex_count,
    }
}
