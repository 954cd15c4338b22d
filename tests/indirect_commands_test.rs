use defer_ngin::{
    commands::{DrawIndexedIndirect, IndirectCommandBuilder},
    data_structures::{mesh::MeshData, scene::Entity},
    device::HostDevice,
    tables::DenseIndexing,
};

use crate::common::test_utils::{host_tables, read_u32s, triangle_entities};
mod common;

#[test]
fn one_command_per_entity_in_order() {
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    let mut entities = triangle_entities(&mut tables, 3);
    let cube = tables.meshes.load(&MeshData::cube());
    let material = tables.materials.add(Default::default());
    entities.push(Entity::new("cube", cube, material));

    let mut builder = IndirectCommandBuilder::new(device, 3, "geometry_commands");
    let count = builder.build(&entities);
    assert_eq!(count as usize, entities.len());

    for (n, (command, entity)) in builder.commands().iter().zip(&entities).enumerate() {
        assert_eq!(command.first_index, entity.mesh.index_offset);
        assert_eq!(command.index_count, entity.mesh.index_count);
        assert_eq!(command.base_vertex, entity.mesh.vertex_offset as i32);
        assert_eq!(command.instance_count, 1);
        assert_eq!(command.first_instance, n as u32);
    }

    // The device copy of the last command.
    let raw = read_u32s(builder.ring().raw(), 3 * DrawIndexedIndirect::SIZE, 5);
    assert_eq!(raw, vec![36, 1, 9, 9, 3]);
}

#[test]
fn every_frame_writes_a_fresh_slot() {
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    let entities = triangle_entities(&mut tables, 2);
    let mut builder = IndirectCommandBuilder::new(device, 3, "geometry_commands");

    let mut offsets = Vec::new();
    for _ in 0..4 {
        builder.build(&entities);
        offsets.push(builder.offset_bytes());
        builder.advance();
    }
    let slot = builder.ring().slot_size();
    assert_eq!(offsets, vec![0, slot, 2 * slot, 0]);
}

#[test]
fn slots_grow_with_the_entity_count() {
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    let entities = triangle_entities(&mut tables, 10);
    let mut builder = IndirectCommandBuilder::new(device.clone(), 3, "geometry_commands");
    assert_eq!(builder.ring().slot_size(), DrawIndexedIndirect::SIZE);

    let drains = device.stats().drains;
    builder.build(&entities);
    assert!(builder.ring().slot_size() >= 10 * DrawIndexedIndirect::SIZE);
    assert_eq!(device.stats().drains, drains + 1);
}

#[test]
fn single_draws_start_at_instance_zero() {
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    let quad = tables.meshes.load(&MeshData::screen_quad());
    let material = tables.materials.add(Default::default());
    let mut builder = IndirectCommandBuilder::new(device, 3, "lighting_commands");

    assert_eq!(builder.build_single(&Entity::new("quad", quad, material)), 1);
    assert_eq!(
        builder.commands(),
        &[DrawIndexedIndirect {
            index_count: 6,
            instance_count: 1,
            first_index: 0,
            base_vertex: 0,
            first_instance: 0,
        }]
    );
}

#[test]
fn empty_scenes_build_no_commands() {
    let (device, _) = host_tables(DenseIndexing::Stable);
    let mut builder: IndirectCommandBuilder<HostDevice> =
        IndirectCommandBuilder::new(device, 3, "geometry_commands");
    assert_eq!(builder.build(&[]), 0);
    builder.advance();
}

#[test]
#[should_panic(expected = "built twice without advancing")]
fn building_twice_per_frame_is_fatal() {
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    let entities = triangle_entities(&mut tables, 1);
    let mut builder = IndirectCommandBuilder::new(device, 3, "geometry_commands");
    builder.build(&entities);
    builder.build(&entities);
}
