//! Two triangles, two materials, one frame of commands, then a removal.

use cgmath::{Point3, Vector3};
use defer_ngin::{
    commands::IndirectCommandBuilder,
    data_structures::{
        camera::Camera,
        mesh::MeshData,
        scene::{Entity, Scene},
        transform::Transform,
    },
    render::{ObjectData, object_data},
    tables::{DenseIndexing, MaterialData},
};

use crate::common::test_utils::{host_tables, view};
mod common;

#[test]
fn two_triangles_end_to_end() {
    let (device, mut tables) = host_tables(DenseIndexing::Ranked);

    let first = tables.meshes.load(&MeshData::triangle());
    let second = tables.meshes.load(&MeshData::triangle());
    assert_eq!(first, view(0, 3, 0, 3));
    assert_eq!(second, view(3, 3, 3, 3));

    let red = tables.materials.add(MaterialData::new(0, 0, 0));
    let blue = tables.materials.add(MaterialData::new(1, 0, 0));
    assert_eq!((red.id(), blue.id()), (0, 1));
    assert_eq!(tables.materials.index(red), 0);
    assert_eq!(tables.materials.index(blue), 1);

    let mut scene = Scene::new(Camera::perspective(
        Point3::new(0.0, 0.0, 3.0),
        cgmath::Deg(45.0),
        800.0,
        600.0,
        0.1,
        100.0,
    ));
    scene.entities.push(Entity::new("left", first, red));
    scene.entities.push(
        Entity::new("right", second, blue)
            .with_transform(Transform::from_position(Vector3::new(1.0, 0.0, 0.0))),
    );

    let mut commands = IndirectCommandBuilder::new(device, 3, "geometry_commands");
    assert_eq!(commands.build(&scene.entities), 2);
    let built = commands.commands();
    assert_eq!((built[0].index_count, built[1].index_count), (3, 3));
    assert_eq!((built[0].first_index, built[1].first_index), (0, 3));
    commands.advance();

    let mut objects: Vec<ObjectData> = Vec::new();
    object_data(&scene.entities, &tables.materials, &mut objects);
    assert_eq!(objects[1].material_index, 1);
    assert_eq!(objects[1].model[3], [1.0, 0.0, 0.0, 1.0]);

    tables.materials.remove(red);
    assert_eq!(tables.materials.index(blue), 0);
}
