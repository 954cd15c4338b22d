//! Scene description consumed by the renderer.

use crate::{
    data_structures::{camera::Camera, light::Lights, transform::Transform},
    tables::{material::MaterialKey, mesh::MeshView},
};

/// Something that gets drawn: a slice of the mesh arena, where to put it
/// and which material to shade it with.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub name: String,
    pub mesh: MeshView,
    pub transform: Transform,
    pub material: MaterialKey,
}

impl Entity {
    pub fn new(name: impl Into<String>, mesh: MeshView, material: MaterialKey) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Transform::new(),
            material,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub entities: Vec<Entity>,
    pub camera: Camera,
    pub lights: Lights,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            entities: Vec::new(),
            camera,
            lights: Lights::default(),
        }
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }
}
