//! Per-frame records derived from the scene.
//!
//! Nothing here touches the device: the renderer writes these records into
//! its frame rings.

use bytemuck::Zeroable;

use crate::{
    data_structures::{
        light::{Lights, PointLight},
        scene::Entity,
    },
    device::GraphicsDevice,
    tables::{MaterialData, MaterialTable},
};

use super::target::RenderTarget;

pub const MAX_POINT_LIGHTS: usize = 16;

/// Per-entity record read by the geometry pass through the instance index.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectData {
    pub model: [[f32; 4]; 4],
    pub material_index: u32,
    pub _padding: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingData {
    /// Texture handles of the G-buffer albedo, normal, material and
    /// position attachments.
    pub gbuffer: [u32; 4],
    pub ambient: [f32; 3],
    pub light_count: u32,
    pub lights: [PointLight; MAX_POINT_LIGHTS],
}

/// Fill `out` with one record per entity, in entity order.
pub fn object_data<D: GraphicsDevice>(
    entities: &[Entity],
    materials: &MaterialTable<MaterialData, D>,
    out: &mut Vec<ObjectData>,
) {
    out.clear();
    out.extend(entities.iter().map(|e| ObjectData {
        model: e.transform.to_matrix().into(),
        material_index: materials.index(e.material),
        _padding: [0; 3],
    }));
}

/// Lighting record for `gbuffer`. Lights past [`MAX_POINT_LIGHTS`] are
/// dropped.
pub fn lighting_data(lights: &Lights, gbuffer: &RenderTarget) -> LightingData {
    if lights.points.len() > MAX_POINT_LIGHTS {
        log::warn!(
            "{} point lights in the scene, only the first {MAX_POINT_LIGHTS} are shaded",
            lights.points.len()
        );
    }
    let mut data = LightingData::zeroed();
    for (slot, handle) in data.gbuffer.iter_mut().zip(gbuffer.colors()) {
        *slot = handle.index();
    }
    data.ambient = lights.ambient.into();
    let count = lights.points.len().min(MAX_POINT_LIGHTS);
    data.lights[..count].copy_from_slice(&lights.points[..count]);
    data.light_count = count as u32;
    data
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use cgmath::Vector3;

    use super::*;
    use crate::{
        data_structures::{light::Color, transform::Transform},
        device::HostDevice,
        tables::{DenseIndexing, MeshView, TextureTable},
    };

    #[test]
    fn records_match_shader_layout() {
        assert_eq!(size_of::<ObjectData>(), 80);
        assert_eq!(size_of::<LightingData>(), 32 + 48 * MAX_POINT_LIGHTS);
    }

    #[test]
    fn object_data_follows_entity_order() {
        let mut materials = MaterialTable::new(HostDevice::new(), DenseIndexing::Ranked);
        let a = materials.add(MaterialData::default());
        let b = materials.add(MaterialData::default());
        let entities = vec![
            Entity::new("b", MeshView::default(), b)
                .with_transform(Transform::from_position(Vector3::new(1.0, 2.0, 3.0))),
            Entity::new("a", MeshView::default(), a),
        ];

        let mut out = Vec::new();
        object_data(&entities, &materials, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].material_index, 1);
        assert_eq!(out[1].material_index, 0);
        assert_eq!(out[0].model[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn lighting_data_caps_point_lights() {
        let mut textures = TextureTable::new(HostDevice::new());
        let gbuffer = RenderTarget::gbuffer(&mut textures, 4, 4);
        let lights = Lights {
            ambient: Color::new(0.1, 0.2, 0.3),
            points: vec![PointLight::new(Vector3::new(0.0, 1.0, 0.0), Color::WHITE); 20],
        };

        let data = lighting_data(&lights, &gbuffer);
        assert_eq!(data.light_count as usize, MAX_POINT_LIGHTS);
        assert_eq!(data.gbuffer, [0, 1, 2, 3]);
        assert_eq!(data.ambient, [0.1, 0.2, 0.3]);
    }
}
