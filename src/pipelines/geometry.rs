use crate::data_structures::{mesh::Vertex, texture::TextureFormat};

use super::{depth_state, mk_render_pipeline, storage_entry};

/// Camera, objects, materials and texture records.
pub fn mk_frame_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("geometry_frame_layout"),
        entries: &[
            storage_entry(0, visibility),
            storage_entry(1, visibility),
            storage_entry(2, visibility),
            storage_entry(3, visibility),
        ],
    })
}

pub fn mk_geometry_pipeline(
    device: &wgpu::Device,
    frame_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    color_formats: &[TextureFormat],
    depth_format: TextureFormat,
    source: &str,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Geometry Pipeline Layout"),
        bind_group_layouts: &[frame_layout, texture_layout],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Geometry Shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };
    let formats: Vec<_> = color_formats.iter().map(|f| f.to_wgpu()).collect();

    mk_render_pipeline(
        device,
        "Geometry Pipeline",
        &layout,
        &formats,
        None,
        Some(depth_state(
            depth_format.to_wgpu(),
            true,
            wgpu::CompareFunction::Less,
        )),
        &[Vertex::desc()],
        Some(wgpu::Face::Back),
        shader,
    )
}
