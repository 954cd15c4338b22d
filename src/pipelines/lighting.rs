use crate::data_structures::{mesh::Vertex, texture::TextureFormat};

use super::{depth_state, mk_render_pipeline, storage_entry};

/// Camera and lighting data.
pub fn mk_lighting_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lighting_frame_layout"),
        entries: &[storage_entry(0, visibility), storage_entry(1, visibility)],
    })
}

/// Full-screen pass reading the G-buffer through the texture array.
///
/// The depth attachment is bound but neither tested nor written.
pub fn mk_lighting_pipeline(
    device: &wgpu::Device,
    lighting_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    color_format: TextureFormat,
    depth_format: TextureFormat,
    source: &str,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lighting Pipeline Layout"),
        bind_group_layouts: &[lighting_layout, texture_layout],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Lighting Shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };

    mk_render_pipeline(
        device,
        "Lighting Pipeline",
        &layout,
        &[color_format.to_wgpu()],
        Some(wgpu::BlendState::REPLACE),
        Some(depth_state(
            depth_format.to_wgpu(),
            false,
            wgpu::CompareFunction::Always,
        )),
        &[Vertex::desc()],
        None,
        shader,
    )
}
