use super::mk_render_pipeline;

pub fn mk_present_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("present_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Blit of the lighting target into `output_format`. Draws a single
/// full-screen triangle without vertex buffers.
pub fn mk_present_pipeline(
    device: &wgpu::Device,
    present_layout: &wgpu::BindGroupLayout,
    output_format: wgpu::TextureFormat,
    source: &str,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Present Pipeline Layout"),
        bind_group_layouts: &[present_layout],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Present Shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };

    mk_render_pipeline(
        device,
        "Present Pipeline",
        &layout,
        &[output_format],
        Some(wgpu::BlendState::REPLACE),
        None,
        &[],
        None,
        shader,
    )
}
