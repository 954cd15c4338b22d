#![cfg(feature = "integration-tests")]

use cgmath::{Point3, Vector3};
use defer_ngin::{
    commands::DrawIndexedIndirect,
    config::RenderConfig,
    context::{Context, HEADLESS_FORMAT},
    data_structures::{
        camera::Camera,
        light::{Color, PointLight},
        mesh::MeshData,
        scene::{Entity, Scene},
        texture::TextureData,
    },
    device::Gpu,
    render::Renderer,
    tables::{MaterialData, ResourceTables},
};

use crate::common::test_utils::init_logger;
mod common;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;

fn output_texture(gpu: &Gpu) -> wgpu::Texture {
    gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Output Texture"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HEADLESS_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

#[test]
fn renders_frames_headless() {
    init_logger();
    let config = RenderConfig::default().with_max_textures(64);
    let ctx = futures::executor::block_on(Context::headless(WIDTH, HEIGHT, &config))
        .expect("headless context");
    let mut tables = ResourceTables::new(ctx.gpu.clone(), config.material_indexing);

    let white = tables.textures.create(&TextureData::solid([255; 4]), "white");
    let material = tables
        .materials
        .add(MaterialData::new(white.index(), white.index(), white.index()));
    let cube = tables.meshes.load(&MeshData::cube());

    let mut scene = Scene::new(Camera::perspective(
        Point3::new(0.0, 0.0, 3.0),
        cgmath::Deg(45.0),
        WIDTH as f32,
        HEIGHT as f32,
        0.1,
        100.0,
    ));
    scene.entities.push(Entity::new("cube", cube, material));
    scene
        .lights
        .points
        .push(PointLight::new(Vector3::new(1.0, 2.0, 3.0), Color::WHITE));

    let mut renderer = Renderer::new(&ctx, &mut tables, config.clone(), None);
    let output = output_texture(&ctx.gpu);
    let view = output.create_view(&wgpu::TextureViewDescriptor::default());

    renderer.render_to_view(&view, &mut scene, &mut tables);
    renderer.render_to_view(&view, &mut scene, &mut tables);
    assert_eq!(renderer.frame_index(), 2);

    // The first frame wrote slot 0 of the geometry command ring.
    let commands = futures::executor::block_on(
        ctx.gpu.read_back(renderer.geometry_commands().ring().raw()),
    )
    .expect("read back geometry commands");
    let first: DrawIndexedIndirect =
        bytemuck::pod_read_unaligned(&commands[..DrawIndexedIndirect::SIZE as usize]);
    assert_eq!(first.index_count, 36);
    assert_eq!(first.first_index, cube.index_offset);
    assert_eq!(first.first_instance, 0);
}
