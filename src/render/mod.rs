//! The deferred frame.
//!
//! Every frame runs three passes over the same resource tables:
//!
//! 1. geometry: all entities into the G-buffer with one batched indirect draw
//! 2. lighting: a full-screen quad shading the G-buffer into the lighting
//!    target
//! 3. present: a blit of the lighting colour into the output view
//!
//! Per-frame data (camera, objects, lights, draw commands) lives in frame
//! rings. All rings advance exactly once, after the frame's commands were
//! recorded.

use std::{mem::size_of, num::NonZeroU64};

use crate::{
    buffers::FrameRing,
    commands::IndirectCommandBuilder,
    config::RenderConfig,
    context::Context,
    data_structures::{
        camera::CameraData,
        mesh::MeshData,
        scene::{Entity, Scene},
        texture::TextureData,
    },
    device::{BufferRole, DeviceTexture, Gpu, GpuTexture, GraphicsDevice},
    pipelines::{
        geometry::{mk_frame_layout, mk_geometry_pipeline},
        lighting::{mk_lighting_layout, mk_lighting_pipeline},
        mk_texture_layout,
        present::{mk_present_layout, mk_present_pipeline},
    },
    resources::ShaderSources,
    tables::{MaterialKey, ResourceTables, TextureHandle},
};

pub mod frame_data;
pub mod hook;
pub mod target;

pub use frame_data::{LightingData, MAX_POINT_LIGHTS, ObjectData, lighting_data, object_data};
pub use hook::{FrameInfo, FrameStats, PostRender};
pub use target::{DEPTH_FORMAT, GBUFFER_FORMATS, LIGHTING_FORMAT, MAX_COLOR_ATTACHMENTS, RenderTarget};

pub struct Renderer {
    gpu: Gpu,
    config: RenderConfig,
    output_format: wgpu::TextureFormat,

    gbuffer: RenderTarget,
    lighting_target: RenderTarget,

    frame_layout: wgpu::BindGroupLayout,
    lighting_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    present_layout: wgpu::BindGroupLayout,
    geometry_pipeline: wgpu::RenderPipeline,
    lighting_pipeline: wgpu::RenderPipeline,
    present_pipeline: wgpu::RenderPipeline,

    // Bound in place of textures a pass must not sample.
    placeholder: GpuTexture,
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,

    camera_ring: FrameRing<Gpu>,
    lighting_ring: FrameRing<Gpu>,
    object_ring: FrameRing<Gpu>,
    geometry_commands: IndirectCommandBuilder<Gpu>,
    lighting_commands: IndirectCommandBuilder<Gpu>,

    screen_quad: Entity,
    objects: Vec<ObjectData>,
    post_render: Option<Box<dyn PostRender>>,
    frame_index: u64,
}

impl Renderer {
    pub fn new(
        ctx: &Context,
        tables: &mut ResourceTables<Gpu>,
        config: RenderConfig,
        post_render: Option<Box<dyn PostRender>>,
    ) -> Self {
        Self::with_shaders(ctx, tables, config, &ShaderSources::default(), post_render)
    }

    pub fn with_shaders(
        ctx: &Context,
        tables: &mut ResourceTables<Gpu>,
        config: RenderConfig,
        shaders: &ShaderSources,
        post_render: Option<Box<dyn PostRender>>,
    ) -> Self {
        config.validate();
        let gpu = ctx.gpu.clone();
        let device = &gpu.device;
        let output_format = ctx.config.format;
        let (width, height) = (ctx.config.width.max(1), ctx.config.height.max(1));

        let frame_layout = mk_frame_layout(device);
        let lighting_layout = mk_lighting_layout(device);
        let texture_layout = mk_texture_layout(device, config.max_textures);
        let present_layout = mk_present_layout(device);

        let geometry_pipeline = mk_geometry_pipeline(
            device,
            &frame_layout,
            &texture_layout,
            &GBUFFER_FORMATS,
            DEPTH_FORMAT,
            &shaders.geometry,
        );
        let lighting_pipeline = mk_lighting_pipeline(
            device,
            &lighting_layout,
            &texture_layout,
            LIGHTING_FORMAT,
            DEPTH_FORMAT,
            &shaders.lighting,
        );
        let present_pipeline =
            mk_present_pipeline(device, &present_layout, output_format, &shaders.present);

        let placeholder = gpu.create_texture(&TextureData::solid([0, 0, 0, 255]), "placeholder");
        let nearest = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nearest_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let linear = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("present_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let frames = config.frames_in_flight;
        let camera_ring = FrameRing::new(
            gpu.clone(),
            size_of::<CameraData>() as u64,
            frames,
            BufferRole::Storage,
            "camera_data",
        );
        let lighting_ring = FrameRing::new(
            gpu.clone(),
            size_of::<LightingData>() as u64,
            frames,
            BufferRole::Storage,
            "lighting_data",
        );
        let object_ring = FrameRing::new(
            gpu.clone(),
            size_of::<ObjectData>() as u64,
            frames,
            BufferRole::Storage,
            "object_data",
        );
        let geometry_commands = IndirectCommandBuilder::new(gpu.clone(), frames, "geometry_commands");
        let lighting_commands = IndirectCommandBuilder::new(gpu.clone(), frames, "lighting_commands");

        let quad = tables.meshes.load(&MeshData::screen_quad());
        let screen_quad = Entity::new("screen_quad", quad, MaterialKey::unassigned());

        let gbuffer = RenderTarget::gbuffer(&mut tables.textures, width, height);
        let lighting_target = RenderTarget::lighting(&mut tables.textures, width, height);

        log::info!(
            "Deferred renderer ready: {width}x{height}, {frames} frames in flight, {} bindless textures",
            config.max_textures
        );

        Self {
            gpu,
            config,
            output_format,
            gbuffer,
            lighting_target,
            frame_layout,
            lighting_layout,
            texture_layout,
            present_layout,
            geometry_pipeline,
            lighting_pipeline,
            present_pipeline,
            placeholder,
            nearest,
            linear,
            camera_ring,
            lighting_ring,
            object_ring,
            geometry_commands,
            lighting_commands,
            screen_quad,
            objects: Vec::new(),
            post_render,
            frame_index: 0,
        }
    }

    /// Render one frame into the window surface and present it.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        tables: &mut ResourceTables<Gpu>,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(surface) = ctx.surface.as_ref() else {
            crate::fatal::die(format_args!(
                "render called on a headless context, use render_to_view"
            ));
        };
        let output = surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&view, scene, tables);
        output.present();
        Ok(())
    }

    /// Record and submit one frame whose present pass writes into `view`.
    ///
    /// `view` must have the output format the renderer was built for.
    pub fn render_to_view(
        &mut self,
        view: &wgpu::TextureView,
        scene: &mut Scene,
        tables: &mut ResourceTables<Gpu>,
    ) {
        // Uploads first: any of them may grow a buffer, and bind groups must
        // see the final allocations.
        self.camera_ring
            .write(bytemuck::bytes_of(&scene.camera.data()), 0);

        object_data(&scene.entities, &tables.materials, &mut self.objects);
        let object_bytes: &[u8] = bytemuck::cast_slice(&self.objects);
        self.object_ring.reserve_slot(object_bytes.len() as u64);
        self.object_ring.write(object_bytes, 0);

        tables.materials.sync();
        let draw_count = self.geometry_commands.build(&scene.entities);

        let lights = lighting_data(&scene.lights, &self.gbuffer);
        self.lighting_ring.write(bytemuck::bytes_of(&lights), 0);
        self.lighting_commands.build_single(&self.screen_quad);

        let device = &self.gpu.device;
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geometry_frame_bind_group"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ring_binding(&self.camera_ring),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ring_binding(&self.object_ring),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: tables.materials.buffer().buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: tables.textures.record_buffer().buffer.as_entire_binding(),
                },
            ],
        });
        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting_frame_bind_group"),
            layout: &self.lighting_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ring_binding(&self.camera_ring),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ring_binding(&self.lighting_ring),
                },
            ],
        });
        let geometry_textures = self.texture_bind_group(tables, &self.gbuffer);
        let lighting_textures = self.texture_bind_group(tables, &self.lighting_target);
        let present_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_bind_group"),
            layout: &self.present_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        &tables.textures.get(self.lighting_target.color(0)).view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.linear),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let textures = &tables.textures;
            // Only albedo takes the clear colour. A zero position alpha marks
            // texels the lighting pass leaves unshaded.
            let color_attachments: Vec<_> = self
                .gbuffer
                .colors()
                .enumerate()
                .map(|(i, handle)| {
                    let clear = if i == 0 {
                        self.config.clear_colour
                    } else {
                        wgpu::Color::TRANSPARENT
                    };
                    Some(wgpu::RenderPassColorAttachment {
                        view: &textures.get(handle).view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })
                })
                .collect();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Geometry Pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(depth_attachment(
                    &textures.get(self.gbuffer.depth()).view,
                )),
                ..Default::default()
            });
            if draw_count > 0 {
                pass.set_pipeline(&self.geometry_pipeline);
                pass.set_bind_group(0, &frame_bind_group, &[]);
                pass.set_bind_group(1, &geometry_textures, &[]);
                pass.set_vertex_buffer(0, tables.meshes.vertex_buffer().buffer.slice(..));
                pass.set_index_buffer(
                    tables.meshes.index_buffer().buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.multi_draw_indexed_indirect(
                    &self.geometry_commands.ring().raw().buffer,
                    self.geometry_commands.offset_bytes(),
                    draw_count,
                );
            }
        }

        {
            let textures = &tables.textures;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lighting Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &textures.get(self.lighting_target.color(0)).view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(depth_attachment(
                    &textures.get(self.lighting_target.depth()).view,
                )),
                ..Default::default()
            });
            pass.set_pipeline(&self.lighting_pipeline);
            pass.set_bind_group(0, &lighting_bind_group, &[]);
            pass.set_bind_group(1, &lighting_textures, &[]);
            pass.set_vertex_buffer(0, tables.meshes.vertex_buffer().buffer.slice(..));
            pass.set_index_buffer(
                tables.meshes.index_buffer().buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed_indirect(
                &self.lighting_commands.ring().raw().buffer,
                self.lighting_commands.offset_bytes(),
            );
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.present_pipeline);
            pass.set_bind_group(0, &present_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        if let Some(hook) = self.post_render.as_mut() {
            hook.post_render(
                FrameInfo {
                    device: &self.gpu.device,
                    queue: &self.gpu.queue,
                    encoder: &mut encoder,
                    view,
                    frame_index: self.frame_index,
                    width: self.gbuffer.width(),
                    height: self.gbuffer.height(),
                },
                scene,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        self.camera_ring.advance();
        self.lighting_ring.advance();
        self.object_ring.advance();
        self.geometry_commands.advance();
        self.lighting_commands.advance();
        self.frame_index += 1;
    }

    /// Rebuild both targets at the new size behind their existing handles.
    ///
    /// The texture table does not grow, so any number of resizes stays
    /// within `max_textures`.
    pub fn resize(&mut self, width: u32, height: u32, tables: &mut ResourceTables<Gpu>) {
        if self.gbuffer.resize(&mut tables.textures, width, height) {
            log::debug!("Resized render targets to {width}x{height}");
        }
        self.lighting_target.resize(&mut tables.textures, width, height);
    }

    /// Texture array for a pass rendering into `target`.
    ///
    /// The target's own attachments and textures the array cannot hold are
    /// replaced by the placeholder, so array element `n` is always handle
    /// `n` or the placeholder.
    fn texture_bind_group(
        &self,
        tables: &ResourceTables<Gpu>,
        target: &RenderTarget,
    ) -> wgpu::BindGroup {
        let textures = tables.textures.textures();
        crate::require!(
            textures.len() <= self.config.max_textures as usize,
            "{} textures exceed the bindless array of {}",
            textures.len(),
            self.config.max_textures
        );
        let views: Vec<&wgpu::TextureView> = textures
            .iter()
            .enumerate()
            .map(|(n, texture)| {
                let own = target.contains(TextureHandle::from_index(n as u32));
                if own || !texture.format().is_sampleable() {
                    &self.placeholder.view
                } else {
                    &texture.view
                }
            })
            .collect();

        self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}_textures", target.label())),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureViewArray(&views),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.nearest),
                },
            ],
        })
    }

    pub fn gbuffer(&self) -> &RenderTarget {
        &self.gbuffer
    }

    pub fn lighting_target(&self) -> &RenderTarget {
        &self.lighting_target
    }

    pub fn geometry_commands(&self) -> &IndirectCommandBuilder<Gpu> {
        &self.geometry_commands
    }

    pub fn lighting_commands(&self) -> &IndirectCommandBuilder<Gpu> {
        &self.lighting_commands
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of frames submitted so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// The current slot of `ring` as a storage binding.
fn ring_binding(ring: &FrameRing<Gpu>) -> wgpu::BindingResource<'_> {
    wgpu::BindingResource::Buffer(wgpu::BufferBinding {
        buffer: &ring.raw().buffer,
        offset: ring.offset_bytes(),
        size: NonZeroU64::new(ring.slot_size()),
    })
}

fn depth_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}
