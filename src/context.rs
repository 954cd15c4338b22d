use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use winit::window::Window;

use crate::{config::RenderConfig, device::Gpu};

/// Device features the renderer cannot run without.
///
/// Bindless materials need texture arrays indexed with non-uniform values,
/// and the batched geometry draw identifies objects through
/// `first_instance`.
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::TEXTURE_BINDING_ARRAY
    .union(wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING)
    .union(wgpu::Features::PARTIALLY_BOUND_BINDING_ARRAY)
    .union(wgpu::Features::INDIRECT_FIRST_INSTANCE);

/// Output format of headless contexts.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Window, surface and device handles.
///
/// A headless context has neither window nor surface; frames are rendered
/// with [`crate::render::Renderer::render_to_view`].
pub struct Context {
    pub window: Option<Arc<Window>>,
    pub surface: Option<wgpu::Surface<'static>>,
    pub gpu: Gpu,
    pub config: wgpu::SurfaceConfiguration,
}

impl Context {
    pub async fn new(window: Arc<Window>, render_config: &RenderConfig) -> Result<Self> {
        let size = window.inner_size();

        log::debug!("wgpu setup");
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: render_config.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter found")?;
        let gpu = request_gpu(&adapter, render_config).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The lighting pass writes linear colour, so prefer an sRGB surface.
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface is not supported by the adapter")?;
        let present_mode = if surface_caps.present_modes.contains(&render_config.present_mode) {
            render_config.present_mode
        } else {
            wgpu::PresentMode::Fifo
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: render_config.surface_latency(),
        };
        surface.configure(&gpu.device, &config);
        log::debug!(
            "Surface {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            window: Some(window),
            surface: Some(surface),
            gpu,
            config,
        })
    }

    /// A context without a window, for tests and off-screen tooling.
    pub async fn headless(width: u32, height: u32, render_config: &RenderConfig) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: render_config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter found")?;
        let gpu = request_gpu(&adapter, render_config).await?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: HEADLESS_FORMAT,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: render_config.surface_latency(),
        };
        Ok(Self {
            window: None,
            surface: None,
            gpu,
            config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.gpu.device, &self.config);
        }
    }

    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

async fn request_gpu(adapter: &wgpu::Adapter, render_config: &RenderConfig) -> Result<Gpu> {
    let info = adapter.get_info();
    log::info!("Adapter {} ({:?})", info.name, info.backend);

    let missing = REQUIRED_FEATURES - adapter.features();
    if !missing.is_empty() {
        bail!("Adapter {} lacks required features {:?}", info.name, missing);
    }
    let limits = adapter.limits();
    if limits.max_binding_array_elements_per_shader_stage < render_config.max_textures {
        bail!(
            "Adapter {} supports {} bindless textures per stage, {} requested",
            info.name,
            limits.max_binding_array_elements_per_shader_stage,
            render_config.max_textures
        );
    }

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("defer-ngin device"),
            required_features: REQUIRED_FEATURES,
            required_limits: wgpu::Limits {
                max_binding_array_elements_per_shader_stage: render_config.max_textures,
                ..wgpu::Limits::default()
            },
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        })
        .await?;
    Ok(Gpu::new(device, queue))
}
