//! Application shell and event loop.
//!
//! [`run`] opens a window, sets up the device and drives an
//! [`Application`] through winit. Window events go into a bounded
//! [`EventQueue`] owned by the loop; the application drains it once per
//! frame from [`Application::update`], right before the renderer draws.
//!
//! # Lifecycle
//!
//! 1. `init` once the window exists: load meshes, materials and textures
//!    into the tables and return the initial [`Scene`]
//! 2. `post_render_hook` once, to inject an optional per-frame hook
//! 3. every frame: `update` with the pending events and the frame time,
//!    then geometry, lighting and present passes

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::RenderConfig,
    context::Context,
    data_structures::scene::Scene,
    device::Gpu,
    events::EventQueue,
    render::{PostRender, Renderer},
    tables::ResourceTables,
};

pub trait Application: 'static {
    /// Populate the resource tables and build the initial scene.
    fn init(&mut self, ctx: &Context, tables: &mut ResourceTables<Gpu>) -> anyhow::Result<Scene>;

    /// Called every frame before rendering.
    ///
    /// `events` holds every window event since the previous frame, oldest
    /// first.
    fn update(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        tables: &mut ResourceTables<Gpu>,
        events: &mut EventQueue<WindowEvent>,
        dt: Duration,
    );

    /// Hook run after the present pass of every frame.
    fn post_render_hook(&mut self) -> Option<Box<dyn PostRender>> {
        None
    }
}

/// Everything that only exists once the window is up.
struct AppState {
    ctx: Context,
    tables: ResourceTables<Gpu>,
    scene: Scene,
    renderer: Renderer,
}

impl AppState {
    fn new<A: Application>(window: Arc<Window>, app: &mut A, config: &RenderConfig) -> Self {
        let ctx = match futures::executor::block_on(Context::new(window, config)) {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        let mut tables = ResourceTables::new(ctx.gpu.clone(), config.material_indexing);
        let scene = match app.init(&ctx, &mut tables) {
            Ok(scene) => scene,
            Err(e) => panic!("App initialization failed. Cannot build the scene: {}", e),
        };
        let renderer = Renderer::new(&ctx, &mut tables, config.clone(), app.post_render_hook());
        Self {
            ctx,
            tables,
            scene,
            renderer,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.renderer.resize(width, height, &mut self.tables);
            self.scene.camera.resize(width as f32, height as f32);
        }
    }
}

struct App<A: Application> {
    app: A,
    config: RenderConfig,
    state: Option<AppState>,
    events: EventQueue<WindowEvent>,
    last_time: Instant,
}

impl<A: Application> App<A> {
    fn new(app: A, config: RenderConfig) -> Self {
        Self {
            app,
            events: EventQueue::new(config.event_queue_capacity),
            config,
            state: None,
            last_time: Instant::now(),
        }
    }
}

impl<A: Application> ApplicationHandler for App<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes().with_title("defer-ngin");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => panic!("App initialization failed. Cannot open a window: {}", e),
        };
        let state = AppState::new(window, &mut self.app, &self.config);
        state.ctx.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
                self.events.push(event);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                self.app.update(
                    &state.ctx,
                    &mut state.scene,
                    &mut state.tables,
                    &mut self.events,
                    dt,
                );
                match state
                    .renderer
                    .render(&state.ctx, &mut state.scene, &mut state.tables)
                {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(window) = &state.ctx.window {
                            let size = window.inner_size();
                            state.resize(size.width, size.height);
                        }
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                state.ctx.request_redraw();
            }
            event => self.events.push(event),
        }
    }
}

/// Open a window and run `app` until the window is closed.
pub fn run<A: Application>(app: A, config: RenderConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };
    config.validate();

    let event_loop = EventLoop::new()?;
    let mut app = App::new(app, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
