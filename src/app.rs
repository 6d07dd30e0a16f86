//! Application event loop.
//!
//! The app owns the window, the GPU [`Context`] and the [`Scene`]. Setup runs
//! once when winit resumes the app; afterwards every redraw ticks the clock,
//! spins the rotating objects, eases the camera and draws a frame.
//!
//! # Assets
//!
//! Face textures, the OBJ model and the panorama are loaded in the background
//! (tokio on native, `spawn_local` on the web). The futures only produce CPU
//! data and hand it back to the event loop as a [`SceneEvent::Asset`], where
//! it is uploaded and put into the scene. A failed load is logged and the
//! scene carries on without it.

use std::{fmt::Debug, future::Future, iter, sync::Arc};

use anyhow::Context as _;
use image::DynamicImage;
use rand::{SeedableRng, rngs::SmallRng};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    clock::FrameClock,
    config::SceneConfig,
    context::Context,
    data_structures::{
        scene::{Scene, SceneBlueprint},
        texture::Texture,
    },
    pipelines::skybox::Skybox,
    resources::{self, LoadedModel},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub(crate) enum AssetEvent {
    FaceTexture {
        face: usize,
        name: String,
        result: anyhow::Result<DynamicImage>,
    },
    Model {
        name: String,
        result: anyhow::Result<LoadedModel>,
    },
    Panorama {
        name: String,
        result: anyhow::Result<DynamicImage>,
    },
}

pub(crate) enum SceneEvent {
    #[allow(dead_code)]
    Initialized(anyhow::Result<AppState>),
    Asset(AssetEvent),
}

impl Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(Ok(_)) => f.write_str("Initialized(Ok)"),
            Self::Initialized(Err(e)) => f.debug_tuple("Initialized").field(e).finish(),
            Self::Asset(AssetEvent::FaceTexture { face, name, .. }) => {
                f.debug_struct("FaceTexture").field("face", face).field("name", name).finish()
            }
            Self::Asset(AssetEvent::Model { name, .. }) => f.debug_struct("Model").field("name", name).finish(),
            Self::Asset(AssetEvent::Panorama { name, .. }) => {
                f.debug_struct("Panorama").field("name", name).finish()
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct AppState {
    pub(crate) ctx: Context,
    pub(crate) scene: Scene,
    clock: FrameClock,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> anyhow::Result<Self> {
        let seed = config.resolve_seed();
        log::info!("Scene seed {seed}");
        let blueprint = SceneBlueprint::generate(config, &mut SmallRng::seed_from_u64(seed));
        let ctx = Context::new(window, config, blueprint.lights.clone())
            .await
            .context("App initialization failed. Cannot create the main context")?;
        let scene = Scene::build(&ctx, &blueprint, config.spin_step);
        Ok(Self {
            ctx,
            scene,
            clock: FrameClock::new(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();
        let tick = self.clock.tick();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.scene.spin(tick.elapsed);
        self.ctx.camera.update(&self.ctx.projection, &self.ctx.queue);
        self.scene.write_to_buffers(&self.ctx.queue);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.ctx.pipelines.mesh);
            self.scene
                .draw(&mut render_pass, &self.ctx.camera.bind_group, &self.ctx.light.bind_group);

            if let Some(background) = &self.scene.background {
                background.draw(&mut render_pass, &self.ctx.pipelines.skybox, &self.ctx.camera.bind_group);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        if tick.frame == 0 {
            log::info!("First frame presented after {:.2}s", tick.elapsed);
        }
        Ok(())
    }

    /// Puts a finished asset into the scene. Failures are logged and dropped.
    fn apply_asset(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::FaceTexture { face, name, result } => {
                let texture = resources::settle(&name, result).and_then(|img| {
                    resources::settle(
                        &name,
                        Texture::from_image(&self.ctx.device, &self.ctx.queue, &img, Some(&name)),
                    )
                });
                if let Some(texture) = texture {
                    self.scene.set_face_texture(&self.ctx, face, texture);
                    log::info!("Loaded face texture {name}");
                }
            }
            AssetEvent::Model { name, result } => {
                if let Some(model) = resources::settle(&name, result) {
                    self.scene.add_model(&self.ctx, &name, model);
                }
            }
            AssetEvent::Panorama { name, result } => {
                let skybox = resources::settle(&name, result).and_then(|img| {
                    resources::settle(
                        &name,
                        Skybox::from_equirectangular(
                            &self.ctx.device,
                            &self.ctx.queue,
                            &self.ctx.sky_layout,
                            &img,
                            &name,
                        ),
                    )
                });
                if skybox.is_some() {
                    self.scene.background = skybox;
                }
            }
        }
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<SceneEvent>,
    state: Option<AppState>,
    config: SceneConfig,
    started: bool,
}

impl App {
    fn new(event_loop: &EventLoop<SceneEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().context("starting the asset runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            config,
            started: false,
        })
    }

    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("orbit-scene");
        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            let canvas = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&self.config.canvas_id))
                .with_context(|| format!("no element with id {:?}", self.config.canvas_id))?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }
        Ok(window_attributes)
    }

    /// Finishes setup once the state exists: size the surface, start the
    /// asset loads and kick off the render loop.
    fn install(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.load_assets();
    }

    fn load_assets(&self) {
        let root = self.config.asset_root.clone();
        for (face, name) in self.config.face_textures.iter().cloned().enumerate() {
            let root = root.clone();
            self.spawn_asset(async move {
                let result = resources::texture::load_image(&root, &name).await;
                AssetEvent::FaceTexture { face, name, result }
            });
        }

        let model = self.config.model.clone();
        let model_root = root.clone();
        self.spawn_asset(async move {
            let result = resources::load_model_obj(&model_root, &model.mtl, &model.obj).await;
            AssetEvent::Model {
                name: model.obj,
                result,
            }
        });

        let name = self.config.panorama.clone();
        self.spawn_asset(async move {
            let result = resources::texture::load_image(&root, &name).await;
            AssetEvent::Panorama { name, result }
        });
        log::info!("Started loading assets from {:?}", self.config.asset_root);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_asset<F>(&self, load: F)
    where
        F: Future<Output = AssetEvent> + Send + 'static,
    {
        let proxy = self.proxy.clone();
        self.async_runtime.spawn(async move {
            let event = load.await;
            if proxy.send_event(SceneEvent::Asset(event)).is_err() {
                log::debug!("Event loop closed before an asset finished loading");
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_asset<F>(&self, load: F)
    where
        F: Future<Output = AssetEvent> + 'static,
    {
        let proxy = self.proxy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let event = load.await;
            if proxy.send_event(SceneEvent::Asset(event)).is_err() {
                log::debug!("Event loop closed before an asset finished loading");
            }
        });
    }
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {e:#}");
                event_loop.exit();
                return;
            }
        };
        let config = self.config.clone();
        let init_future = async move { AppState::new(window, &config).await };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.install(state),
                Err(e) => {
                    log::error!("{e:#}");
                    event_loop.exit();
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy.send_event(SceneEvent::Initialized(result)).is_err() {
                    log::error!("Event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            // This is the message from the wasm `spawn_local`
            SceneEvent::Initialized(Ok(state)) => self.install(state),
            SceneEvent::Initialized(Err(e)) => {
                log::error!("{e:#}");
                event_loop.exit();
            }
            SceneEvent::Asset(asset) => match &mut self.state {
                Some(state) => state.apply_asset(asset),
                None => log::warn!("Asset arrived before the scene existed: {:?}", SceneEvent::Asset(asset)),
            },
        }
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
        let camera = &mut state.ctx.camera;
        if camera.controller.handle_window_event(&event, &camera.camera) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }
}

/// env_logger on native (honours `RUST_LOG`), the browser console on wasm.
pub fn init_logger() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }
    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }
    Ok(())
}

/// Opens the window (or binds the canvas) and runs the demo until it closes.
///
/// Expects the logger to be set up already, see [`init_logger`].
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    let event_loop: EventLoop<SceneEvent> = EventLoop::with_user_event().build()?;
    let app = App::new(&event_loop, config)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = app;
        event_loop.run_app(&mut app)?;
    }
    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    init_logger()
        .and_then(|_| run(SceneConfig::default()))
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
