//! The viewer application: window lifecycle, event routing, the frame loop.
//!
//! Startup blocks on the GPU context and the environment cubemap, then kicks
//! off one async load task per configured model. Each task reports back
//! through the event loop proxy and the finished model is attached to the
//! scene in whatever order the loads complete. A model that fails to load is
//! logged and skipped; the viewer keeps running with what it has.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::window::Window;

use crate::assets::{self, animation::Mixer};
use crate::camera::{Camera, CameraUniform, OrbitControls, Projection};
use crate::config::ViewerConfig;
use crate::context::Context;
use crate::lights::Lights;
use crate::panel::DebugPanel;
use crate::render::Renderer;
use crate::scene::{self, Scene, Transform};
use crate::time::FrameClock;

/// Events sent back into the winit loop from async load tasks.
#[derive(Debug)]
pub enum ViewerEvent {
    ModelLoaded {
        slot: usize,
        result: anyhow::Result<scene::Model>,
    },
}

struct ViewerState {
    ctx: Context,
    scene: Scene,
    camera: Camera,
    camera_uniform: CameraUniform,
    projection: Projection,
    controls: OrbitControls,
    panel: DebugPanel,
    renderer: Renderer,
    mixers: Vec<Mixer>,
}

impl ViewerState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;

        let lights = Lights::new(&config.ambient, &config.directional, &config.point);
        let mut scene = Scene::new(lights);

        match assets::load_cubemap(&config.assets_dir, &config.environment).await {
            Ok(cubemap) => scene.set_background(cubemap),
            Err(e) => log::warn!("environment cubemap failed to load: {}", e),
        }

        let camera = Camera::from_eye_target(config.camera.eye.into(), config.camera.target.into());
        let projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            cgmath::Deg(config.camera.fovy_deg),
            config.camera.znear,
            config.camera.zfar,
        );
        let controls = OrbitControls::new(&camera);
        let panel = DebugPanel::new(&ctx);
        let mut renderer = Renderer::new(&ctx, &config.directional.shadow);
        if let Some(background) = &scene.background {
            renderer.set_background(&ctx, background);
        }

        Ok(Self {
            ctx,
            scene,
            camera,
            camera_uniform: CameraUniform::new(),
            projection,
            controls,
            panel,
            renderer,
            mixers: Vec::new(),
        })
    }

    fn attach(&mut self, mut model: scene::Model, placement: Transform) {
        model.transform = placement;
        let index = self.scene.attach(model);
        self.renderer.upload(&self.ctx, &self.scene.models[index]);
        self.mixers.push(Mixer::new());
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(size);
        self.projection
            .resize(self.ctx.config.width, self.ctx.config.height);
        self.renderer.resize(&self.ctx);
    }

    /// One frame: ease the camera, advance animations, push uniforms, draw.
    fn tick(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        self.controls.update(&mut self.camera, dt);
        self.camera_uniform
            .update_view_proj(&self.camera, &self.projection);
        self.renderer
            .update_camera(&self.ctx.queue, &self.camera_uniform);
        self.renderer.update_lights(&self.ctx.queue, &self.scene.lights);

        for (index, model) in self.scene.models.iter_mut().enumerate() {
            if model.clips.is_empty() {
                continue;
            }
            let scene::Model {
                ref clips,
                ref mut root,
                ..
            } = *model;
            if let Some(mixer) = self.mixers.get_mut(index) {
                mixer.update(dt, clips, root);
            }
        }
        for (index, model) in self.scene.models.iter().enumerate() {
            if !model.clips.is_empty() {
                self.renderer.update_transforms(&self.ctx.queue, index, model);
            }
        }

        let ctx = &self.ctx;
        let panel = &mut self.panel;
        let lights = &mut self.scene.lights;
        self.renderer
            .render(ctx, |encoder, view| panel.draw(ctx, encoder, view, lights))
    }
}

pub struct Viewer {
    runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    state: Option<ViewerState>,
    clock: FrameClock,
}

impl Viewer {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            clock: FrameClock::new(),
        })
    }
}

impl ApplicationHandler<ViewerEvent> for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => panic!("cannot create the main window: {}", e),
        };

        let state = match self
            .runtime
            .block_on(ViewerState::new(window, &self.config))
        {
            Ok(state) => state,
            Err(e) => panic!("viewer initialization failed: {}", e),
        };

        // Models stream in while the first frames already render.
        for (slot, model) in self.config.models.iter().enumerate() {
            let assets_dir = self.config.assets_dir.clone();
            let path = model.path.clone();
            let proxy = self.proxy.clone();
            self.runtime.spawn(async move {
                let result = assets::load_gltf(&assets_dir, &path).await;
                if proxy
                    .send_event(ViewerEvent::ModelLoaded { slot, result })
                    .is_err()
                {
                    log::warn!("event loop closed before {} finished loading", path);
                }
            });
        }

        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.clock = FrameClock::new();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            ViewerEvent::ModelLoaded { slot, result } => match result {
                Ok(model) => {
                    let placement = self
                        .config
                        .models
                        .get(slot)
                        .map(|m| Transform::from_position_euler(m.position, m.rotation))
                        .unwrap_or_default();
                    state.attach(model, placement);
                }
                Err(e) => {
                    let path = self
                        .config
                        .models
                        .get(slot)
                        .map(|m| m.path.as_str())
                        .unwrap_or("?");
                    log::warn!("failed to load {}: {}", path, e);
                }
            },
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.controls.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        let consumed = state.panel.on_window_event(&state.ctx.window, &event);
        if !consumed {
            state.controls.handle_window_events(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => {
                let dt = self.clock.tick();
                match state.tick(dt) {
                    Ok(()) => (),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => log::error!("unable to render: {}", e),
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.ctx.window.request_redraw();
        }
    }
}

/// Open the window and run the viewer until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut viewer = Viewer::new(&event_loop, config)?;
    event_loop.run_app(&mut viewer)?;
    Ok(())
}
