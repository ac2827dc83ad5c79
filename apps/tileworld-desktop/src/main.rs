mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use tileworld_fetch::WorldClient;
use tileworld_input::{Direction, KeyBindings};
use tileworld_render::RenderView;
use tileworld_render_wgpu::WgpuRenderer;
use tileworld_scene::{GameSession, ScenePhase, SessionEvent};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::DesktopConfig;

#[derive(Parser)]
#[command(name = "tileworld-desktop", about = "Tile world desktop client")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// World service base URL, overrides the config file
    #[arg(long)]
    endpoint: Option<String>,

    /// World seed, overrides the config file
    #[arg(long)]
    seed: Option<i64>,

    /// Tiles per side, overrides the config file
    #[arg(long)]
    size: Option<u32>,
}

fn default_bindings() -> KeyBindings<KeyCode> {
    KeyBindings::new()
        .bind(KeyCode::ArrowUp, Direction::Up)
        .bind(KeyCode::ArrowDown, Direction::Down)
        .bind(KeyCode::ArrowLeft, Direction::Left)
        .bind(KeyCode::ArrowRight, Direction::Right)
        .bind(KeyCode::KeyW, Direction::Up)
        .bind(KeyCode::KeyS, Direction::Down)
        .bind(KeyCode::KeyA, Direction::Left)
        .bind(KeyCode::KeyD, Direction::Right)
}

/// Everything the status panel shows, copied out of the session per frame.
struct Status {
    phase: ScenePhase,
    player: Option<Vec2>,
    camera: Option<Vec2>,
    frames: u64,
}

/// GPU handles that live as long as the window.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    // Declared first so the session, and the fetch it owns, go before the runtime.
    session: Option<GameSession<WgpuRenderer>>,
    gpu: Option<Gpu>,
    window: Option<Arc<Window>>,
    egui_ctx: EguiContext,
    bindings: KeyBindings<KeyCode>,
    last_frame: Instant,
    settings: DesktopConfig,
    client: WorldClient,
    runtime: tokio::runtime::Runtime,
}

impl GpuApp {
    fn new(settings: DesktopConfig, client: WorldClient, runtime: tokio::runtime::Runtime) -> Self {
        Self {
            session: None,
            gpu: None,
            window: None,
            egui_ctx: EguiContext::default(),
            bindings: default_bindings(),
            last_frame: Instant::now(),
            settings,
            client,
            runtime,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Tile World")
            .with_inner_size(PhysicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tileworld_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.gpu = Some(Gpu {
            surface,
            device,
            queue,
            config,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    /// Unmount any current session and mount a fresh one with a new renderer.
    fn mount_session(&mut self) -> Result<()> {
        if let Some(mut old) = self.session.take() {
            old.unmount();
        }
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };

        let renderer = WgpuRenderer::new(&gpu.device, gpu.config.format);
        let mut scene_config = self.settings.scene;
        scene_config.viewport = Vec2::new(gpu.config.width as f32, gpu.config.height as f32);

        let session = GameSession::mount(
            scene_config,
            self.runtime.handle(),
            self.client.clone(),
            self.settings.request(),
            renderer,
        )?;
        self.session = Some(session);
        Ok(())
    }

    fn status(&self) -> Option<Status> {
        let scene = self.session.as_ref()?.scene();
        Some(Status {
            phase: scene.phase().clone(),
            player: scene.player().map(|p| p.position),
            camera: scene.camera().map(|c| c.position),
            frames: scene.frames(),
        })
    }

    fn update(&mut self, dt: f32) {
        let input = self.bindings.input();
        let Some(session) = &mut self.session else {
            return;
        };
        match session.poll() {
            Some(SessionEvent::Ready { size }) => tracing::info!(size, "world ready"),
            Some(SessionEvent::Failed(reason)) => tracing::error!(%reason, "world failed to load"),
            None => {}
        }
        session.frame(&input, dt);
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.config.width = new_size.width.max(1);
        gpu.config.height = new_size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        if let Some(session) = &mut self.session {
            session
                .scene_mut()
                .set_viewport(Vec2::new(gpu.config.width as f32, gpu.config.height as f32));
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.update(dt);

        let status = self.status();
        let endpoint = self.client.endpoint().to_string();
        let request = self.settings.request();

        let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(session) = &mut self.session {
            let (scene, renderer) = session.parts_mut();
            if let Some(renderer) = renderer {
                let render_view = RenderView::of_scene(scene);
                renderer.render(&gpu.device, &gpu.queue, &view, scene, &render_view);
            }
        }

        let raw_input = gpu.egui_winit.take_egui_input(window);
        let mut reload = false;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            reload = draw_status(ctx, status.as_ref(), &endpoint, request.seed, request.size);
        });

        gpu.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();

        if reload {
            tracing::info!("reloading world");
            if let Err(e) = self.mount_session() {
                tracing::error!("could not remount session: {e:#}");
            }
        }
    }
}

/// Status panel. Returns true when a reload was requested.
fn draw_status(
    ctx: &EguiContext,
    status: Option<&Status>,
    endpoint: &str,
    seed: i64,
    size: u32,
) -> bool {
    let mut reload = false;
    egui::Window::new("Tile World")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Endpoint: {endpoint}"));
            ui.label(format!("Seed: {seed}  Size: {size}"));
            ui.separator();

            match status {
                None => {
                    ui.label("No session");
                }
                Some(status) => {
                    match &status.phase {
                        ScenePhase::Failed(reason) => {
                            ui.colored_label(egui::Color32::from_rgb(230, 70, 70), "Failed to load world");
                            ui.colored_label(egui::Color32::from_rgb(230, 70, 70), reason.as_str());
                        }
                        ScenePhase::Loading => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label("Loading world...");
                            });
                        }
                        phase => {
                            ui.label(format!("Phase: {phase}"));
                        }
                    }
                    if let Some(p) = status.player {
                        ui.label(format!("Player: ({:.1}, {:.1})", p.x, p.y));
                    }
                    if let Some(c) = status.camera {
                        ui.label(format!("Camera: ({:.1}, {:.1})", c.x, c.y));
                    }
                    ui.label(format!("Frames: {}", status.frames));
                }
            }

            ui.separator();
            if ui.button("Reload world").clicked() {
                reload = true;
            }
            ui.small("Arrows / WASD: Move | Esc: Quit");
        });
    reload
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("GPU initialization failed: {e:#}");
            event_loop.exit();
            return;
        }
        if let Err(e) = self.mount_session() {
            tracing::error!("could not mount session: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) {
            let response = gpu.egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(session) = &mut self.session {
                    session.unmount();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::Focused(false) => self.bindings.release_all(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key == KeyCode::Escape && pressed {
                    if let Some(session) = &mut self.session {
                        session.unmount();
                    }
                    event_loop.exit();
                    return;
                }
                self.bindings.handle_key(key, pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut settings = match &cli.config {
        Some(path) => DesktopConfig::load(path)?,
        None => DesktopConfig::default(),
    };
    if let Some(endpoint) = cli.endpoint {
        settings.client.base_url = endpoint;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(size) = cli.size {
        settings.size = size;
    }

    let client = WorldClient::new(&settings.client)?;
    tracing::info!(
        endpoint = %client.endpoint(),
        seed = settings.seed,
        size = settings.size,
        "tileworld-desktop starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .thread_name("tileworld-fetch")
        .build()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings, client, runtime);
    event_loop.run_app(&mut app)?;

    Ok(())
}
