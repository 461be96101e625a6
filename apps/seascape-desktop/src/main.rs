mod session;
mod ui;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use seascape_render_wgpu::{GpuContext, WgpuRenderer, load_normal_map};
use seascape_scene::{AnimationConfig, CubeMotion, WaterClock};
use seascape_sky::Parameters;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use session::{DEFAULT_MODEL, Session, SessionConfig};
use ui::UiState;

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CubeMotionArg {
    /// Circle the origin at radius 20
    Orbit,
    /// Bob up and down around y = 5
    Bob,
}

impl From<CubeMotionArg> for CubeMotion {
    fn from(arg: CubeMotionArg) -> Self {
        match arg {
            CubeMotionArg::Orbit => CubeMotion::default(),
            CubeMotionArg::Bob => CubeMotion::Bob {
                amplitude: 20.0,
                baseline: 5.0,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WaterClockArg {
    /// Advance water time by 1/60 per frame
    Fixed,
    /// Advance water time by real elapsed time
    Elapsed,
}

impl From<WaterClockArg> for WaterClock {
    fn from(arg: WaterClockArg) -> Self {
        match arg {
            WaterClockArg::Fixed => WaterClock::FixedStep,
            WaterClockArg::Elapsed => WaterClock::Elapsed,
        }
    }
}

#[derive(Parser)]
#[command(name = "seascape-desktop", about = "Ocean, sky and jellyfish viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding models and textures
    #[arg(long, default_value = "./assets")]
    assets_dir: PathBuf,

    /// Water normal map, relative to the assets directory unless absolute
    #[arg(long, default_value = "waternormals.jpg")]
    normal_map: PathBuf,

    /// Extra model to load at a random position (repeatable)
    #[arg(long = "model")]
    models: Vec<PathBuf>,

    /// Number of extra default models to scatter at random positions
    #[arg(long, default_value_t = 0)]
    random_models: usize,

    /// Skip the three default jellyfish
    #[arg(long)]
    no_default_models: bool,

    /// JSON file with initial sky and water parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Demo cube motion
    #[arg(long, value_enum, default_value_t = CubeMotionArg::Orbit)]
    cube_motion: CubeMotionArg,

    /// How the water animation advances
    #[arg(long, value_enum, default_value_t = WaterClockArg::Fixed)]
    water_clock: WaterClockArg,

    /// Extra attempts for a failed model load
    #[arg(long, default_value_t = 0)]
    load_retries: u32,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: u32,
}

/// Window-bound state, created on `resumed`.
struct Gfx {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    session: Session,
    ui: UiState,
    gfx: Option<Gfx>,
    egui_ctx: EguiContext,
    normal_map: PathBuf,
    size: (u32, u32),
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(session: Session, normal_map: PathBuf, size: (u32, u32)) -> Self {
        Self {
            session,
            ui: UiState::default(),
            gfx: None,
            egui_ctx: EguiContext::default(),
            normal_map,
            size,
            dragging: false,
            cursor: None,
            error: None,
        }
    }

    fn init_gfx(&self, event_loop: &ActiveEventLoop) -> Result<Gfx> {
        let attrs = Window::default_attributes()
            .with_title("Seascape")
            .with_inner_size(PhysicalSize::new(self.size.0, self.size.1));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;

        let normal_map = match load_normal_map(&self.normal_map) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(
                    path = %self.normal_map.display(),
                    "normal map unavailable, using flat water: {e}"
                );
                None
            }
        };

        let renderer = WgpuRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.format(),
            size.width,
            size.height,
            normal_map,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);

        Ok(Gfx {
            window,
            gpu,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        let Some(gfx) = &mut self.gfx else {
            return;
        };

        let Gfx { gpu, renderer, .. } = &mut *gfx;
        self.session.drain_loads(|mesh| {
            renderer.upload_mesh(
                &gpu.device,
                &mesh.name,
                &mesh.positions,
                &mesh.normals,
                &mesh.indices,
            )
        });

        if !self.session.frame() {
            return;
        }

        let output = match gfx.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.gpu.reconfigure();
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

        let device = &gfx.gpu.device;
        let queue = &gfx.gpu.queue;
        gfx.renderer
            .render(device, queue, &view, &self.session.camera, &self.session.scene);

        let raw_input = gfx.egui_winit.take_egui_input(&gfx.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui::draw(ctx, &self.ui, &mut self.session);
        });
        gfx.egui_winit
            .handle_platform_output(&gfx.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let (width, height) = gfx.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let egui_renderer = &mut gfx.egui_renderer;
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.ui.show_panel = !self.ui.show_panel,
            KeyCode::F2 => self.ui.show_stats = !self.ui.show_stats,
            _ => {}
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        match self.init_gfx(event_loop) {
            Ok(gfx) => {
                let size = gfx.window.inner_size();
                self.session.resize(size.width, size.height);
                self.ui.adapter = gfx.gpu.adapter_info.name.clone();
                self.gfx = Some(gfx);
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.session.shutdown();
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gfx) = &mut self.gfx {
            let response = gfx.egui_winit.on_window_event(&gfx.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.session.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let (width, height) = (new_size.width.max(1), new_size.height.max(1));
                self.session.resize(width, height);
                if let Some(gfx) = &mut self.gfx {
                    gfx.gpu.resize(width, height);
                    gfx.renderer.resize(&gfx.gpu.device, width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.cursor) {
                    self.session.camera.rotate(
                        (position.x - last.x) as f32,
                        (position.y - last.y) as f32,
                    );
                }
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.session.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.session.is_running() {
            return;
        }
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}

fn session_config(cli: &Cli) -> Result<SessionConfig> {
    let params = match &cli.params {
        Some(path) => Parameters::load(path)
            .with_context(|| format!("failed to read parameters from {}", path.display()))?,
        None => Parameters::default(),
    };

    Ok(SessionConfig {
        params,
        animation: AnimationConfig {
            cube_motion: cli.cube_motion.into(),
            water_clock: cli.water_clock.into(),
            ..AnimationConfig::default()
        },
        load_retries: cli.load_retries,
        ..SessionConfig::default()
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("seascape-desktop starting");

    let mut session = Session::new(cli.width, cli.height, session_config(&cli)?);
    if !cli.no_default_models {
        session.queue_default_models(&cli.assets_dir);
    }
    for model in &cli.models {
        session.load_model(cli.assets_dir.join(model), None);
    }
    for _ in 0..cli.random_models {
        session.load_model(cli.assets_dir.join(DEFAULT_MODEL), None);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let normal_map = cli.assets_dir.join(&cli.normal_map);
    let mut app = GpuApp::new(session, normal_map, (cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
