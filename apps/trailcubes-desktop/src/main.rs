mod touch;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use trailcubes_common::{PixelSize, SceneConfig};
use trailcubes_input::{CanvasGeometry, CanvasRect, InputEvent};
use trailcubes_kernel::{CancellationToken, FrameContext};
use trailcubes_render::{RenderSurface, Renderer, TrailSettings};
use trailcubes_render_wgpu::{GpuSurface, WgpuRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use touch::TouchTracker;

#[derive(Parser)]
#[command(
    name = "trailcubes-desktop",
    about = "Colored cubes that leave trails behind the pointer"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene config (group_scale, rotation_y_ratio, cube_offset, cube_size)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "960")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "540")]
    height: u32,

    /// Clear every frame instead of leaving trails
    #[arg(long)]
    no_trail: bool,
}

/// Numbers shown in the overlay, gathered before egui runs.
struct OverlayStats {
    elapsed_secs: f64,
    buffer: PixelSize,
    trails_active: bool,
}

/// Application state.
struct AppState {
    ctx: FrameContext,
    start: Instant,
    token: CancellationToken,
    touches: TouchTracker,
    show_overlay: bool,
    clear_requested: bool,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        Self {
            ctx: FrameContext::new(config),
            start: Instant::now(),
            token: CancellationToken::new(),
            touches: TouchTracker::new(),
            show_overlay: true,
            clear_requested: false,
        }
    }

    fn timestamp_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The window's inner area acts as the canvas, in logical client units.
    fn canvas(window: &Window, buffer: PixelSize) -> CanvasGeometry {
        let logical: LogicalSize<f32> = window.inner_size().to_logical(window.scale_factor());
        CanvasGeometry::new(CanvasRect::from_size(logical.width, logical.height), buffer)
    }

    fn client(window: &Window, position: PhysicalPosition<f64>) -> Vec2 {
        let logical = position.to_logical::<f32>(window.scale_factor());
        Vec2::new(logical.x, logical.y)
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Escape => self.token.cancel(),
            KeyCode::F1 => self.show_overlay = !self.show_overlay,
            KeyCode::KeyC => self.clear_requested = true,
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, stats: &OverlayStats) {
        if !self.show_overlay {
            return;
        }

        let camera = self.ctx.camera();
        let pointer = self.ctx.pointer().position();
        let rotation = self.ctx.scene().group.rotation;

        egui::Window::new("trailcubes")
            .default_width(240.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Elapsed: {:.2}s", stats.elapsed_secs));
                ui.label(format!("Frames: {}", self.ctx.frames()));
                ui.label(format!("Pointer: ({:.3}, {:.3})", pointer.x, pointer.y));
                ui.label(format!("Rotation: ({:.2}, {:.2})", rotation.x, rotation.y));
                ui.label(format!(
                    "Camera: left={:.3} right={:.3}",
                    camera.left, camera.right
                ));
                ui.label(format!("Buffer: {}", stats.buffer));
                ui.label(if stats.trails_active {
                    "Trails: on"
                } else {
                    "Trails: off"
                });
                ui.separator();
                if ui.button("Clear trails (C)").clicked() {
                    self.clear_requested = true;
                }
                ui.small("F1: Toggle overlay | Esc: Quit");
            });
    }
}

struct GpuApp {
    state: AppState,
    settings: TrailSettings,
    initial_size: LogicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<GpuSurface>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(config: SceneConfig, settings: TrailSettings, initial_size: LogicalSize<u32>) -> Self {
        Self {
            state: AppState::new(config),
            settings,
            initial_size,
            window: None,
            surface: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("trailcubes")
            .with_transparent(self.settings.alpha)
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("trailcubes_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface = GpuSurface::new(
            surface,
            &adapter,
            device,
            queue,
            PixelSize::new(size.width, size.height),
            self.settings,
        );
        let renderer = WgpuRenderer::new(&surface, self.settings);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(surface.device(), surface.format(), None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, trails {}",
            adapter.get_info().backend.to_str(),
            if surface.preserves_buffer() { "on" } else { "off" }
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn forward_input(&mut self, event: InputEvent) {
        let (Some(window), Some(surface)) = (&self.window, &self.surface) else {
            return;
        };
        let canvas = AppState::canvas(window, surface.buffer_size());
        // winit has no default gesture to cancel; the outcome is only logged.
        let outcome = self.state.ctx.handle_input(&event, &canvas);
        if outcome.prevent_default {
            tracing::trace!("touch move consumed");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.token.is_cancelled() {
            event_loop.exit();
            return;
        }

        let (Some(window), Some(surface), Some(renderer)) =
            (self.window.clone(), self.surface.as_mut(), self.renderer.as_mut())
        else {
            return;
        };

        if std::mem::take(&mut self.state.clear_requested) {
            renderer.clear_trails();
        }

        let timestamp_ms = self.state.timestamp_ms();
        let report = match self.state.ctx.step(timestamp_ms, surface, renderer) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("frame failed: {e}");
                self.state.token.cancel();
                event_loop.exit();
                return;
            }
        };

        if let Some(frame) = report.output {
            let stats = OverlayStats {
                elapsed_secs: report.elapsed_secs,
                buffer: surface.buffer_size(),
                trails_active: surface.preserves_buffer() && !self.settings.auto_clear_color,
            };
            let device = surface.device();
            let queue = surface.queue();

            let (Some(egui_winit), Some(egui_renderer)) =
                (self.egui_winit.as_mut(), self.egui_renderer.as_mut())
            else {
                frame.present();
                return;
            };

            let raw_input = egui_winit.take_egui_input(&window);
            let state = &mut self.state;
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                state.draw_ui(ctx, &stats);
            });
            egui_winit.handle_platform_output(&window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [stats.buffer.width, stats.buffer.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                // The overlay goes on the swapchain image only, never into the trail.
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &frame.view,
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

            frame.present();
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.token.cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // Only the displayed size changes here; the next frame resizes the buffer.
                if let Some(surface) = &mut self.surface {
                    surface.set_display_size(PixelSize::new(new_size.width, new_size.height));
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
                self.state.handle_key(key);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(window) = &self.window else {
                    return;
                };
                let client = AppState::client(window, position);
                self.forward_input(InputEvent::PointerMove { client });
            }
            WindowEvent::Touch(touch) => {
                let Some(window) = &self.window else {
                    return;
                };
                let client = AppState::client(window, touch.location);
                if let Some(event) = self.state.touches.update(touch.id, touch.phase, client) {
                    self.forward_input(event);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
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

    tracing::info!("trailcubes-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let settings = if cli.no_trail {
        TrailSettings::opaque()
    } else {
        TrailSettings::trails()
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, settings, LogicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    Ok(())
}
