use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trailcubes_common::config::{GROUP_SCALE, ROTATION_Y_RATIO};
use trailcubes_common::{PixelSize, SceneConfig};
use trailcubes_input::{CanvasGeometry, InputEvent};
use trailcubes_kernel::{CancellationToken, FixedRateScheduler, FrameContext, run};
use trailcubes_render::{DebugTextRenderer, HeadlessSurface, RenderSurface, TrailSettings};

#[derive(Parser)]
#[command(name = "trailcubes-cli", about = "Headless driver for the trailcubes frame loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene constants
    Info,
    /// Map a client-space point on a canvas into scene space
    Project {
        /// Client x
        #[arg(allow_negative_numbers = true)]
        x: f32,
        /// Client y
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
    /// Run the frame loop with a scripted circular pointer path
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Frames per second for the timestamps
        #[arg(long, default_value = "60", value_parser = parse_fps)]
        fps: f64,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// Clear every frame instead of accumulating
        #[arg(long)]
        no_trail: bool,
        /// Emit one JSON object per frame instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct FrameLine {
    frame: u64,
    elapsed_secs: f64,
    resized: bool,
    pointer: [f32; 2],
    rotation: [f32; 2],
    camera: [f32; 2],
}

fn parse_fps(s: &str) -> Result<f64, String> {
    let fps: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("{s} is not a positive frame rate"))
    }
}

fn write_json_line(out: &mut impl Write, line: &FrameLine) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    writeln!(out)?;
    Ok(())
}

/// Client position on a circle around the canvas center for frame `frame`.
fn scripted_client(frame: u64, size: PixelSize) -> Vec2 {
    let center = Vec2::new(size.width as f32, size.height as f32) * 0.5;
    let radius = center.min_element() * 0.5;
    let angle = frame as f32 * 0.1;
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            let ctx = FrameContext::new(config);
            let active = ctx.config();
            println!("trailcubes-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("group scale: {GROUP_SCALE} (active {})", active.group_scale);
            println!(
                "rotation y ratio: {ROTATION_Y_RATIO} (active {})",
                active.rotation_y_ratio
            );
            println!("cubes: {}", ctx.scene().group.cubes().len());
            let cam = ctx.camera();
            println!(
                "camera: left={} right={} top={} bottom={}",
                cam.left, cam.right, cam.top, cam.bottom
            );
        }
        Commands::Project {
            x,
            y,
            width,
            height,
        } => {
            let mut ctx = FrameContext::new(config);
            let mut surface = HeadlessSurface::new(PixelSize::new(width, height));
            ctx.resize_to_display_size(&mut surface);

            let canvas = CanvasGeometry::unscaled(surface.buffer_size());
            let outcome = ctx.handle_input(&InputEvent::pointer(x, y), &canvas);
            if !outcome.updated {
                anyhow::bail!("canvas {width}x{height} has no area");
            }
            let p = ctx.pointer().position();
            println!("client ({x}, {y}) on {width}x{height} -> scene ({:.4}, {:.4})", p.x, p.y);
        }
        Commands::Simulate {
            frames,
            fps,
            width,
            height,
            no_trail,
            json,
        } => {
            let settings = if no_trail {
                TrailSettings::opaque()
            } else {
                TrailSettings::trails()
            };
            let size = PixelSize::new(width, height);
            let mut ctx = FrameContext::new(config);
            let mut scheduler = FixedRateScheduler::new(fps)
                .with_context(|| format!("unusable frame rate {fps}"))?
                .with_limit(frames);
            let mut surface = HeadlessSurface::new(size);
            let mut renderer = DebugTextRenderer::new(settings);
            let canvas = CanvasGeometry::unscaled(size);

            let token = CancellationToken::new();
            let stopper = token.clone();
            let mut out = std::io::stdout().lock();
            let mut write_error = None;
            let summary = run(
                &mut ctx,
                &mut scheduler,
                &mut surface,
                &mut renderer,
                &token,
                |ctx, report| {
                    let written = if json {
                        let cam = ctx.camera();
                        let line = FrameLine {
                            frame: report.frame,
                            elapsed_secs: report.elapsed_secs,
                            resized: report.resized,
                            pointer: ctx.pointer().position().to_array(),
                            rotation: ctx.scene().group.rotation.to_array(),
                            camera: [cam.left, cam.right],
                        };
                        write_json_line(&mut out, &line)
                    } else {
                        write!(out, "{}", report.output).map_err(Into::into)
                    };
                    if let Err(e) = written {
                        write_error.get_or_insert(e);
                        stopper.cancel();
                        return;
                    }
                    let client = scripted_client(report.frame, size);
                    ctx.handle_input(&InputEvent::PointerMove { client }, &canvas);
                },
            )?;

            if let Some(e) = write_error {
                return Err(e.context("writing frame output"));
            }
            tracing::info!(
                "simulated {} frames, {} trail layers",
                summary.frames,
                renderer.layers()
            );
        }
    }

    Ok(())
}
