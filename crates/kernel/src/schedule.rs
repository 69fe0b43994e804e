use crate::context::{FrameContext, FrameError, FrameReport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trailcubes_common::config::MILLIS_PER_SECOND;
use trailcubes_render::{RenderSurface, Renderer};

/// Source of "next display refresh" callbacks.
pub trait FrameScheduler {
    /// Wait for the next frame and return its timestamp in milliseconds.
    /// `None` means the host went away.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Deterministic scheduler that ticks at a fixed rate without sleeping.
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    interval_ms: f64,
    next_ms: f64,
    remaining: Option<u64>,
}

impl FixedRateScheduler {
    /// `None` unless `fps` is finite and positive.
    pub fn new(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        Some(Self {
            interval_ms: MILLIS_PER_SECOND / fps,
            next_ms: 0.0,
            remaining: None,
        })
    }

    /// Stop after `frames` timestamps.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let ts = self.next_ms;
        self.next_ms += self.interval_ms;
        Some(ts)
    }
}

/// Shared stop flag for a running frame loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a [`run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub cancelled: bool,
}

/// Step frames until the token is cancelled or the scheduler runs dry.
///
/// `on_frame` sees every report and may feed input into the context or
/// cancel the token. The first render error stops the loop.
pub fn run<S, R, F>(
    ctx: &mut FrameContext,
    scheduler: &mut impl FrameScheduler,
    surface: &mut S,
    renderer: &mut R,
    token: &CancellationToken,
    mut on_frame: F,
) -> Result<RunSummary, FrameError>
where
    S: RenderSurface,
    R: Renderer<S>,
    F: FnMut(&mut FrameContext, &FrameReport<R::Output>),
{
    let mut frames = 0;
    loop {
        if token.is_cancelled() {
            tracing::debug!("frame loop cancelled after {frames} frames");
            return Ok(RunSummary {
                frames,
                cancelled: true,
            });
        }
        let Some(timestamp_ms) = scheduler.next_frame() else {
            tracing::debug!("scheduler exhausted after {frames} frames");
            return Ok(RunSummary {
                frames,
                cancelled: false,
            });
        };
        let report = ctx.step(timestamp_ms, surface, renderer)?;
        frames += 1;
        on_frame(ctx, &report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use trailcubes_common::PixelSize;
    use trailcubes_input::{CanvasGeometry, InputEvent};
    use trailcubes_render::{DebugTextRenderer, HeadlessSurface};

    #[test]
    fn fixed_rate_timestamps() {
        let mut s = FixedRateScheduler::new(50.0).unwrap().with_limit(3);
        assert_eq!(s.next_frame(), Some(0.0));
        assert_eq!(s.next_frame(), Some(20.0));
        assert_eq!(s.next_frame(), Some(40.0));
        assert_eq!(s.next_frame(), None);
    }

    #[test]
    fn rejects_unusable_rates() {
        for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            assert!(FixedRateScheduler::new(fps).is_none(), "fps {fps}");
        }
        assert!(FixedRateScheduler::new(0.5).is_some());
    }

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn run_stops_on_cancel() {
        let mut ctx = FrameContext::default();
        let mut scheduler = FixedRateScheduler::new(60.0).unwrap();
        let mut surface = HeadlessSurface::new(PixelSize::new(320, 240));
        let mut renderer = DebugTextRenderer::default();
        let token = CancellationToken::new();

        let stopper = token.clone();
        let summary = run(
            &mut ctx,
            &mut scheduler,
            &mut surface,
            &mut renderer,
            &token,
            |_, report| {
                if report.frame == 5 {
                    stopper.cancel();
                }
            },
        )
        .unwrap();

        assert_eq!(summary, RunSummary { frames: 5, cancelled: true });
        assert_eq!(ctx.frames(), 5);
        assert_eq!(renderer.layers(), 5);
    }

    #[test]
    fn run_ends_when_scheduler_exhausts() {
        let mut ctx = FrameContext::default();
        let mut scheduler = FixedRateScheduler::new(60.0).unwrap().with_limit(3);
        let mut surface = HeadlessSurface::new(PixelSize::new(320, 240));
        let mut renderer = DebugTextRenderer::default();

        let summary = run(
            &mut ctx,
            &mut scheduler,
            &mut surface,
            &mut renderer,
            &CancellationToken::new(),
            |_, _| {},
        )
        .unwrap();

        assert_eq!(summary, RunSummary { frames: 3, cancelled: false });
        assert_eq!(surface.resize_count(), 1);
    }

    #[test]
    fn pre_cancelled_token_runs_nothing() {
        let mut ctx = FrameContext::default();
        let token = CancellationToken::new();
        token.cancel();
        let summary = run(
            &mut ctx,
            &mut FixedRateScheduler::new(60.0).unwrap(),
            &mut HeadlessSurface::new(PixelSize::new(10, 10)),
            &mut DebugTextRenderer::default(),
            &token,
            |_, _| {},
        )
        .unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(ctx.frames(), 0);
    }

    #[test]
    fn input_between_frames_is_last_write_wins() {
        let mut ctx = FrameContext::default();
        let mut scheduler = FixedRateScheduler::new(60.0).unwrap().with_limit(2);
        let mut surface = HeadlessSurface::new(PixelSize::new(100, 100));
        let mut renderer = DebugTextRenderer::default();
        let canvas = CanvasGeometry::unscaled(PixelSize::new(100, 100));

        run(
            &mut ctx,
            &mut scheduler,
            &mut surface,
            &mut renderer,
            &CancellationToken::new(),
            |ctx, report| {
                if report.frame == 1 {
                    ctx.handle_input(&InputEvent::pointer(0.0, 0.0), &canvas);
                    ctx.handle_input(&InputEvent::pointer(100.0, 50.0), &canvas);
                }
            },
        )
        .unwrap();

        let p = ctx.scene().group.position.truncate();
        assert!((p - Vec2::new(1.0, 0.0)).length() < 1e-5);
    }
}
