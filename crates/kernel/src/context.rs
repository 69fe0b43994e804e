use thiserror::Error;
use trailcubes_common::SceneConfig;
use trailcubes_common::config::MILLIS_PER_SECOND;
use trailcubes_input::{CanvasGeometry, EventOutcome, InputEvent, InputMapper, PointerState};
use trailcubes_render::{RenderError, RenderSurface, Renderer};
use trailcubes_scene::{OrthographicCamera, Scene, rotation_at};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What one frame did, plus whatever the renderer produced.
#[derive(Debug, Clone)]
pub struct FrameReport<O> {
    /// 1-based frame number.
    pub frame: u64,
    pub elapsed_secs: f64,
    /// Backing buffer was resized or the camera refit this frame.
    pub resized: bool,
    pub output: O,
}

/// Everything the frame loop and input handlers share.
///
/// Owned by a single controller (the host app). Input handlers write the
/// pointer state here; the next [`FrameContext::step`] reads it.
#[derive(Debug, Clone)]
pub struct FrameContext {
    config: SceneConfig,
    scene: Scene,
    camera: OrthographicCamera,
    pointer: PointerState,
    mapper: InputMapper,
    camera_fitted: bool,
    frames: u64,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl FrameContext {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            scene: Scene::build(&config),
            config,
            camera: OrthographicCamera::default(),
            pointer: PointerState::new(),
            mapper: InputMapper::new(),
            camera_fitted: false,
            frames: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Map a pointer or touch event into the pointer state.
    pub fn handle_input(&mut self, event: &InputEvent, canvas: &CanvasGeometry) -> EventOutcome {
        self.mapper
            .handle(event, canvas, &self.camera, &mut self.pointer)
    }

    /// Match the backing buffer to the displayed size and refit the camera.
    /// The camera is also fit once on first use, even when the buffer
    /// already matched. Returns whether anything changed.
    pub fn resize_to_display_size<S: RenderSurface>(&mut self, surface: &mut S) -> bool {
        let shown = surface.display_size();
        let buffer = surface.buffer_size();
        let resize = shown != buffer;
        if !resize && self.camera_fitted {
            return false;
        }

        if resize {
            surface.resize_buffer(shown);
        }

        match shown.aspect() {
            Some(aspect) => {
                self.camera.set_aspect(aspect);
                self.camera.update_projection_matrix();
                self.camera_fitted = true;
                tracing::debug!(
                    "resized {buffer} -> {shown}, camera left={:.3} right={:.3}",
                    self.camera.left,
                    self.camera.right
                );
                true
            }
            None => {
                if resize {
                    tracing::debug!("resized {buffer} -> {shown}, camera kept for zero height");
                }
                resize
            }
        }
    }

    /// Run one frame: resize check, apply pointer and rotation, render.
    ///
    /// A render error aborts the frame and is returned as-is.
    pub fn step<S, R>(
        &mut self,
        timestamp_ms: f64,
        surface: &mut S,
        renderer: &mut R,
    ) -> Result<FrameReport<R::Output>, FrameError>
    where
        S: RenderSurface,
        R: Renderer<S>,
    {
        let elapsed_secs = timestamp_ms / MILLIS_PER_SECOND;

        let resized = self.resize_to_display_size(surface);

        let group = &mut self.scene.group;
        group.set_planar_position(self.pointer.position());
        group.rotation = rotation_at(elapsed_secs as f32, self.config.rotation_y_ratio);

        let output = renderer.render(surface, &self.scene, &self.camera)?;
        self.frames += 1;

        Ok(FrameReport {
            frame: self.frames,
            elapsed_secs,
            resized,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use trailcubes_common::PixelSize;
    use trailcubes_render::{DebugTextRenderer, HeadlessSurface};

    struct FailingRenderer;

    impl Renderer<HeadlessSurface> for FailingRenderer {
        type Output = ();

        fn render(
            &mut self,
            _surface: &mut HeadlessSurface,
            _scene: &Scene,
            _camera: &OrthographicCamera,
        ) -> Result<(), RenderError> {
            Err(RenderError::SurfaceLost)
        }

        fn clear_trails(&mut self) {}
    }

    #[test]
    fn first_frame_sizes_buffer_and_camera() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(400, 300));
        let mut renderer = DebugTextRenderer::default();

        let report = ctx.step(0.0, &mut surface, &mut renderer).unwrap();

        assert!(report.resized);
        assert_eq!(report.frame, 1);
        assert_eq!(surface.buffer_size(), PixelSize::new(400, 300));
        assert!((ctx.camera().right - 4.0 / 3.0).abs() < 1e-5);
        assert_eq!(ctx.camera().left, -ctx.camera().right);
    }

    /// A surface whose buffer was sized by the host before the first frame.
    struct PresizedSurface {
        size: PixelSize,
        resizes: u64,
    }

    impl RenderSurface for PresizedSurface {
        fn display_size(&self) -> PixelSize {
            self.size
        }

        fn buffer_size(&self) -> PixelSize {
            self.size
        }

        fn resize_buffer(&mut self, size: PixelSize) {
            self.size = size;
            self.resizes += 1;
        }

        fn preserves_buffer(&self) -> bool {
            true
        }
    }

    #[test]
    fn camera_fits_presized_buffer_on_first_frame() {
        let mut ctx = FrameContext::default();
        let mut surface = PresizedSurface {
            size: PixelSize::new(960, 540),
            resizes: 0,
        };
        let mut renderer = DebugTextRenderer::default();

        for frame in 0..3 {
            ctx.step(frame as f64 * 16.0, &mut surface, &mut renderer)
                .unwrap();
        }

        assert!((ctx.camera().right - 960.0 / 540.0).abs() < 1e-5);
        assert!((ctx.camera().left + 960.0 / 540.0).abs() < 1e-5);
        assert_eq!(ctx.camera().projection_updates(), 1);
        assert_eq!(surface.resizes, 0);
    }

    #[test]
    fn aspect_follows_any_size() {
        for (w, h) in [(1, 1), (1920, 1080), (300, 900), (7, 3)] {
            let mut ctx = FrameContext::default();
            let mut surface = HeadlessSurface::new(PixelSize::new(w, h));
            ctx.resize_to_display_size(&mut surface);
            let expected = w as f32 / h as f32;
            assert!((ctx.camera().right - expected).abs() < 1e-5);
            assert!((ctx.camera().left + expected).abs() < 1e-5);
        }
    }

    #[test]
    fn widening_updates_projection_once() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(400, 300));
        let mut renderer = DebugTextRenderer::default();
        ctx.step(0.0, &mut surface, &mut renderer).unwrap();
        assert!((ctx.camera().right - 1.333).abs() < 1e-3);

        surface.set_display_size(PixelSize::new(800, 300));
        let before = ctx.camera().projection_updates();
        let report = ctx.step(16.0, &mut surface, &mut renderer).unwrap();

        assert!(report.resized);
        assert!((ctx.camera().right - 2.667).abs() < 1e-3);
        assert!((ctx.camera().left + 2.667).abs() < 1e-3);
        assert_eq!(ctx.camera().projection_updates(), before + 1);

        let steady = ctx.step(32.0, &mut surface, &mut renderer).unwrap();
        assert!(!steady.resized);
        assert_eq!(ctx.camera().projection_updates(), before + 1);
    }

    #[test]
    fn zero_height_display_keeps_camera() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(400, 0));
        assert!(ctx.resize_to_display_size(&mut surface));
        assert_eq!(ctx.camera().right, 2.0);
        assert_eq!(ctx.camera().projection_updates(), 0);
    }

    #[test]
    fn rotation_is_driven_by_timestamp() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(100, 100));
        let mut renderer = DebugTextRenderer::default();

        ctx.step(0.0, &mut surface, &mut renderer).unwrap();
        assert_eq!(ctx.scene().group.rotation, Vec2::ZERO);

        let report = ctx.step(10_000.0, &mut surface, &mut renderer).unwrap();
        assert_eq!(report.elapsed_secs, 10.0);
        let r = ctx.scene().group.rotation;
        assert!((r.x - 10.0).abs() < 1e-5);
        assert!((r.y - 11.1).abs() < 1e-5);
    }

    #[test]
    fn pointer_reaches_group_on_next_frame() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(200, 100));
        let mut renderer = DebugTextRenderer::default();
        ctx.step(0.0, &mut surface, &mut renderer).unwrap();

        let canvas = CanvasGeometry::unscaled(surface.buffer_size());
        let outcome = ctx.handle_input(&InputEvent::pointer(200.0, 0.0), &canvas);
        assert!(outcome.updated);
        // Not applied until the frame runs.
        assert_eq!(ctx.scene().group.position.x, 0.0);

        ctx.step(16.0, &mut surface, &mut renderer).unwrap();
        let p = ctx.scene().group.position;
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn rotation_ignores_pointer() {
        let mut a = FrameContext::default();
        let mut b = FrameContext::default();
        let mut sa = HeadlessSurface::new(PixelSize::new(100, 100));
        let mut sb = HeadlessSurface::new(PixelSize::new(100, 100));
        let mut r = DebugTextRenderer::default();
        a.step(0.0, &mut sa, &mut r).unwrap();
        b.step(0.0, &mut sb, &mut r).unwrap();

        let canvas = CanvasGeometry::unscaled(PixelSize::new(100, 100));
        a.handle_input(&InputEvent::pointer(10.0, 90.0), &canvas);

        a.step(2_500.0, &mut sa, &mut r).unwrap();
        b.step(2_500.0, &mut sb, &mut r).unwrap();
        assert_eq!(a.scene().group.rotation, b.scene().group.rotation);
        assert_ne!(a.scene().group.position, b.scene().group.position);
    }

    #[test]
    fn render_error_is_propagated() {
        let mut ctx = FrameContext::default();
        let mut surface = HeadlessSurface::new(PixelSize::new(100, 100));
        let err = ctx.step(0.0, &mut surface, &mut FailingRenderer).unwrap_err();
        assert!(matches!(err, FrameError::Render(RenderError::SurfaceLost)));
        assert_eq!(ctx.frames(), 0);
    }
}
