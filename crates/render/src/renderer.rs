use crate::surface::RenderSurface;
use crate::trail::{ColorLoad, TrailSettings};
use std::fmt::Write as _;
use thiserror::Error;
use trailcubes_common::PixelSize;
use trailcubes_scene::{OrthographicCamera, Scene};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera and draws onto `surface`. It never
/// mutates the scene.
pub trait Renderer<S: RenderSurface> {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(
        &mut self,
        surface: &mut S,
        scene: &Scene,
        camera: &OrthographicCamera,
    ) -> Result<Self::Output, RenderError>;

    /// Drop accumulated trail content before the next frame.
    fn clear_trails(&mut self);
}

/// Text renderer for headless runs.
///
/// Produces a human-readable frame description and models trail
/// accumulation: `layers` counts the frames drawn since the buffer was last
/// cleared.
#[derive(Debug)]
pub struct DebugTextRenderer {
    settings: TrailSettings,
    layers: u64,
    frames: u64,
    last_buffer: Option<PixelSize>,
    clear_requested: bool,
}

impl DebugTextRenderer {
    pub fn new(settings: TrailSettings) -> Self {
        Self {
            settings,
            layers: 0,
            frames: 0,
            last_buffer: None,
            clear_requested: false,
        }
    }

    /// Frames currently visible on top of each other.
    pub fn layers(&self) -> u64 {
        self.layers
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(TrailSettings::trails())
    }
}

impl<S: RenderSurface> Renderer<S> for DebugTextRenderer {
    type Output = String;

    fn render(
        &mut self,
        surface: &mut S,
        scene: &Scene,
        camera: &OrthographicCamera,
    ) -> Result<String, RenderError> {
        let buffer = surface.buffer_size();
        let fresh = self.clear_requested || self.last_buffer != Some(buffer);
        if fresh && self.frames > 0 {
            tracing::debug!("trail buffer reset at frame {}", self.frames + 1);
        }
        self.clear_requested = false;
        self.last_buffer = Some(buffer);

        let load = self.settings.color_load(surface.preserves_buffer(), fresh);
        self.layers = match load {
            ColorLoad::Keep => self.layers + 1,
            ColorLoad::Clear(_) => 1,
        };
        self.frames += 1;

        let group = &scene.group;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (buffer={}, layers={}) ===",
            self.frames, buffer, self.layers
        );
        let _ = writeln!(
            out,
            "Camera: left={:.3} right={:.3} top={:.3} bottom={:.3}",
            camera.left, camera.right, camera.top, camera.bottom
        );
        let _ = writeln!(
            out,
            "Group: pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}) scale={}",
            group.position.x,
            group.position.y,
            group.position.z,
            group.rotation.x,
            group.rotation.y,
            group.scale()
        );
        for (model, cube) in group.cube_world_matrices() {
            let p = model.w_axis;
            let _ = writeln!(
                out,
                "  cube {} at ({:.3}, {:.3}, {:.3})",
                cube.color.to_hex_string(),
                p.x,
                p.y,
                p.z
            );
        }

        Ok(out)
    }

    fn clear_trails(&mut self) {
        self.clear_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn surface() -> HeadlessSurface {
        let mut s = HeadlessSurface::new(PixelSize::new(400, 300));
        s.resize_buffer(PixelSize::new(400, 300));
        s
    }

    #[test]
    fn describes_scene() {
        let mut r = DebugTextRenderer::default();
        let out = r
            .render(&mut surface(), &Scene::default(), &OrthographicCamera::default())
            .unwrap();
        assert!(out.contains("Frame 1"));
        assert!(out.contains("buffer=400x300"));
        assert!(out.contains("#FF0000"));
        assert_eq!(out.matches("cube ").count(), 6);
    }

    #[test]
    fn trails_accumulate_layers() {
        let mut r = DebugTextRenderer::default();
        let mut s = surface();
        let scene = Scene::default();
        let cam = OrthographicCamera::default();
        for _ in 0..3 {
            r.render(&mut s, &scene, &cam).unwrap();
        }
        assert_eq!(r.layers(), 3);
    }

    #[test]
    fn opaque_never_accumulates() {
        let mut r = DebugTextRenderer::new(TrailSettings::opaque());
        let mut s = surface();
        let scene = Scene::default();
        let cam = OrthographicCamera::default();
        for _ in 0..3 {
            r.render(&mut s, &scene, &cam).unwrap();
        }
        assert_eq!(r.layers(), 1);
        assert_eq!(r.frames(), 3);
    }

    #[test]
    fn non_preserving_surface_drops_trails() {
        let mut r = DebugTextRenderer::default();
        let mut s = surface().without_preservation();
        let scene = Scene::default();
        let cam = OrthographicCamera::default();
        r.render(&mut s, &scene, &cam).unwrap();
        r.render(&mut s, &scene, &cam).unwrap();
        assert_eq!(r.layers(), 1);
    }

    #[test]
    fn resize_and_clear_reset_layers() {
        let mut r = DebugTextRenderer::default();
        let mut s = surface();
        let scene = Scene::default();
        let cam = OrthographicCamera::default();
        r.render(&mut s, &scene, &cam).unwrap();
        r.render(&mut s, &scene, &cam).unwrap();
        assert_eq!(r.layers(), 2);

        s.resize_buffer(PixelSize::new(800, 300));
        r.render(&mut s, &scene, &cam).unwrap();
        assert_eq!(r.layers(), 1);

        r.render(&mut s, &scene, &cam).unwrap();
        Renderer::<HeadlessSurface>::clear_trails(&mut r);
        r.render(&mut s, &scene, &cam).unwrap();
        assert_eq!(r.layers(), 1);
    }
}
