use trailcubes_common::PixelSize;
use trailcubes_render::{RenderError, RenderSurface, TrailSettings};

/// Pick a composite alpha mode. Transparent output needs a (pre|post)-multiplied
/// mode; opaque output prefers `Opaque`.
pub fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    alpha: bool,
) -> wgpu::CompositeAlphaMode {
    let preferred: &[wgpu::CompositeAlphaMode] = if alpha {
        &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
    } else {
        &[wgpu::CompositeAlphaMode::Opaque]
    };
    preferred
        .iter()
        .find(|mode| supported.contains(*mode))
        .or_else(|| supported.first())
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Pick a swapchain format. Colors are written unconverted, so a non-sRGB
/// format keeps them as given.
pub fn choose_format(supported: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    supported
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| supported.first().copied())
}

/// Whether a surface with `usages` can receive the trail texture each frame.
pub fn supports_preservation(usages: wgpu::TextureUsages, settings: &TrailSettings) -> bool {
    settings.preserve_drawing_buffer && usages.contains(wgpu::TextureUsages::COPY_DST)
}

/// A configured window surface plus the device that draws to it.
///
/// The displayed size is pushed in by the host; the backing buffer only
/// follows when the frame loop calls [`RenderSurface::resize_buffer`].
pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    display: PixelSize,
    buffer: PixelSize,
    preserves: bool,
}

impl GpuSurface {
    pub fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        display: PixelSize,
        settings: TrailSettings,
    ) -> Self {
        let caps = surface.get_capabilities(adapter);
        let format = choose_format(&caps.formats).unwrap_or(wgpu::TextureFormat::Bgra8Unorm);

        let preserves = supports_preservation(caps.usages, &settings);
        if settings.preserve_drawing_buffer && !preserves {
            tracing::debug!("surface cannot be a copy destination; trails disabled");
        }
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if preserves {
            usage |= wgpu::TextureUsages::COPY_DST;
        }

        let alpha_mode = choose_alpha_mode(&caps.alpha_modes, settings.alpha);
        tracing::debug!("surface format {format:?}, alpha mode {alpha_mode:?}");

        // Left unconfigured until the first frame sizes the buffer.
        let config = wgpu::SurfaceConfiguration {
            usage,
            format,
            width: 1,
            height: 1,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        Self {
            surface,
            device,
            queue,
            config,
            display,
            buffer: PixelSize::default(),
            preserves,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Record the size the window is now shown at.
    pub fn set_display_size(&mut self, size: PixelSize) {
        self.display = size;
    }

    pub fn reconfigure(&self) {
        if !self.buffer.is_empty() {
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Next swapchain image. `Ok(None)` means skip this frame.
    pub fn acquire(&self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.reconfigure();
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface acquire timed out; skipping frame");
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(e) => Err(RenderError::Backend(e.to_string())),
        }
    }
}

impl RenderSurface for GpuSurface {
    fn display_size(&self) -> PixelSize {
        self.display
    }

    fn buffer_size(&self) -> PixelSize {
        self.buffer
    }

    fn resize_buffer(&mut self, size: PixelSize) {
        self.buffer = size;
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.reconfigure();
    }

    fn preserves_buffer(&self) -> bool {
        self.preserves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode as Mode;

    #[test]
    fn alpha_prefers_premultiplied() {
        let modes = [Mode::Opaque, Mode::PostMultiplied, Mode::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, true), Mode::PreMultiplied);
    }

    #[test]
    fn alpha_falls_back_to_first_supported() {
        assert_eq!(choose_alpha_mode(&[Mode::Opaque], true), Mode::Opaque);
        assert_eq!(choose_alpha_mode(&[], true), Mode::Auto);
    }

    #[test]
    fn opaque_prefers_opaque() {
        let modes = [Mode::PreMultiplied, Mode::Opaque];
        assert_eq!(choose_alpha_mode(&modes, false), Mode::Opaque);
    }

    #[test]
    fn format_prefers_linear() {
        use wgpu::TextureFormat as F;
        let formats = [F::Bgra8UnormSrgb, F::Bgra8Unorm];
        assert_eq!(choose_format(&formats), Some(F::Bgra8Unorm));
        assert_eq!(choose_format(&[F::Rgba8UnormSrgb]), Some(F::Rgba8UnormSrgb));
        assert_eq!(choose_format(&[]), None);
    }

    #[test]
    fn preservation_needs_copy_destination() {
        let trails = TrailSettings::trails();
        let full = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST;
        assert!(supports_preservation(full, &trails));
        assert!(!supports_preservation(
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            &trails
        ));
        assert!(!supports_preservation(full, &TrailSettings::opaque()));
    }
}
