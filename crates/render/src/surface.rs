use trailcubes_common::PixelSize;

/// A drawable target with a backing buffer that may lag its displayed size.
pub trait RenderSurface {
    /// Size the surface is shown at, in physical pixels.
    fn display_size(&self) -> PixelSize;

    /// Size of the backing buffer that rendering writes to.
    fn buffer_size(&self) -> PixelSize;

    /// Reallocate the backing buffer. Accumulated content is lost.
    fn resize_buffer(&mut self, size: PixelSize);

    /// Whether buffer content survives between frames.
    fn preserves_buffer(&self) -> bool;
}

/// In-memory surface for headless runs and tests.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    display: PixelSize,
    buffer: PixelSize,
    preserves: bool,
    resizes: u64,
}

impl HeadlessSurface {
    /// A surface whose buffer has not been sized yet, like a fresh canvas.
    pub fn new(display: PixelSize) -> Self {
        Self {
            display,
            buffer: PixelSize::default(),
            preserves: true,
            resizes: 0,
        }
    }

    /// Simulate a surface that cannot keep its buffer between frames.
    pub fn without_preservation(mut self) -> Self {
        self.preserves = false;
        self
    }

    /// Change the displayed size, as a window or layout change would.
    pub fn set_display_size(&mut self, size: PixelSize) {
        self.display = size;
    }

    pub fn resize_count(&self) -> u64 {
        self.resizes
    }
}

impl RenderSurface for HeadlessSurface {
    fn display_size(&self) -> PixelSize {
        self.display
    }

    fn buffer_size(&self) -> PixelSize {
        self.buffer
    }

    fn resize_buffer(&mut self, size: PixelSize) {
        self.buffer = size;
        self.resizes += 1;
    }

    fn preserves_buffer(&self) -> bool {
        self.preserves
    }
}
