use glam::Vec2;
use trailcubes_common::PixelSize;

/// Where the canvas sits on screen, in client units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect anchored at the client origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Displayed rect plus backing buffer size: all the mapper needs from the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub rect: CanvasRect,
    pub buffer: PixelSize,
}

impl CanvasGeometry {
    pub fn new(rect: CanvasRect, buffer: PixelSize) -> Self {
        Self { rect, buffer }
    }

    /// A canvas at the origin whose displayed size equals its buffer size.
    pub fn unscaled(buffer: PixelSize) -> Self {
        Self::new(
            CanvasRect::from_size(buffer.width as f32, buffer.height as f32),
            buffer,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.rect.is_empty() || self.buffer.is_empty()
    }
}

/// Client coordinates to canvas buffer pixels.
pub fn canvas_relative_position(client: Vec2, canvas: &CanvasGeometry) -> Vec2 {
    let rect = canvas.rect;
    Vec2::new(
        (client.x - rect.left) * canvas.buffer.width as f32 / rect.width,
        (client.y - rect.top) * canvas.buffer.height as f32 / rect.height,
    )
}

/// Buffer pixels to normalized device coordinates, flipping y so up is positive.
pub fn to_ndc(pixel: Vec2, buffer: PixelSize) -> Vec2 {
    Vec2::new(
        pixel.x / buffer.width as f32 * 2.0 - 1.0,
        pixel.y / buffer.height as f32 * -2.0 + 1.0,
    )
}
