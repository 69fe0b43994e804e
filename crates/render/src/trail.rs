use trailcubes_common::Color;

/// Output surface settings that decide whether frames accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailSettings {
    /// Keep the drawing buffer between frames instead of letting the platform discard it.
    pub preserve_drawing_buffer: bool,
    /// Transparent background.
    pub alpha: bool,
    /// Clear color before every frame.
    pub auto_clear_color: bool,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self::trails()
    }
}

/// How the color attachment starts a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorLoad {
    /// Draw over whatever the buffer already holds.
    Keep,
    /// Start from this color.
    Clear(Color),
}

impl TrailSettings {
    /// Preserved, transparent, never auto-cleared.
    pub const fn trails() -> Self {
        Self {
            preserve_drawing_buffer: true,
            alpha: true,
            auto_clear_color: false,
        }
    }

    /// Ordinary renderer: every frame starts clean.
    pub const fn opaque() -> Self {
        Self {
            preserve_drawing_buffer: false,
            alpha: false,
            auto_clear_color: true,
        }
    }

    pub fn clear_color(&self) -> Color {
        if self.alpha {
            Color::TRANSPARENT
        } else {
            Color::rgb(0.0, 0.0, 0.0)
        }
    }

    /// Whether frames pile up on `surface_preserves` surfaces.
    pub fn accumulates(&self, surface_preserves: bool) -> bool {
        self.preserve_drawing_buffer && surface_preserves && !self.auto_clear_color
    }

    /// Load op for the next frame. `buffer_fresh` is true when the buffer was
    /// just allocated or a clear was requested.
    pub fn color_load(&self, surface_preserves: bool, buffer_fresh: bool) -> ColorLoad {
        if self.accumulates(surface_preserves) && !buffer_fresh {
            ColorLoad::Keep
        } else {
            ColorLoad::Clear(self.clear_color())
        }
    }
}
