use glam::Vec2;

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub client: Vec2,
}

/// Raw input the mapper understands. Hosts translate their native events into these.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a client-space position.
    PointerMove { client: Vec2 },
    /// Touch contacts moved. Ordered with the primary contact first.
    TouchMove { touches: Vec<TouchPoint> },
}

impl InputEvent {
    pub fn pointer(x: f32, y: f32) -> Self {
        Self::PointerMove {
            client: Vec2::new(x, y),
        }
    }

    /// Client position that drives the pointer, if any.
    pub fn primary_client(&self) -> Option<Vec2> {
        match self {
            Self::PointerMove { client } => Some(*client),
            Self::TouchMove { touches } => touches.first().map(|t| t.client),
        }
    }

    /// Whether the host should suppress its default handling (scroll, zoom).
    pub fn wants_default_suppressed(&self) -> bool {
        matches!(self, Self::TouchMove { .. })
    }
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Pointer state was overwritten.
    pub updated: bool,
    /// Host should cancel the platform's default gesture.
    pub prevent_default: bool,
}
