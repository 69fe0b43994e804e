use glam::Vec2;
use trailcubes_input::{InputEvent, TouchPoint};
use winit::event::TouchPhase;

/// Active touch contacts, oldest first, so the first finger down stays primary.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<TouchPoint>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[TouchPoint] {
        &self.active
    }

    /// Record one winit touch update. Returns a move event when contacts moved.
    pub fn update(&mut self, id: u64, phase: TouchPhase, client: Vec2) -> Option<InputEvent> {
        match phase {
            TouchPhase::Started => {
                self.active.retain(|t| t.id != id);
                self.active.push(TouchPoint { id, client });
                None
            }
            TouchPhase::Moved => {
                match self.active.iter_mut().find(|t| t.id == id) {
                    Some(t) => t.client = client,
                    None => self.active.push(TouchPoint { id, client }),
                }
                Some(InputEvent::TouchMove {
                    touches: self.active.clone(),
                })
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active.retain(|t| t.id != id);
                None
            }
        }
    }
}
