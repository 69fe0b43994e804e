//! Input mapping: pointer and touch client coordinates into scene space.
//!
//! # Invariants
//! - Mapped positions always lie on the z=0 plane.
//! - A touch event without contacts never mutates pointer state.
//! - Only the latest event matters; nothing is queued.

pub mod canvas;
pub mod event;
mod mapper;

pub use canvas::{CanvasGeometry, CanvasRect};
pub use event::{EventOutcome, InputEvent, TouchPoint};
pub use mapper::{InputMapper, PointerState, unproject};
