//! Rendering contracts: surfaces, trail settings and the renderer trait.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Color accumulates only when preservation is requested, supported by the
//!   surface, and auto-clear is off. Otherwise trails silently disappear.
//!
//! A debug text renderer backs headless runs and tests; the wgpu backend
//! lives in its own crate behind the same trait.

mod renderer;
mod surface;
mod trail;

pub use renderer::{DebugTextRenderer, RenderError, Renderer};
pub use surface::{HeadlessSurface, RenderSurface};
pub use trail::{ColorLoad, TrailSettings};
