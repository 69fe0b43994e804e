//! wgpu render backend for the cube demo.
//!
//! Draws the cube group with a Phong-style directional light. When trails are
//! on and the surface allows it, frames are drawn into an offscreen texture
//! that is never cleared, then copied to the swapchain image.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Depth is cleared every frame; only color accumulates.
//! - A surface that cannot take the copy gets cleared frames instead (no trails, no error).

mod gpu;
mod shaders;
mod surface;

pub use gpu::{PresentFrame, WgpuRenderer};
pub use surface::{GpuSurface, choose_alpha_mode, choose_format, supports_preservation};
