//! Shared value types and named configuration for the trailcubes demo.

pub mod config;
mod types;

pub use config::{ConfigError, SceneConfig};
pub use types::{Color, PixelSize};
