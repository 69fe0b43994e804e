use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Uniform scale applied to the cube group at creation.
pub const GROUP_SCALE: f32 = 0.1;

/// Y-axis rotation rate relative to the X axis. Chosen for visual asymmetry only.
pub const ROTATION_Y_RATIO: f32 = 1.11;

/// Distance of each cube from the group origin, before scaling.
pub const CUBE_OFFSET: f32 = 2.0;

/// Edge length of the cube mesh.
pub const CUBE_SIZE: f32 = 1.0;

/// Initial orthographic bounds. Left/right are replaced on the first resize.
pub const CAMERA_LEFT: f32 = -2.0;
pub const CAMERA_RIGHT: f32 = 2.0;
pub const CAMERA_TOP: f32 = 1.0;
pub const CAMERA_BOTTOM: f32 = -1.0;
pub const CAMERA_NEAR: f32 = -1.0;
pub const CAMERA_FAR: f32 = 1.0;

pub const MILLIS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the scene. Defaults are the named constants above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub group_scale: f32,
    pub rotation_y_ratio: f32,
    pub cube_offset: f32,
    pub cube_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            group_scale: GROUP_SCALE,
            rotation_y_ratio: ROTATION_Y_RATIO,
            cube_offset: CUBE_OFFSET,
            cube_size: CUBE_SIZE,
        }
    }
}

impl SceneConfig {
    /// Parse from JSON. Missing fields fall back to defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.group_scale.is_finite() && self.group_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "group_scale must be positive, got {}",
                self.group_scale
            )));
        }
        if !self.rotation_y_ratio.is_finite() {
            return Err(ConfigError::Invalid(
                "rotation_y_ratio must be finite".into(),
            ));
        }
        if !(self.cube_offset.is_finite() && self.cube_offset > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cube_offset must be positive, got {}",
                self.cube_offset
            )));
        }
        if !(self.cube_size.is_finite() && self.cube_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cube_size must be positive, got {}",
                self.cube_size
            )));
        }
        Ok(())
    }
}
