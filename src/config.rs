use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Color, DEFAULT_DRAW};

pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 320;
pub const DEFAULT_CELL_SIZE: u32 = 20;
pub const MIN_CELL_SIZE: u32 = 5;
pub const MAX_CELL_SIZE: u32 = 50;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Canvas dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Cell size {0} is outside [5, 50]")]
    CellSizeOutOfRange(u32),
    #[error("Invalid sketchpad config: {0}")]
    Parse(String),
}

/// Constructor parameters for a sketchpad. Missing JSON fields take their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    /// Drawing color selected at startup.
    pub color: Color,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            color: DEFAULT_DRAW,
        }
    }
}

impl SketchConfig {
    /// Parse and validate a host-supplied JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if !(MIN_CELL_SIZE..=MAX_CELL_SIZE).contains(&self.cell_size) {
            return Err(ConfigError::CellSizeOutOfRange(self.cell_size));
        }
        Ok(())
    }
}

/// Clamp user-entered cell sizes into the supported range.
pub fn clamp_cell_size(size: i64) -> u32 {
    size.clamp(MIN_CELL_SIZE as i64, MAX_CELL_SIZE as i64) as u32
}
