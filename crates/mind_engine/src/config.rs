use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GRID_ROWS: u32 = 5;
pub const DEFAULT_GRID_COLS: u32 = 5;
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Grid dimensions and cell size, read at build and resize time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            cols: DEFAULT_GRID_COLS,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("cell size must be a finite number greater than zero, got {cell_size}")]
    InvalidCellSize { cell_size: f32 },
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }
        Ok(())
    }
}
