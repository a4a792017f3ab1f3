//! Grid occupancy and piece placement for the Hexa Mind puzzle.
//!
//! Minds are polyomino pieces dragged onto a fixed-size grid. The grid
//! tracks which mind owns each cell; each mind runs a small state machine
//! (free, dragging, placed) that validates candidate footprints against the
//! grid and commits or releases its cells.

pub mod board;
pub mod config;
pub mod grid;
mod handles;
mod input;
pub mod mind;

pub use board::{Board, TickOutcome};
pub use config::{
    ConfigError, GridConfig, DEFAULT_CELL_SIZE, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS,
};
pub use grid::{
    grid_to_world, snap_to_grid, world_to_grid, GridCell, GridCoord, GridError, GridOccupancy,
    ReleaseOutcome, ResizeParticipant, ResizeReport, Vec2,
};
pub use handles::{BackingHandle, HandleFactory, SequentialHandles};
pub use input::InputSnapshot;
pub use mind::{
    Mind, MindId, MindIdAllocator, MindRegistry, MindShape, MindState, Rotation, ShapeError,
};
