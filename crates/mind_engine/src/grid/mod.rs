mod coords;
mod occupancy;

pub use coords::{grid_to_world, snap_to_grid, world_to_grid, GridCoord, Vec2};
pub use occupancy::{
    GridCell, GridError, GridOccupancy, ReleaseOutcome, ResizeParticipant, ResizeReport,
};
