use std::fmt;
use std::ops::{Add, Sub};

/// Continuous world-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Discrete cell coordinate. Also used for shape offsets relative to a mind's anchor cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Saturates at the `i32` range; such cells are never inside a grid.
    pub const fn offset_by(self, delta: GridCoord) -> Self {
        Self {
            col: self.col.saturating_add(delta.col),
            row: self.row.saturating_add(delta.row),
        }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Rounds `world / cell_size` to the nearest cell on each axis.
///
/// Halfway values round away from zero (`f32::round`), so a point exactly on
/// the border between two cells belongs to the cell further from the origin.
/// Values beyond the `i32` range saturate.
pub fn world_to_grid(world: Vec2, cell_size: f32) -> GridCoord {
    GridCoord {
        col: (world.x / cell_size).round() as i32,
        row: (world.y / cell_size).round() as i32,
    }
}

pub fn grid_to_world(coord: GridCoord, cell_size: f32) -> Vec2 {
    Vec2 {
        x: coord.col as f32 * cell_size,
        y: coord.row as f32 * cell_size,
    }
}

/// Nearest grid-aligned world position.
pub fn snap_to_grid(world: Vec2, cell_size: f32) -> Vec2 {
    grid_to_world(world_to_grid(world, cell_size), cell_size)
}
