use thiserror::Error;

use crate::grid::{GridCoord, Vec2};

/// Quarter-turn rotation, counter-clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// The next quarter turn, wrapping at 360 degrees.
    pub const fn next(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub const fn apply(self, offset: GridCoord) -> GridCoord {
        let GridCoord { col: x, row: y } = offset;
        match self {
            Self::Deg0 => GridCoord::new(x, y),
            Self::Deg90 => GridCoord::new(y.saturating_neg(), x),
            Self::Deg180 => GridCoord::new(x.saturating_neg(), y.saturating_neg()),
            Self::Deg270 => GridCoord::new(y, x.saturating_neg()),
        }
    }

    pub fn apply_vec(self, v: Vec2) -> Vec2 {
        match self {
            Self::Deg0 => v,
            Self::Deg90 => Vec2::new(-v.y, v.x),
            Self::Deg180 => Vec2::new(-v.x, -v.y),
            Self::Deg270 => Vec2::new(v.y, -v.x),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("a mind shape needs at least one cell")]
    Empty,
}

/// Ordered cell offsets relative to a mind's anchor cell.
///
/// Geometry is not validated: duplicate offsets are accepted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindShape {
    offsets: Vec<GridCoord>,
}

impl MindShape {
    pub fn new(offsets: Vec<GridCoord>) -> Result<Self, ShapeError> {
        if offsets.is_empty() {
            return Err(ShapeError::Empty);
        }
        Ok(Self { offsets })
    }

    pub fn offsets(&self) -> &[GridCoord] {
        &self.offsets
    }

    pub fn cell_count(&self) -> usize {
        self.offsets.len()
    }

    /// Grid cells covered when the anchor sits on `anchor`, in shape order.
    pub fn footprint(&self, anchor: GridCoord, rotation: Rotation) -> Vec<GridCoord> {
        self.offsets
            .iter()
            .map(|offset| anchor.offset_by(rotation.apply(*offset)))
            .collect()
    }
}
