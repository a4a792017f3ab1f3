use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::coords::GridCoord;
use crate::handles::{BackingHandle, HandleFactory};
use crate::mind::MindId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    occupied: bool,
    owner: Option<MindId>,
    handle: BackingHandle,
}

impl GridCell {
    fn empty(handle: BackingHandle) -> Self {
        Self {
            occupied: false,
            owner: None,
            handle,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn owner(&self) -> Option<MindId> {
        self.owner
    }

    pub fn handle(&self) -> BackingHandle {
        self.handle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {coord} is outside the {cols}x{rows} grid")]
    OutOfBounds {
        coord: GridCoord,
        rows: u32,
        cols: u32,
    },
}

/// Result of a `release` call. Only `Released` changes the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    /// The cell holds a different handle than the caller passed; left untouched.
    Stale,
    OutsideGrid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeReport {
    pub replaced: Vec<MindId>,
    pub unplaceable: Vec<MindId>,
}

/// The owner of the resident minds, driven by `GridOccupancy::resize`.
pub trait ResizeParticipant {
    /// Release every cell the mind currently holds.
    fn release_all(&mut self, grid: &mut GridOccupancy, mind: MindId);

    /// Try to re-admit the mind on the rebuilt grid. `Ok(false)` means its
    /// footprint no longer fits and it is now `Free`.
    fn place_all(&mut self, grid: &mut GridOccupancy, mind: MindId) -> Result<bool, GridError>;
}

/// Row-major cell storage plus the live free-cell counter.
///
/// Cell `(col, row)` exists iff `0 <= col < cols` and `0 <= row < rows`.
/// Default cell handles survive rebuilds so a coordinate keeps its visual
/// object across resizes.
#[derive(Debug)]
pub struct GridOccupancy {
    rows: u32,
    cols: u32,
    cell_size: f32,
    cells: Vec<GridCell>,
    default_handles: HashMap<GridCoord, BackingHandle>,
    free_cell_count: usize,
}

impl GridOccupancy {
    /// An empty 0x0 grid; call `build` to allocate cells.
    pub fn new(cell_size: f32) -> Self {
        Self {
            rows: 0,
            cols: 0,
            cell_size,
            cells: Vec::new(),
            default_handles: HashMap::new(),
            free_cell_count: 0,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn build(&mut self, rows: u32, cols: u32, factory: &mut dyn HandleFactory) {
        let known_before = self.default_handles.len();
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let coord = GridCoord::new(col as i32, row as i32);
                let handle = *self
                    .default_handles
                    .entry(coord)
                    .or_insert_with(|| factory.cell_handle(coord));
                cells.push(GridCell::empty(handle));
            }
        }
        let fresh_handles = self.default_handles.len() - known_before;

        self.rows = rows;
        self.cols = cols;
        self.free_cell_count = cells.len();
        self.cells = cells;
        info!(
            rows,
            cols,
            fresh_handles,
            reused_handles = self.cells.len() - fresh_handles,
            "grid_built"
        );
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.index_of(coord).is_some()
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&GridCell> {
        self.index_of(coord).and_then(|index| self.cells.get(index))
    }

    pub fn owner_of(&self, coord: GridCoord) -> Option<MindId> {
        self.cell(coord).and_then(GridCell::owner)
    }

    /// Whether `requesting` may occupy `coord`.
    ///
    /// Cells outside the grid are never available. A cell the requesting mind
    /// already owns is always available to it, which lets a mind preview
    /// placements overlapping its own pre-drag footprint.
    pub fn is_available(&self, coord: GridCoord, requesting: MindId) -> bool {
        match self.cell(coord) {
            None => false,
            Some(cell) if cell.owner == Some(requesting) => true,
            Some(cell) => !cell.occupied,
        }
    }

    /// Unconditional write; callers must check `is_available` first.
    pub fn place(
        &mut self,
        coord: GridCoord,
        handle: BackingHandle,
        mind: MindId,
    ) -> Result<(), GridError> {
        let out_of_bounds = GridError::OutOfBounds {
            coord,
            rows: self.rows,
            cols: self.cols,
        };
        let Some(cell) = self
            .index_of(coord)
            .and_then(|index| self.cells.get_mut(index))
        else {
            return Err(out_of_bounds);
        };

        let was_free = !cell.occupied;
        if let Some(previous) = cell.owner.filter(|previous| *previous != mind) {
            debug!(
                cell = %coord,
                previous = previous.0,
                mind = mind.0,
                "cell_overwritten"
            );
        }
        cell.occupied = true;
        cell.owner = Some(mind);
        cell.handle = handle;
        if was_free {
            self.free_cell_count -= 1;
        }
        debug_assert_eq!(self.free_cell_count, self.count_free_cells());
        Ok(())
    }

    /// Clears `coord` if its stored handle is `handle`.
    ///
    /// A mismatching handle means another mind has taken the cell since the
    /// caller placed it; the call is ignored.
    pub fn release(&mut self, coord: GridCoord, handle: BackingHandle) -> ReleaseOutcome {
        let Some(index) = self.index_of(coord) else {
            return ReleaseOutcome::OutsideGrid;
        };
        let Some(default_handle) = self.default_handles.get(&coord).copied() else {
            return ReleaseOutcome::OutsideGrid;
        };
        let Some(cell) = self.cells.get_mut(index) else {
            return ReleaseOutcome::OutsideGrid;
        };
        if cell.handle != handle {
            trace!(cell = %coord, "stale_release_ignored");
            return ReleaseOutcome::Stale;
        }

        let was_occupied = cell.occupied;
        *cell = GridCell::empty(default_handle);
        if was_occupied {
            self.free_cell_count += 1;
        }
        debug_assert_eq!(self.free_cell_count, self.count_free_cells());
        ReleaseOutcome::Released
    }

    pub fn empty_cell_count(&self) -> usize {
        self.free_cell_count
    }

    pub fn cells_owned_by(&self, mind: MindId) -> Vec<GridCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.owner == Some(mind))
            .map(|(index, _)| self.coord_of(index))
            .collect()
    }

    /// Rebuilds the grid at a new size and re-admits every resident mind.
    ///
    /// All residents are released before the rebuild and re-placed after it,
    /// both passes in `resident` order. Minds whose footprint no longer fits
    /// are returned in `unplaceable`.
    pub fn resize(
        &mut self,
        rows: u32,
        cols: u32,
        factory: &mut dyn HandleFactory,
        resident: &[MindId],
        participant: &mut dyn ResizeParticipant,
    ) -> Result<ResizeReport, GridError> {
        info!(
            from_rows = self.rows,
            from_cols = self.cols,
            rows,
            cols,
            resident = resident.len(),
            "grid_resize_started"
        );
        for &mind in resident {
            participant.release_all(self, mind);
        }

        self.build(rows, cols, factory);

        let mut report = ResizeReport::default();
        for &mind in resident {
            if participant.place_all(self, mind)? {
                report.replaced.push(mind);
            } else {
                warn!(mind = mind.0, rows, cols, "mind_unplaceable_after_resize");
                report.unplaceable.push(mind);
            }
        }
        info!(
            replaced = report.replaced.len(),
            unplaceable = report.unplaceable.len(),
            empty_cells = self.free_cell_count,
            "grid_resize_finished"
        );
        Ok(report)
    }

    fn index_of(&self, coord: GridCoord) -> Option<usize> {
        let col = u32::try_from(coord.col).ok()?;
        let row = u32::try_from(coord.row).ok()?;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    fn coord_of(&self, index: usize) -> GridCoord {
        let cols = self.cols.max(1) as usize;
        GridCoord::new((index % cols) as i32, (index / cols) as i32)
    }

    pub(crate) fn count_free_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.occupied).count()
    }
}
