use std::mem;

use tracing::{debug, info};

use super::registry::MindRegistry;
use super::shape::{MindShape, Rotation};
use super::MindId;
use crate::grid::{
    grid_to_world, snap_to_grid, world_to_grid, GridCoord, GridError, GridOccupancy, Vec2,
};
use crate::handles::{BackingHandle, HandleFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MindState {
    /// Not on the grid: freshly spawned, or dropped where it could not fit.
    Free,
    /// Following the pointer.
    Dragging,
    /// Holding a committed footprint on the grid.
    Placed,
}

/// State captured at drag start and updated on every pointer move.
#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    /// Footprint at drag start, released (handle-guarded) when the drag ends.
    pre_drag_record: Vec<GridCoord>,
    pointer: Vec2,
    /// Ghost anchor minus pointer, kept constant so the ghost never jumps.
    pointer_offset: Vec2,
    ghost_anchor: Vec2,
    ghost_rotation: Rotation,
    candidate: Vec<GridCoord>,
    can_snap: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Lifecycle {
    Free,
    Dragging(DragSession),
    Placed,
}

/// One piece on (or off) the grid and its placement state machine.
///
/// The committed body (`anchor`, `rotation`) only changes when a drag ends.
/// While dragging, the ghost carries the candidate anchor and rotation.
#[derive(Debug, Clone)]
pub struct Mind {
    id: MindId,
    shape: MindShape,
    handles: Vec<BackingHandle>,
    anchor: Vec2,
    rotation: Rotation,
    lifecycle: Lifecycle,
}

impl Mind {
    /// Creates a `Free` mind and requests one backing handle per shape index.
    pub fn spawn(
        id: MindId,
        shape: MindShape,
        anchor: Vec2,
        factory: &mut dyn HandleFactory,
    ) -> Self {
        let handles = (0..shape.cell_count())
            .map(|index| factory.mind_cell_handle(id, index))
            .collect();
        Self {
            id,
            shape,
            handles,
            anchor,
            rotation: Rotation::Deg0,
            lifecycle: Lifecycle::Free,
        }
    }

    pub fn id(&self) -> MindId {
        self.id
    }

    pub fn shape(&self) -> &MindShape {
        &self.shape
    }

    /// Backing handle for each shape index, in shape order.
    pub fn handles(&self) -> &[BackingHandle] {
        &self.handles
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn state(&self) -> MindState {
        match self.lifecycle {
            Lifecycle::Free => MindState::Free,
            Lifecycle::Dragging(_) => MindState::Dragging,
            Lifecycle::Placed => MindState::Placed,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Dragging(_))
    }

    /// Whether the current candidate footprint fits. `None` unless dragging.
    pub fn can_snap(&self) -> Option<bool> {
        self.session().map(|session| session.can_snap)
    }

    pub fn ghost_anchor(&self) -> Option<Vec2> {
        self.session().map(|session| session.ghost_anchor)
    }

    pub fn ghost_rotation(&self) -> Option<Rotation> {
        self.session().map(|session| session.ghost_rotation)
    }

    pub fn candidate_footprint(&self) -> Option<&[GridCoord]> {
        self.session().map(|session| session.candidate.as_slice())
    }

    pub fn pre_drag_record(&self) -> Option<&[GridCoord]> {
        self.session()
            .map(|session| session.pre_drag_record.as_slice())
    }

    /// Cells covered by the committed body, in shape order.
    pub fn footprint(&self, cell_size: f32) -> Vec<GridCoord> {
        self.shape
            .footprint(world_to_grid(self.anchor, cell_size), self.rotation)
    }

    /// Hit test against the committed body: `point` lies within half a cell
    /// of some cell centre.
    pub fn contains_point(&self, point: Vec2, cell_size: f32) -> bool {
        let half = cell_size * 0.5;
        self.shape.offsets().iter().any(|offset| {
            let centre = self.anchor + grid_to_world(self.rotation.apply(*offset), cell_size);
            (point.x - centre.x).abs() <= half && (point.y - centre.y).abs() <= half
        })
    }

    /// `Free`/`Placed` to `Dragging`. Returns false if already dragging.
    pub fn start_drag(&mut self, pointer: Vec2, grid: &GridOccupancy) -> bool {
        if self.is_dragging() {
            return false;
        }
        let from = self.state();
        let mut session = DragSession {
            pre_drag_record: self.footprint(grid.cell_size()),
            pointer,
            pointer_offset: self.anchor - pointer,
            ghost_anchor: self.anchor,
            ghost_rotation: self.rotation,
            candidate: Vec::new(),
            can_snap: false,
        };
        refresh_candidate(self.id, &self.shape, &mut session, grid);
        debug!(
            mind = self.id.0,
            from = ?from,
            record = session.pre_drag_record.len(),
            "drag_started"
        );
        self.lifecycle = Lifecycle::Dragging(session);
        true
    }

    /// Quarter turn of the ghost about the pointer. Ignored unless dragging.
    pub fn rotate(&mut self, grid: &GridOccupancy) -> bool {
        let Lifecycle::Dragging(session) = &mut self.lifecycle else {
            return false;
        };
        session.ghost_rotation = session.ghost_rotation.next();
        session.pointer_offset = Rotation::Deg90.apply_vec(session.pointer_offset);
        refresh_candidate(self.id, &self.shape, session, grid);
        debug!(
            mind = self.id.0,
            degrees = session.ghost_rotation.degrees(),
            can_snap = session.can_snap,
            "ghost_rotated"
        );
        true
    }

    /// Moves the ghost after the pointer and returns the new can-snap flag.
    pub fn drag_to(&mut self, pointer: Vec2, grid: &GridOccupancy) -> Option<bool> {
        let Lifecycle::Dragging(session) = &mut self.lifecycle else {
            return None;
        };
        session.pointer = pointer;
        refresh_candidate(self.id, &self.shape, session, grid);
        Some(session.can_snap)
    }

    /// Re-evaluates the candidate at the last pointer position, e.g. after the
    /// grid changed underneath an active drag.
    pub fn refresh_drag(&mut self, grid: &GridOccupancy) -> Option<bool> {
        let Lifecycle::Dragging(session) = &mut self.lifecycle else {
            return None;
        };
        refresh_candidate(self.id, &self.shape, session, grid);
        Some(session.can_snap)
    }

    /// Finishes the drag: the body takes the ghost's pose, the pre-drag
    /// footprint is released, then the new footprint is committed if it fits.
    /// A mind that does not fit becomes `Free` where it was dropped.
    pub fn end_drag(
        &mut self,
        grid: &mut GridOccupancy,
        registry: &mut MindRegistry,
    ) -> Result<MindState, GridError> {
        let session = match mem::replace(&mut self.lifecycle, Lifecycle::Free) {
            Lifecycle::Dragging(session) => session,
            other => {
                self.lifecycle = other;
                return Ok(self.state());
            }
        };

        self.anchor = session.ghost_anchor;
        self.rotation = session.ghost_rotation;
        self.release_cells(grid, &session.pre_drag_record);
        registry.remove(self.id);

        if self.commit(grid, registry)? {
            self.lifecycle = Lifecycle::Placed;
            info!(
                mind = self.id.0,
                x = self.anchor.x,
                y = self.anchor.y,
                degrees = self.rotation.degrees(),
                "mind_placed"
            );
        } else {
            info!(
                mind = self.id.0,
                x = self.anchor.x,
                y = self.anchor.y,
                "mind_dropped_free"
            );
        }
        Ok(self.state())
    }

    /// Releases the committed footprint and leaves the registry.
    ///
    /// A dragging mind keeps its drag session.
    pub fn release(&mut self, grid: &mut GridOccupancy, registry: &mut MindRegistry) {
        let footprint = self.footprint(grid.cell_size());
        self.release_cells(grid, &footprint);
        registry.remove(self.id);
        if !self.is_dragging() {
            self.lifecycle = Lifecycle::Free;
        }
    }

    /// Commits the body at its current pose if every cell is available.
    ///
    /// Used for the initial placement of spawned minds and for re-admission
    /// after a resize. A dragging mind keeps its drag session either way.
    pub fn place(
        &mut self,
        grid: &mut GridOccupancy,
        registry: &mut MindRegistry,
    ) -> Result<bool, GridError> {
        let placed = self.commit(grid, registry)?;
        if !self.is_dragging() {
            self.lifecycle = if placed {
                Lifecycle::Placed
            } else {
                Lifecycle::Free
            };
        }
        Ok(placed)
    }

    fn commit(
        &self,
        grid: &mut GridOccupancy,
        registry: &mut MindRegistry,
    ) -> Result<bool, GridError> {
        let footprint = self.footprint(grid.cell_size());
        if !footprint.iter().all(|coord| grid.is_available(*coord, self.id)) {
            return Ok(false);
        }

        let cells = footprint.iter().zip(&self.handles);
        for (written, (coord, handle)) in cells.clone().enumerate() {
            if let Err(error) = grid.place(*coord, *handle, self.id) {
                for (coord, handle) in cells.clone().take(written) {
                    grid.release(*coord, *handle);
                }
                return Err(error);
            }
        }
        registry.insert(self.id);
        Ok(true)
    }

    fn release_cells(&self, grid: &mut GridOccupancy, coords: &[GridCoord]) {
        for (coord, handle) in coords.iter().zip(&self.handles) {
            grid.release(*coord, *handle);
        }
    }

    fn session(&self) -> Option<&DragSession> {
        match &self.lifecycle {
            Lifecycle::Dragging(session) => Some(session),
            _ => None,
        }
    }
}

fn refresh_candidate(
    id: MindId,
    shape: &MindShape,
    session: &mut DragSession,
    grid: &GridOccupancy,
) {
    let cell_size = grid.cell_size();
    let target = session.pointer + session.pointer_offset;
    session.candidate = shape.footprint(world_to_grid(target, cell_size), session.ghost_rotation);
    session.can_snap = session
        .candidate
        .iter()
        .all(|coord| grid.is_available(*coord, id));
    session.ghost_anchor = if session.can_snap {
        snap_to_grid(target, cell_size)
    } else {
        target
    };
}
