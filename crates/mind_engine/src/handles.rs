use crate::grid::GridCoord;
use crate::mind::MindId;

/// Opaque identity token for the visual object behind a cell.
///
/// The engine only ever compares handles; it never looks inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackingHandle(pub u64);

/// Supplies backing handles for grid cells and for the cells of each mind.
pub trait HandleFactory {
    /// Called once per coordinate the first time the grid grows to cover it.
    fn cell_handle(&mut self, coord: GridCoord) -> BackingHandle;

    /// Called once per shape index when a mind is spawned.
    fn mind_cell_handle(&mut self, mind: MindId, index: usize) -> BackingHandle;
}

/// Issues unique, increasing handles. Suitable for headless runs and tests.
#[derive(Debug, Default)]
pub struct SequentialHandles {
    next: u64,
}

impl SequentialHandles {
    pub fn issued(&self) -> u64 {
        self.next
    }

    fn issue(&mut self) -> BackingHandle {
        let handle = BackingHandle(self.next);
        self.next = self.next.saturating_add(1);
        handle
    }
}

impl HandleFactory for SequentialHandles {
    fn cell_handle(&mut self, _coord: GridCoord) -> BackingHandle {
        self.issue()
    }

    fn mind_cell_handle(&mut self, _mind: MindId, _index: usize) -> BackingHandle {
        self.issue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_handles_never_repeat() {
        let mut factory = SequentialHandles::default();
        let a = factory.cell_handle(GridCoord::new(0, 0));
        let b = factory.mind_cell_handle(MindId(0), 0);
        let c = factory.cell_handle(GridCoord::new(0, 0));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(factory.issued(), 3);
    }
}
