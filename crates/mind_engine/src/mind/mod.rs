mod placement;
mod registry;
mod shape;

pub use placement::{Mind, MindState};
pub use registry::MindRegistry;
pub use shape::{MindShape, Rotation, ShapeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MindId(pub u64);

/// Hands out mind ids from 0 upward. Ids are never reused.
#[derive(Debug, Default)]
pub struct MindIdAllocator {
    next: u64,
}

impl MindIdAllocator {
    pub fn allocate(&mut self) -> MindId {
        let id = MindId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
