use std::collections::BTreeSet;

use super::MindId;

/// Ids of the minds currently placed on the grid.
///
/// Iteration is in ascending id order, which is also the order resize
/// re-admits minds in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MindRegistry {
    placed: BTreeSet<MindId>,
}

impl MindRegistry {
    pub fn insert(&mut self, mind: MindId) -> bool {
        self.placed.insert(mind)
    }

    pub fn remove(&mut self, mind: MindId) -> bool {
        self.placed.remove(&mind)
    }

    pub fn contains(&self, mind: MindId) -> bool {
        self.placed.contains(&mind)
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn ids(&self) -> Vec<MindId> {
        self.placed.iter().copied().collect()
    }
}
