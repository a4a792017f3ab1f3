use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::config::{ConfigError, GridConfig};
use crate::grid::{GridError, GridOccupancy, ResizeParticipant, ResizeReport, Vec2};
use crate::handles::{HandleFactory, SequentialHandles};
use crate::input::InputSnapshot;
use crate::mind::{Mind, MindId, MindIdAllocator, MindRegistry, MindShape, MindState};

/// What happened during one `Board::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub rotated: bool,
    pub drag_started: Option<MindId>,
    /// Can-snap flag of the dragging mind after this tick's move.
    pub can_snap: Option<bool>,
    pub drag_ended: Option<(MindId, MindState)>,
}

/// Owns the grid, the registry and every mind, and routes per-tick input to
/// the one mind being dragged.
pub struct Board {
    config: GridConfig,
    grid: GridOccupancy,
    registry: MindRegistry,
    minds: BTreeMap<MindId, Mind>,
    z_order: HashMap<MindId, u64>,
    next_z: u64,
    allocator: MindIdAllocator,
    factory: Box<dyn HandleFactory>,
    dragging: Option<MindId>,
}

impl Board {
    pub fn new(
        config: GridConfig,
        mut factory: Box<dyn HandleFactory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut grid = GridOccupancy::new(config.cell_size);
        grid.build(config.rows, config.cols, factory.as_mut());
        Ok(Self {
            config,
            grid,
            registry: MindRegistry::default(),
            minds: BTreeMap::new(),
            z_order: HashMap::new(),
            next_z: 0,
            allocator: MindIdAllocator::default(),
            factory,
            dragging: None,
        })
    }

    pub fn with_sequential_handles(config: GridConfig) -> Result<Self, ConfigError> {
        Self::new(config, Box::new(SequentialHandles::default()))
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn grid(&self) -> &GridOccupancy {
        &self.grid
    }

    pub fn registry(&self) -> &MindRegistry {
        &self.registry
    }

    pub fn mind(&self, id: MindId) -> Option<&Mind> {
        self.minds.get(&id)
    }

    pub fn minds(&self) -> impl Iterator<Item = &Mind> {
        self.minds.values()
    }

    pub fn dragging(&self) -> Option<MindId> {
        self.dragging
    }

    pub fn empty_cell_count(&self) -> usize {
        self.grid.empty_cell_count()
    }

    /// Adds a mind anchored at `anchor` and tries to place it there.
    pub fn spawn_mind(&mut self, shape: MindShape, anchor: Vec2) -> Result<MindId, GridError> {
        let id = self.allocator.allocate();
        let mut mind = Mind::spawn(id, shape, anchor, self.factory.as_mut());
        let placed = mind.place(&mut self.grid, &mut self.registry)?;
        info!(
            mind = id.0,
            cells = mind.shape().cell_count(),
            placed,
            "mind_spawned"
        );
        self.minds.insert(id, mind);
        self.raise(id);
        Ok(id)
    }

    /// Releases a mind's committed footprint without dragging it.
    pub fn release_mind(&mut self, id: MindId) -> bool {
        let Some(mind) = self.minds.get_mut(&id) else {
            return false;
        };
        mind.release(&mut self.grid, &mut self.registry);
        true
    }

    /// One tick: rotate, then press, then move, then release.
    pub fn update(&mut self, input: &InputSnapshot) -> Result<TickOutcome, GridError> {
        let mut outcome = TickOutcome::default();

        if input.rotate_pressed() {
            if let Some(mind) = self.dragging.and_then(|id| self.minds.get_mut(&id)) {
                outcome.rotated = mind.rotate(&self.grid);
            }
        }

        if input.pointer_pressed() && self.dragging.is_none() {
            if let Some(pointer) = input.pointer_world() {
                if let Some(id) = self.pick_topmost_mind_at(pointer) {
                    self.begin_drag(id, pointer);
                    outcome.drag_started = self.dragging;
                }
            }
        }

        if let (Some(id), Some(pointer)) = (self.dragging, input.pointer_world()) {
            if let Some(mind) = self.minds.get_mut(&id) {
                outcome.can_snap = mind.drag_to(pointer, &self.grid);
            }
        }

        if input.pointer_released() {
            if let Some(id) = self.dragging.take() {
                if let Some(mind) = self.minds.get_mut(&id) {
                    let state = mind.end_drag(&mut self.grid, &mut self.registry)?;
                    outcome.drag_ended = Some((id, state));
                }
            }
        }

        Ok(outcome)
    }

    /// The mind under `point` with the highest z-order. Starting a drag
    /// raises a mind to the top.
    pub fn pick_topmost_mind_at(&self, point: Vec2) -> Option<MindId> {
        self.pick_topmost_mind_at_with(point, |mind| {
            self.z_order.get(&mind.id()).copied().unwrap_or_default()
        })
    }

    /// Like `pick_topmost_mind_at`, ranking overlapping minds by `key`.
    pub fn pick_topmost_mind_at_with<K, F>(&self, point: Vec2, mut key: F) -> Option<MindId>
    where
        K: Ord,
        F: FnMut(&Mind) -> K,
    {
        let cell_size = self.grid.cell_size();
        self.minds
            .values()
            .filter(|mind| mind.contains_point(point, cell_size))
            .max_by_key(|mind| key(mind))
            .map(Mind::id)
    }

    /// Rebuilds the grid at `rows` x `cols` and re-admits resident minds in
    /// ascending id order.
    pub fn resize(&mut self, rows: u32, cols: u32) -> Result<ResizeReport, GridError> {
        let resident = self.registry.ids();
        let mut participant = ResidentMinds {
            minds: &mut self.minds,
            registry: &mut self.registry,
        };
        let report = self.grid.resize(
            rows,
            cols,
            self.factory.as_mut(),
            &resident,
            &mut participant,
        )?;
        self.config.rows = rows;
        self.config.cols = cols;

        if let Some(mind) = self.dragging.and_then(|id| self.minds.get_mut(&id)) {
            mind.refresh_drag(&self.grid);
        }
        Ok(report)
    }

    fn begin_drag(&mut self, id: MindId, pointer: Vec2) {
        let Some(mind) = self.minds.get_mut(&id) else {
            return;
        };
        if mind.start_drag(pointer, &self.grid) {
            self.dragging = Some(id);
            self.raise(id);
        }
    }

    fn raise(&mut self, id: MindId) {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(1);
        self.z_order.insert(id, z);
        debug!(mind = id.0, z, "mind_raised");
    }
}

struct ResidentMinds<'a> {
    minds: &'a mut BTreeMap<MindId, Mind>,
    registry: &'a mut MindRegistry,
}

impl ResizeParticipant for ResidentMinds<'_> {
    fn release_all(&mut self, grid: &mut GridOccupancy, mind: MindId) {
        if let Some(mind) = self.minds.get_mut(&mind) {
            mind.release(grid, self.registry);
        }
    }

    fn place_all(&mut self, grid: &mut GridOccupancy, mind: MindId) -> Result<bool, GridError> {
        match self.minds.get_mut(&mind) {
            Some(mind) => mind.place(grid, self.registry),
            None => Ok(false),
        }
    }
}
