use crate::grid::Vec2;

/// Pointer state for one tick, already projected into world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pointer_world: Option<Vec2>,
    pointer_pressed: bool,
    pointer_released: bool,
    rotate_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pointer_world(mut self, pointer_world: Option<Vec2>) -> Self {
        self.pointer_world = pointer_world;
        self
    }

    pub fn with_pointer_pressed(mut self, pointer_pressed: bool) -> Self {
        self.pointer_pressed = pointer_pressed;
        self
    }

    pub fn with_pointer_released(mut self, pointer_released: bool) -> Self {
        self.pointer_released = pointer_released;
        self
    }

    pub fn with_rotate_pressed(mut self, rotate_pressed: bool) -> Self {
        self.rotate_pressed = rotate_pressed;
        self
    }

    pub fn pointer_world(&self) -> Option<Vec2> {
        self.pointer_world
    }

    pub fn pointer_pressed(&self) -> bool {
        self.pointer_pressed
    }

    pub fn pointer_released(&self) -> bool {
        self.pointer_released
    }

    pub fn rotate_pressed(&self) -> bool {
        self.rotate_pressed
    }
}
