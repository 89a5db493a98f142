//! Drag-to-rotate interaction
//!
//! Single-pointer horizontal drags become yaw on the placed dish. Inert
//! until something is placed, no inertia, and pointers beyond the first
//! are ignored outright.

use cgmath::Rad;

/// Yaw radians per pixel of horizontal drag.
pub const DRAG_SENSITIVITY: f32 = 0.01;

pub struct DragRotator {
    sensitivity: f32,
    active_pointer: Option<u64>,
    last_x: f32,
}

impl DragRotator {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            active_pointer: None,
            last_x: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active_pointer.is_some()
    }

    /// Starts tracking a drag. Ignored unless an object is placed, and
    /// ignored for any pointer while another is already down.
    pub fn begin(&mut self, pointer: u64, x: f32, placed: bool) {
        if !placed || self.active_pointer.is_some() {
            return;
        }
        self.active_pointer = Some(pointer);
        self.last_x = x;
    }

    /// Advances the drag, returning the yaw delta to apply.
    pub fn drag(&mut self, pointer: u64, x: f32) -> Option<Rad<f32>> {
        if self.active_pointer != Some(pointer) {
            return None;
        }
        let delta = (x - self.last_x) * self.sensitivity;
        self.last_x = x;
        Some(Rad(delta))
    }

    /// Ends the drag for this pointer, if it owns the gesture.
    pub fn end(&mut self, pointer: u64) {
        if self.active_pointer == Some(pointer) {
            self.active_pointer = None;
        }
    }

    /// Drops any in-flight gesture (session stop, object lost).
    pub fn cancel(&mut self) {
        self.active_pointer = None;
    }
}

impl Default for DragRotator {
    fn default() -> Self {
        Self::new(DRAG_SENSITIVITY)
    }
}
