use std::collections::HashSet;

use glam::Vec2;

/// DOM `keyCode` values for the steering keys.
pub mod keys {
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
}

/// Input event types the engine understands.
/// Carries no game-specific meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
}

/// A queue of input events plus the held state they imply.
///
/// JS pushes events as they happen; Rust reads them each tick and drains the
/// queue after the frame. Held keys and the pressed pointer survive `drain`,
/// so a game can poll "is left held?" on every fixed step.
pub struct InputQueue {
    events: Vec<InputEvent>,
    keys_down: HashSet<u32>,
    pointer: Option<Vec2>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
            keys_down: HashSet::new(),
            pointer: None,
        }
    }

    /// Push a new input event (called from JS via wasm-bindgen).
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                self.keys_down.insert(key_code);
            }
            InputEvent::KeyUp { key_code } => {
                self.keys_down.remove(&key_code);
            }
            InputEvent::PointerDown { x, y } => self.pointer = Some(Vec2::new(x, y)),
            InputEvent::PointerMove { x, y } => {
                // Hover without a press does not steer.
                if self.pointer.is_some() {
                    self.pointer = Some(Vec2::new(x, y));
                }
            }
            InputEvent::PointerUp { .. } => self.pointer = None,
        }
        self.events.push(event);
    }

    /// Drain all pending events. Held state is kept.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_key_down(&self, key_code: u32) -> bool {
        self.keys_down.contains(&key_code)
    }

    /// Position of the pressed pointer, if any.
    pub fn pointer_held(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Forget held keys and the pointer (e.g. on window blur).
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.pointer = None;
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
