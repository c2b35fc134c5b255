//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! Keys and mouse buttons are level-triggered through `is_held` and
//! edge-triggered through `is_just_pressed` / `is_just_released`. Edges are
//! cleared by `end_frame()` once the frame has handled its shortcuts.
//!
//! Taps are not buffered here: the game forwards them to the engine as soon as
//! they arrive. This module only tracks the pointer position and the set of
//! fingers currently on the screen.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    /// Toggle the debug panel.
    F3,
    /// Cycle the fidelity tier.
    F5,
    /// Reset the game.
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,
    mouse_just_released: HashSet<MouseBtn>,

    touches: HashMap<u64, (f64, f64)>,

    pub mouse_position: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            mouse_just_released: HashSet::new(),
            touches: HashMap::new(),
            mouse_position: (0.0, 0.0),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Returns true when this is a fresh press rather than a repeat.
    pub fn mouse_down(&mut self, btn: MouseBtn) -> bool {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
            true
        } else {
            false
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.mouse_just_released.insert(btn);
        }
    }

    pub fn touch_started(&mut self, id: u64, position: (f64, f64)) {
        self.touches.insert(id, position);
    }

    pub fn touch_moved(&mut self, id: u64, position: (f64, f64)) {
        if let Some(slot) = self.touches.get_mut(&id) {
            *slot = position;
        }
    }

    pub fn touch_ended(&mut self, id: u64) {
        self.touches.remove(&id);
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse_just_released.contains(&btn)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
