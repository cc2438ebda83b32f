//! Keyboard and mouse input state.
//!
//! [`InputSnapshot`] is fed raw key/button/cursor events by the host and polled
//! by scripts. Keys are named by their logical value (`"a"`, `"ArrowLeft"`,
//! `"Space"`); mouse buttons by number (0 left, 1 middle, 2 right).
//!
//! Edge state ("pressed this frame") is cleared by [`InputSnapshot::end_frame`],
//! which the game loop calls after each simulated frame.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

use crate::math::Vec2;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: went down this frame
/// - `just_released`: went up this frame
#[derive(Debug, Clone)]
pub struct ButtonSet<T: Eq + Hash> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Clone> ButtonSet<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed<Q>(&self, input: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.pressed.contains(input)
    }

    pub fn just_pressed<Q>(&self, input: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.just_pressed.contains(input)
    }

    pub fn just_released<Q>(&self, input: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.just_released.contains(input)
    }

    /// Auto-repeat presses of a held input do not re-trigger `just_pressed`.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input.clone()) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    pub fn reset(&mut self) {
        self.pressed.clear();
        self.clear_just();
    }
}

impl<T: Eq + Hash + Clone> Default for ButtonSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Polled input state for one frame.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: ButtonSet<String>,
    mouse: ButtonSet<u8>,
    cursor: Vec2,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Host side ────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: impl Into<String>) {
        self.keys.press(key.into());
    }

    pub fn key_up(&mut self, key: impl Into<String>) {
        self.keys.release(key.into());
    }

    pub fn mouse_down(&mut self, button: u8) {
        self.mouse.press(button);
    }

    pub fn mouse_up(&mut self, button: u8) {
        self.mouse.release(button);
    }

    /// Cursor position in viewport pixels.
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.cursor = Vec2::new(x, y);
    }

    /// Clear per-frame edge state.
    pub fn end_frame(&mut self) {
        self.keys.clear_just();
        self.mouse.clear_just();
    }

    /// Forget everything, e.g. when the viewport loses focus.
    pub fn reset(&mut self) {
        self.keys.reset();
        self.mouse.reset();
    }

    // ── Polling ──────────────────────────────────────────────────────

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys.pressed(key)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys.just_pressed(key)
    }

    pub fn is_key_released(&self, key: &str) -> bool {
        self.keys.just_released(key)
    }

    pub fn is_mouse_button_down(&self, button: u8) -> bool {
        self.mouse.pressed(&button)
    }

    pub fn is_mouse_button_pressed(&self, button: u8) -> bool {
        self.mouse.just_pressed(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.cursor
    }
}

// ── winit bridge ─────────────────────────────────────────────────────────

#[cfg(feature = "winit")]
mod winit_bridge {
    use winit::event::{ElementState, MouseButton, WindowEvent};
    use winit::keyboard::Key;

    use super::InputSnapshot;

    fn key_name(key: &Key) -> Option<String> {
        match key {
            Key::Named(named) => Some(format!("{named:?}")),
            Key::Character(text) => Some(text.to_string()),
            _ => None,
        }
    }

    fn button_index(button: MouseButton) -> u8 {
        match button {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(n) => n.min(u8::MAX as u16) as u8,
        }
    }

    impl InputSnapshot {
        /// Feed a winit window event. Returns true if the event was consumed.
        pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
            match event {
                WindowEvent::KeyboardInput { event, .. } => {
                    let Some(name) = key_name(&event.logical_key) else {
                        return false;
                    };
                    match event.state {
                        ElementState::Pressed => self.key_down(name),
                        ElementState::Released => self.key_up(name),
                    }
                    true
                }
                WindowEvent::MouseInput { button, state, .. } => {
                    match state {
                        ElementState::Pressed => self.mouse_down(button_index(*button)),
                        ElementState::Released => self.mouse_up(button_index(*button)),
                    }
                    true
                }
                WindowEvent::CursorMoved { position, .. } => {
                    self.mouse_move(position.x as f32, position.y as f32);
                    true
                }
                WindowEvent::Focused(false) => {
                    self.reset();
                    true
                }
                _ => false,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use winit::keyboard::NamedKey;

        #[test]
        fn maps_keys_and_buttons() {
            assert_eq!(key_name(&Key::Named(NamedKey::ArrowLeft)).as_deref(), Some("ArrowLeft"));
            assert_eq!(key_name(&Key::Character("w".into())).as_deref(), Some("w"));
            assert_eq!(button_index(MouseButton::Right), 2);
            assert_eq!(button_index(MouseButton::Other(7)), 7);
        }
    }
}
