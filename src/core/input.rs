//! Input state tracking

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Pixels per wheel "line" when the platform reports pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Tracks keyboard and mouse input state for one frame at a time
pub struct InputState {
    /// Currently pressed keys
    keys_pressed: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    /// Cursor movement since last frame, in physical pixels
    cursor_delta: (f32, f32),
    /// Last known cursor position
    cursor_position: Option<(f32, f32)>,
    /// Wheel movement since last frame, in lines (positive = away from user)
    scroll_delta: f32,
    /// Currently pressed mouse buttons
    mouse_buttons: HashSet<MouseButton>,
    modifiers: ModifiersState,
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Self {
            keys_pressed: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            cursor_delta: (0.0, 0.0),
            cursor_position: None,
            scroll_delta: 0.0,
            mouse_buttons: HashSet::new(),
            modifiers: ModifiersState::empty(),
        }
    }

    /// Process a window event
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(key_code),
                    state,
                    ..
                },
                ..
            } => match state {
                ElementState::Pressed => self.press_key(*key_code),
                ElementState::Released => self.release_key(*key_code),
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines);
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons.remove(button);
                }
            },
            WindowEvent::Focused(false) => {
                // Releases are lost while unfocused
                self.keys_pressed.clear();
                self.mouse_buttons.clear();
            }
            _ => {}
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        if self.keys_pressed.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_pressed.remove(&key);
    }

    fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((px, py)) = self.cursor_position {
            self.cursor_delta.0 += x - px;
            self.cursor_delta.1 += y - py;
        }
        self.cursor_position = Some((x, y));
    }

    fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Call at end of frame to reset per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.cursor_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    /// Check if key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Cursor movement since last frame
    pub fn cursor_delta(&self) -> (f32, f32) {
        self.cursor_delta
    }

    /// Wheel movement since last frame, in lines
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Check if mouse button is pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Whether either shift key is held
    pub fn shift_held(&self) -> bool {
        self.modifiers.shift_key()
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        assert!(!input.is_key_pressed(KeyCode::KeyT));

        input.press_key(KeyCode::KeyT);
        assert!(input.is_key_pressed(KeyCode::KeyT));
        assert!(input.is_key_just_pressed(KeyCode::KeyT));

        input.end_frame();
        assert!(input.is_key_pressed(KeyCode::KeyT));
        assert!(!input.is_key_just_pressed(KeyCode::KeyT));

        // Key repeat does not count as a new press
        input.press_key(KeyCode::KeyT);
        assert!(!input.is_key_just_pressed(KeyCode::KeyT));

        input.release_key(KeyCode::KeyT);
        assert!(!input.is_key_pressed(KeyCode::KeyT));
    }

    #[test]
    fn test_cursor_delta_accumulates_per_frame() {
        let mut input = InputState::new();
        input.move_cursor(100.0, 100.0);
        assert_eq!(input.cursor_delta(), (0.0, 0.0));

        input.move_cursor(110.0, 95.0);
        input.move_cursor(115.0, 95.0);
        assert_eq!(input.cursor_delta(), (15.0, -5.0));

        input.end_frame();
        assert_eq!(input.cursor_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_scroll_resets() {
        let mut input = InputState::new();
        input.scroll(1.0);
        input.scroll(0.5);
        assert_eq!(input.scroll_delta(), 1.5);
        input.end_frame();
        assert_eq!(input.scroll_delta(), 0.0);
    }
}
