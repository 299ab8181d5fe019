use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Current cursor position (relative to window)
    cursor: Option<(f32, f32)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_button(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.set_button(Button::MouseLeft, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Events the input state follows even when the overlay consumed them,
    /// so a button released over the overlay does not stay held
    pub fn tracks_through_overlay(event: &WindowEvent) -> bool {
        matches!(
            event,
            WindowEvent::MouseInput { .. }
                | WindowEvent::CursorMoved { .. }
                | WindowEvent::CursorLeft { .. }
                | WindowEvent::Focused(_)
        )
    }

    pub fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(button);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
            }
        }
    }

    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
    }

    /// Forget held buttons, e.g. when focus is lost and releases go elsewhere
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ArrowLeft => Some(Button::ArrowLeft),
            KeyCode::ArrowRight => Some(Button::ArrowRight),
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }
}

impl Controller for InputState {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only compared, never handed back to winit
        unsafe { DeviceId::dummy() }
    }

    fn left_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_new_state_empty() {
        let input = InputState::new();
        assert!(!input.is_down(Button::ArrowUp));
        assert_eq!(input.cursor_position(), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        input.set_button(Button::ArrowLeft, ElementState::Pressed);
        input.set_button(Button::ArrowLeft, ElementState::Pressed);
        assert!(input.is_down(Button::ArrowLeft));

        input.set_button(Button::ArrowLeft, ElementState::Released);
        assert!(!input.is_down(Button::ArrowLeft));
    }

    #[test]
    fn test_release_all_keeps_cursor() {
        let mut input = InputState::new();
        input.set_button(Button::MouseLeft, ElementState::Pressed);
        input.set_cursor(10.0, 20.0);
        input.release_all();
        assert!(!input.is_down(Button::MouseLeft));
        assert_eq!(input.cursor_position(), Some((10.0, 20.0)));
    }

    #[test]
    fn test_pointer_events_pass_the_overlay() {
        let moved = WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(4.0, 8.0),
        };
        assert!(InputState::tracks_through_overlay(&left_button(ElementState::Released)));
        assert!(InputState::tracks_through_overlay(&moved));
        assert!(InputState::tracks_through_overlay(&WindowEvent::Focused(false)));
        assert!(!InputState::tracks_through_overlay(&WindowEvent::CloseRequested));
    }

    #[test]
    fn test_release_reaches_state() {
        let mut input = InputState::new();
        input.process_event(&left_button(ElementState::Pressed));
        assert!(input.is_down(Button::MouseLeft));

        let release = left_button(ElementState::Released);
        if InputState::tracks_through_overlay(&release) {
            input.process_event(&release);
        }
        assert!(!input.is_down(Button::MouseLeft));
    }

    #[test]
    fn test_focus_loss_releases_buttons() {
        let mut input = InputState::new();
        input.set_button(Button::ArrowLeft, ElementState::Pressed);
        input.process_event(&WindowEvent::Focused(false));
        assert!(!input.is_down(Button::ArrowLeft));
    }
}
