/// Keys and mouse buttons the rotators react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    MouseLeft,
}

/// Read-only view of the device state a `Rotator` polls
pub trait Controller {
    fn is_down(&self, button: Button) -> bool;

    /// Cursor position in physical pixels, once the cursor has entered the window
    fn cursor_position(&self) -> Option<(f32, f32)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_button_equality() {
        assert_eq!(Button::ArrowUp, Button::ArrowUp);
        assert_ne!(Button::ArrowUp, Button::ArrowDown);
    }

    #[test]
    fn test_all_button_variants_unique() {
        let all_buttons = [
            Button::ArrowLeft,
            Button::ArrowRight,
            Button::ArrowUp,
            Button::ArrowDown,
            Button::Escape,
            Button::MouseLeft,
        ];

        let set: HashSet<_> = all_buttons.iter().collect();
        assert_eq!(set.len(), 6);
    }

    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn cursor_position(&self) -> Option<(f32, f32)> {
            None
        }
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::ArrowLeft, Button::MouseLeft],
        };

        assert!(controller.is_down(Button::ArrowLeft));
        assert!(controller.is_down(Button::MouseLeft));
        assert!(!controller.is_down(Button::Escape));
    }
}
