use crossterm::event::KeyEvent;

use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    FlingDown,
    FlingUp,
    JumpToTop,
    JumpToBottom,
    SnapToMiddle,
    ToggleActive,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, keymap: &Keymap) -> Action {
    let binding = KeyBinding::new(key.code, key.modifiers);
    keymap.get(&binding).copied().unwrap_or(Action::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_default_keys() {
        let keymap = Keymap::default();
        let key = |code, modifiers| KeyEvent::new(code, modifiers);

        assert_eq!(
            handle_key_event(key(KeyCode::Char('j'), KeyModifiers::NONE), &keymap),
            Action::ScrollDown
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('j'), KeyModifiers::CONTROL), &keymap),
            Action::FlingDown
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('G'), KeyModifiers::SHIFT), &keymap),
            Action::JumpToBottom
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE), &keymap),
            Action::None
        );
    }
}
