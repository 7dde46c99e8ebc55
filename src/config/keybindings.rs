//! Keyboard bindings for the demo screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// What a key press asks the demo screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Scroll the outer list up one line.
    ScrollUp,
    /// Scroll the outer list down one line.
    ScrollDown,
    /// Scroll the outer list up one page.
    PageUp,
    /// Scroll the outer list down one page.
    PageDown,
    /// Jump to the top of the outer list.
    ScrollToTop,
    /// Jump to the bottom of the outer list.
    ScrollToBottom,
    /// Move the topmost visible grid left.
    NudgeLeft,
    /// Move the topmost visible grid right.
    NudgeRight,
    /// Leave the demo.
    Quit,
}

/// Maps keyboard events to actions.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only code and modifiers are compared; key kind and state are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let none = KeyModifiers::NONE;
        let table = [
            (KeyCode::Up, none, KeyAction::ScrollUp),
            (KeyCode::Char('k'), none, KeyAction::ScrollUp),
            (KeyCode::Down, none, KeyAction::ScrollDown),
            (KeyCode::Char('j'), none, KeyAction::ScrollDown),
            (KeyCode::PageUp, none, KeyAction::PageUp),
            (KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::PageUp),
            (KeyCode::PageDown, none, KeyAction::PageDown),
            (KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::PageDown),
            (KeyCode::Home, none, KeyAction::ScrollToTop),
            (KeyCode::Char('g'), none, KeyAction::ScrollToTop),
            (KeyCode::End, none, KeyAction::ScrollToBottom),
            (KeyCode::Char('G'), KeyModifiers::SHIFT, KeyAction::ScrollToBottom),
            (KeyCode::Left, none, KeyAction::NudgeLeft),
            (KeyCode::Char('h'), none, KeyAction::NudgeLeft),
            (KeyCode::Right, none, KeyAction::NudgeRight),
            (KeyCode::Char('l'), none, KeyAction::NudgeRight),
            (KeyCode::Char('q'), none, KeyAction::Quit),
            (KeyCode::Esc, none, KeyAction::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit),
        ];

        let bindings = table
            .into_iter()
            .map(|(code, modifiers, action)| (KeyEvent::new(code, modifiers), action))
            .collect();
        Self { bindings }
    }
}
