//! Input events delivered by the platform layer
//!
//! The platform pushes events as they arrive; the game drains the queue once
//! per frame and interprets each event according to the current phase.

use glam::Vec2;

/// A key the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Backspace,
    /// Any printable character (letters, digits, 'r', 'm', ...)
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            "Backspace" => Some(Key::Backspace),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }

    /// Confirm keys start a run or flap
    pub fn is_confirm(&self) -> bool {
        matches!(self, Key::Space | Key::Enter)
    }

    /// Case-insensitive character match
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Key::Char(k) if k.eq_ignore_ascii_case(&c))
    }
}

/// Input events the game understands
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Discrete key press
    KeyDown(Key),
    /// Click or touch start, in logical screen coordinates
    PointerDown(Vec2),
    /// Committed text from a soft keyboard or IME
    Text(String),
    /// Window/tab gained (`true`) or lost (`false`) input focus
    Focus(bool),
    /// Window close request
    CloseRequested,
}

/// A queue of input events.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
