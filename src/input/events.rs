use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Raw input forwarded by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer moved; `canvas` is relative to the map canvas, `page` to the whole viewport
    PointerMove { canvas: Point, page: Point },
    /// Pointer left the canvas
    PointerLeave,
    /// Primary-button click on the canvas
    Click { canvas: Point },
    /// Keyboard input
    KeyPress {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Viewport/window resize; bounds tooltip placement
    Resize { viewport: Point },
}

impl InputEvent {
    pub fn key(key: KeyCode) -> Self {
        InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::default(),
        }
    }
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Other(u32),
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn from_bool(handled: bool) -> Self {
        if handled {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }
}
