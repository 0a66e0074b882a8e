//! # Input Protocol
//!
//! The per-event input state the host passes into the canvas. Only the
//! primary pointer is interpreted; everything else is ignored by the gesture
//! machine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// State of keyboard modifiers.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ModifiersState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl ModifiersState {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// State of mouse buttons.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

/// Keys the canvas reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    C,
    V,
    Z,
}

/// The input state for a single event/frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputState {
    /// Pointer position in Screen Space (viewport pixels).
    pub pointer: Vec2,
    pub buttons: MouseButtons,
    /// Vertical wheel delta this event (positive = zoom in).
    pub scroll_delta: f32,
    pub modifiers: ModifiersState,
    /// Keys pressed this event.
    pub pressed_keys: Vec<Key>,
    /// Host clock in milliseconds; drives the click-vs-drag window.
    pub time_ms: u64,
    /// True when the pointer event originated inside an embedded form
    /// widget (a parameter field). Suppresses drag starts and shortcuts so
    /// users can edit values without moving the node.
    pub event_consumed_by_content: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: Vec2::ZERO,
            buttons: MouseButtons::default(),
            scroll_delta: 0.0,
            modifiers: ModifiersState::default(),
            pressed_keys: Vec::new(),
            time_ms: 0,
            event_consumed_by_content: false,
        }
    }
}
