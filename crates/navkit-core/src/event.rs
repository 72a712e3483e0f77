#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! The host resolves every browser event to the [`Node`] it hit before pushing
//! it, so routing never needs to walk the DOM. Pointer enter/leave events are
//! the non-bubbling kind (`mouseenter`/`mouseleave`).

use bitflags::bitflags;

use crate::surface::Node;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum NavEvent {
    /// Primary-button click or tap.
    Click { target: Node },
    /// Pointer entered a node.
    PointerEnter { target: Node },
    /// Pointer left a node.
    PointerLeave { target: Node },
    /// Key pressed while `target` had focus.
    Key(KeyEvent),
    /// Focus moved onto `target`.
    FocusIn { target: Node },
    /// Focus left `target`.
    FocusOut { target: Node },
    /// Viewport resized (debounced by the controller).
    Resize { width: u32 },
    /// Device orientation changed (applied immediately).
    OrientationChange { width: u32 },
}

impl NavEvent {
    #[must_use]
    pub const fn click(target: Node) -> Self {
        Self::Click { target }
    }

    #[must_use]
    pub const fn key(code: KeyCode, target: Node) -> Self {
        Self::Key(KeyEvent::new(code, target))
    }
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    /// Element that had focus.
    pub target: Node,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode, target: Node) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            target,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Enter or Space.
    #[must_use]
    pub const fn is_activation(&self) -> bool {
        matches!(self.code, KeyCode::Enter | KeyCode::Char(' '))
    }

    /// Ctrl, Alt or Super is held; such chords belong to the browser.
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SUPER))
    }
}

/// Keys the controller interprets. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyCode {
    /// A printable character; Space is `Char(' ')`.
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
    Other,
}
