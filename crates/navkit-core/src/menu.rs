#![forbid(unsafe_code)]

//! Mobile panel state machine.
//!
//! ```text
//! Closed --open--> Opening --(transition timer)--> Open
//! Open --close--> Closing --(transition timer)--> Closed
//! ```
//!
//! Requests that arrive while `Opening` or `Closing` are rejected, so at most
//! one transition is ever in flight. The only exception is a close forced by a
//! layout change during `Opening`: it is remembered and replayed the moment
//! `Open` is reached. Side effects live in the controller; this type only
//! decides which transitions are legal.

/// Phase of the mobile panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MenuPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl MenuPhase {
    #[must_use]
    pub const fn is_transitioning(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Legal-transition bookkeeping for the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuMachine {
    phase: MenuPhase,
    deferred_close: bool,
}

impl MenuMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: MenuPhase::Closed,
            deferred_close: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn phase(&self) -> MenuPhase {
        self.phase
    }

    /// Panel fully open.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.phase, MenuPhase::Open)
    }

    #[inline]
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.phase.is_transitioning()
    }

    /// `Closed -> Opening`. Returns whether the request was accepted.
    pub fn begin_open(&mut self) -> bool {
        if self.phase != MenuPhase::Closed {
            return false;
        }
        self.phase = MenuPhase::Opening;
        true
    }

    /// `Open -> Closing`. Returns whether the request was accepted.
    pub fn begin_close(&mut self) -> bool {
        if self.phase != MenuPhase::Open {
            return false;
        }
        self.phase = MenuPhase::Closing;
        true
    }

    /// Transition timer fired. Returns the phase entered, if any.
    pub fn complete(&mut self) -> Option<MenuPhase> {
        self.phase = match self.phase {
            MenuPhase::Opening => MenuPhase::Open,
            MenuPhase::Closing => MenuPhase::Closed,
            MenuPhase::Open | MenuPhase::Closed => return None,
        };
        Some(self.phase)
    }

    /// Ask for a close once the running open completes. Only meaningful
    /// while `Opening`.
    pub fn defer_close(&mut self) {
        if self.phase == MenuPhase::Opening {
            self.deferred_close = true;
        }
    }

    /// Drop a deferred close, e.g. when the layout flips back before `Open`.
    pub fn cancel_deferred_close(&mut self) {
        self.deferred_close = false;
    }

    /// Consume a deferred close request.
    pub fn take_deferred_close(&mut self) -> bool {
        core::mem::take(&mut self.deferred_close)
    }

    /// Drop to `Closed` without a transition (teardown).
    pub fn reset(&mut self) {
        self.phase = MenuPhase::Closed;
        self.deferred_close = false;
    }
}
