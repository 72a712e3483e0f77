#![forbid(unsafe_code)]

//! Backdrop behind the open mobile panel.
//!
//! The overlay dims the page and doubles as the "click outside" close target.
//! It is created on first use when the markup has none, and reused after.
//! Hiding is two-phase: the visible class is dropped at once (the CSS fade),
//! and the element is only marked `hidden` once the fade has run, which is
//! also when it stops intercepting pointer input.

use core::time::Duration;

use crate::surface::{Aria, DomOp, Node, OVERLAY_VISIBLE_CLASS};
use crate::timer::{Scheduler, TimerKind};

/// Visibility state of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayState {
    Hidden,
    Visible,
    /// Visible class removed, waiting for the fade to finish.
    FadingOut,
}

/// Owns overlay creation and visibility.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Element exists in the document.
    exists: bool,
    /// May be created when missing.
    creatable: bool,
    state: OverlayState,
}

impl Overlay {
    /// `in_markup`: the page ships an overlay. `creatable`: one may be inserted.
    #[must_use]
    pub const fn new(in_markup: bool, creatable: bool) -> Self {
        Self {
            exists: in_markup,
            creatable,
            state: OverlayState::Hidden,
        }
    }

    /// Whether the overlay feature is usable at all.
    #[inline]
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.exists || self.creatable
    }

    #[inline]
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> OverlayState {
        self.state
    }

    /// Visible or still fading out.
    #[inline]
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        !matches!(self.state, OverlayState::Hidden)
    }

    /// Initial attributes for an overlay shipped in the markup.
    pub fn prepare(&self, ops: &mut Vec<DomOp>) {
        if self.exists {
            ops.push(DomOp::flag(Node::Overlay, Aria::Hidden, true));
            ops.push(DomOp::SetHidden {
                node: Node::Overlay,
                hidden: true,
            });
        }
    }

    /// Show the overlay, creating it first if needed.
    pub fn show(&mut self, ops: &mut Vec<DomOp>, sched: &mut Scheduler) -> bool {
        if !self.is_available() {
            return false;
        }
        if !self.exists {
            ops.push(DomOp::CreateOverlay);
            ops.push(DomOp::flag(Node::Overlay, Aria::Hidden, true));
            self.exists = true;
            crate::debug!("overlay created");
        }
        sched.cancel(TimerKind::OverlayFade);
        if self.state != OverlayState::Visible {
            ops.push(DomOp::SetHidden {
                node: Node::Overlay,
                hidden: false,
            });
            ops.push(DomOp::class(Node::Overlay, OVERLAY_VISIBLE_CLASS, true));
            self.state = OverlayState::Visible;
        }
        true
    }

    /// Start fading out; the element is hidden when `fade` has elapsed.
    pub fn hide(
        &mut self,
        ops: &mut Vec<DomOp>,
        sched: &mut Scheduler,
        now: Duration,
        fade: Duration,
    ) {
        if self.state != OverlayState::Visible {
            return;
        }
        ops.push(DomOp::class(Node::Overlay, OVERLAY_VISIBLE_CLASS, false));
        sched.schedule(TimerKind::OverlayFade, now.saturating_add(fade));
        self.state = OverlayState::FadingOut;
    }

    /// Fade timer fired.
    pub fn finish_fade(&mut self, ops: &mut Vec<DomOp>) {
        if self.state != OverlayState::FadingOut {
            return;
        }
        ops.push(DomOp::SetHidden {
            node: Node::Overlay,
            hidden: true,
        });
        self.state = OverlayState::Hidden;
    }

    /// Hide at once, skipping the fade. Used on teardown.
    pub fn hide_now(&mut self, ops: &mut Vec<DomOp>, sched: &mut Scheduler) {
        sched.cancel(TimerKind::OverlayFade);
        if self.state == OverlayState::Visible {
            ops.push(DomOp::class(Node::Overlay, OVERLAY_VISIBLE_CLASS, false));
        }
        if self.state != OverlayState::Hidden {
            ops.push(DomOp::SetHidden {
                node: Node::Overlay,
                hidden: true,
            });
        }
        self.state = OverlayState::Hidden;
    }
}
