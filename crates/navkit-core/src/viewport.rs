#![forbid(unsafe_code)]

//! Mobile/desktop classification.

/// Layout mode derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    Mobile,
    Desktop,
}

/// `Mobile` when `width <= breakpoint`, else `Desktop`.
#[inline]
#[must_use]
pub const fn classify(width: u32, breakpoint: u32) -> Mode {
    if width <= breakpoint {
        Mode::Mobile
    } else {
        Mode::Desktop
    }
}

/// Tracks the current mode and the width of a resize burst still settling.
#[derive(Debug, Clone)]
pub struct Viewport {
    breakpoint: u32,
    width: u32,
    mode: Mode,
    pending_width: Option<u32>,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, breakpoint: u32) -> Self {
        Self {
            breakpoint,
            width,
            mode: classify(width, breakpoint),
            pending_width: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Remember the latest width of a resize burst; the last one wins.
    pub fn note_resize(&mut self, width: u32) {
        self.pending_width = Some(width);
    }

    /// Apply the settled resize width, if any. Returns the previous mode when
    /// the mode changed.
    pub fn settle(&mut self) -> Option<Mode> {
        let width = self.pending_width.take()?;
        self.apply(width)
    }

    /// Apply `width` immediately, discarding any unsettled resize. Returns the
    /// previous mode when the mode changed.
    pub fn apply(&mut self, width: u32) -> Option<Mode> {
        self.pending_width = None;
        self.width = width;
        let previous = self.mode;
        self.mode = classify(width, self.breakpoint);
        (previous != self.mode).then_some(previous)
    }
}
