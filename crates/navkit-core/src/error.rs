#![forbid(unsafe_code)]

//! Error and degradation types.

use crate::surface::ItemId;

/// Anchor the controller cannot work without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The hamburger toggle control.
    Trigger,
    /// The navigation panel container.
    Panel,
}

impl core::fmt::Display for Anchor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Trigger => f.write_str("toggle control"),
            Self::Panel => f.write_str("navigation panel"),
        }
    }
}

/// Optional element whose absence disables one feature only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalAnchor {
    /// Dedicated close control inside the panel; focus goes to the first item instead.
    CloseButton,
    /// Backdrop element, absent and not allowed to be created.
    Overlay,
    /// Item without a link; the item is left inert.
    ItemLink(ItemId),
}

/// Fatal controller error. The page is left in its static state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// A required anchor is absent from the markup.
    MissingAnchor(Anchor),
    /// Configuration rejected by [`NavConfig::validate`](crate::NavConfig::validate).
    InvalidConfig(&'static str),
}

impl core::fmt::Display for NavError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingAnchor(anchor) => write!(f, "missing required anchor: {anchor}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for NavError {}
