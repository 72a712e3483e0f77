#![forbid(unsafe_code)]

//! Core: responsive navigation state, input routing and the DOM surface contract.
//!
//! The controller is host-driven. The embedding environment pushes
//! [`event::NavEvent`]s, advances a monotonic clock, and applies the
//! [`surface::DomOp`]s the controller emits through its [`surface::NavSurface`].
//! Nothing here blocks, spawns threads, or reads the wall clock.

pub mod clock;
pub mod config;
pub mod controller;
pub mod dropdown;
pub mod error;
pub mod event;
pub mod logging;
pub mod menu;
pub mod overlay;
pub mod scroll_lock;
pub mod surface;
pub mod timer;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::NavConfig;
pub use controller::{EventOutcome, NavController};
pub use error::{Anchor, NavError, OptionalAnchor};
pub use event::NavEvent;
pub use menu::MenuPhase;
pub use overlay::OverlayState;
pub use surface::{DomOp, ItemId, NavLayout, NavSurface, Node};
pub use viewport::Mode;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
