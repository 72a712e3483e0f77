#![forbid(unsafe_code)]

//! Web frontend for navkit.
//!
//! - [`input`]: the JSON shape of resolved DOM events and binding options,
//!   with DOM key normalization.
//! - [`dom_model`]: an in-memory [`navkit_core::NavSurface`] for headless
//!   hosts, replay and tests.
//! - [`session_record`]: JSONL session traces and checksum-verified replay.
//! - `wasm` (wasm32 only): the `NavMenuWeb` binding over the live document.

pub mod dom_model;
pub mod input;
pub mod session_record;

#[cfg(feature = "tracing-json")]
pub mod logging;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::NavMenuWeb;

pub use dom_model::DomModel;
pub use input::{DomEventJson, Selectors, WebOptions, config_from_json, options_from_json};
pub use session_record::{SessionRecorder, SessionTrace, replay};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct NavMenuWeb;

#[cfg(not(target_arch = "wasm32"))]
impl NavMenuWeb {
    /// There is no document to attach to outside the browser.
    #[must_use]
    pub fn attach(_options: &str) -> Option<Self> {
        None
    }
}
