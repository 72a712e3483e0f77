#![cfg(feature = "tracing-json")]

//! JSON subscriber installation. Lives in its own test binary because it sets
//! the process-wide default subscriber.

use navkit_core::surface::ItemLayout;
use navkit_core::{NavConfig, NavController, NavEvent, NavLayout, Node};
use navkit_web::DomModel;
use navkit_web::logging::{DEFAULT_DIRECTIVE, init_json};
use tracing_subscriber::EnvFilter;

#[test]
fn default_directive_parses() {
    assert!(EnvFilter::try_new(DEFAULT_DIRECTIVE).is_ok());
}

#[test]
fn init_json_installs_once() {
    assert!(init_json().is_ok(), "first install succeeds");
    assert!(init_json().is_err(), "global subscriber already set");

    // Logging through the installed subscriber must not disturb the controller.
    let layout = NavLayout {
        items: vec![ItemLayout::with_submenu(2), ItemLayout::link()],
        ..NavLayout::default()
    };
    let mut nav =
        NavController::attach(DomModel::new(layout, 375), NavConfig::default()).expect("attach");
    nav.handle(NavEvent::click(Node::Trigger));
    assert!(nav.is_transitioning());
}
